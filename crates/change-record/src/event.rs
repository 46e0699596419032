//! Change-log records and batches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::Record;
use crate::{RecordError, Result};

/// Kind of mutation a change record describes.
///
/// Names other than `INSERT`, `MODIFY` and `REMOVE` are preserved as
/// [`EventType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Insert,
    Modify,
    Remove,
    Other(String),
}

impl EventType {
    /// Returns the wire name of this event type.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Insert => "INSERT",
            EventType::Modify => "MODIFY",
            EventType::Remove => "REMOVE",
            EventType::Other(name) => name,
        }
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "INSERT" => EventType::Insert,
            "MODIFY" => EventType::Modify,
            "REMOVE" => EventType::Remove,
            _ => EventType::Other(name),
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `dynamodb` section of a change record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamChange {
    /// Key fields of the changed item. Always present.
    pub keys: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_view_type: Option<String>,
    /// Epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_creation_date_time: Option<f64>,
}

/// One record from a change-log batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "eventName")]
    pub event_type: EventType,
    /// Source identifier; the target collection is derived from it.
    #[serde(rename = "eventSourceARN")]
    pub source: String,
    #[serde(rename = "awsRegion", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "dynamodb")]
    pub change: StreamChange,
}

impl ChangeEvent {
    /// Creates a new change event builder.
    pub fn builder() -> ChangeEventBuilder {
        ChangeEventBuilder::default()
    }

    /// Parses a change event from its JSON form.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the key fields.
    pub fn keys(&self) -> &Record {
        &self.change.keys
    }

    /// Returns the new image, failing if the record carries none.
    pub fn new_image(&self) -> Result<&Record> {
        self.change
            .new_image
            .as_ref()
            .ok_or_else(|| RecordError::MissingNewImage {
                event_type: self.event_type.to_string(),
            })
    }

    /// Returns the approximate time the change was made, if present.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let seconds = self.change.approximate_creation_date_time?;
        DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
    }
}

/// Builder for [`ChangeEvent`].
#[derive(Debug, Default)]
pub struct ChangeEventBuilder {
    event_id: Option<String>,
    event_type: Option<EventType>,
    source: Option<String>,
    region: Option<String>,
    change: StreamChange,
}

impl ChangeEventBuilder {
    pub fn event_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn keys(mut self, keys: Record) -> Self {
        self.change.keys = keys;
        self
    }

    pub fn new_image(mut self, image: Record) -> Self {
        self.change.new_image = Some(image);
        self
    }

    pub fn old_image(mut self, image: Record) -> Self {
        self.change.old_image = Some(image);
        self
    }

    pub fn sequence_number(mut self, sequence_number: impl Into<String>) -> Self {
        self.change.sequence_number = Some(sequence_number.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.change.approximate_creation_date_time = Some(at.timestamp_millis() as f64 / 1000.0);
        self
    }

    /// Builds the event.
    ///
    /// # Panics
    ///
    /// Panics if the event type or source has not been set.
    pub fn build(self) -> ChangeEvent {
        ChangeEvent {
            event_id: self.event_id,
            event_type: self.event_type.expect("event_type is required"),
            source: self.source.expect("source is required"),
            region: self.region,
            change: self.change,
        }
    }

    /// Builds the event, returning `None` if required fields are missing.
    pub fn try_build(self) -> Option<ChangeEvent> {
        Some(ChangeEvent {
            event_id: self.event_id,
            event_type: self.event_type?,
            source: self.source?,
            region: self.region,
            change: self.change,
        })
    }
}

/// A batch of change records as delivered by the change log.
///
/// Records are kept as raw JSON so a malformed record fails on its own
/// rather than rejecting the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<Value>,
}

impl StreamBatch {
    /// Wraps typed events into a batch.
    pub fn from_events(events: &[ChangeEvent]) -> Result<Self> {
        let records = events
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the batch carries no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{TypedNode, record};
    use serde_json::json;

    fn sample_record() -> Value {
        json!({
            "eventID": "c4ca4238a0b923820dcc509a6f75849b",
            "eventName": "INSERT",
            "eventVersion": "1.1",
            "eventSource": "aws:dynamodb",
            "awsRegion": "us-east-1",
            "dynamodb": {
                "ApproximateCreationDateTime": 1479499740,
                "Keys": {"Id": {"N": "101"}},
                "NewImage": {
                    "Message": {"S": "New item!"},
                    "Id": {"N": "101"}
                },
                "SequenceNumber": "4421584500000000017450439091",
                "SizeBytes": 26,
                "StreamViewType": "NEW_AND_OLD_IMAGES"
            },
            "eventSourceARN": "arn:aws:dynamodb:us-east-1:123456789012:table/ExampleTableWithStream/stream/2015-06-27T00:48:05.899"
        })
    }

    #[test]
    fn parses_stream_record() {
        let event = ChangeEvent::from_value(sample_record()).unwrap();

        assert_eq!(event.event_type, EventType::Insert);
        assert_eq!(event.event_id.as_deref(), Some("c4ca4238a0b923820dcc509a6f75849b"));
        assert_eq!(event.region.as_deref(), Some("us-east-1"));
        assert_eq!(event.keys()["Id"], TypedNode::number("101"));
        assert_eq!(
            event.new_image().unwrap()["Message"],
            TypedNode::string("New item!")
        );
        assert_eq!(event.change.size_bytes, Some(26));
        assert_eq!(
            event.created_at().unwrap(),
            DateTime::from_timestamp(1479499740, 0).unwrap()
        );
    }

    #[test]
    fn unknown_event_names_are_preserved() {
        let mut raw = sample_record();
        raw["eventName"] = json!("TRUNCATE");
        let event = ChangeEvent::from_value(raw).unwrap();
        assert_eq!(event.event_type, EventType::Other("TRUNCATE".to_string()));
        assert_eq!(event.event_type.as_str(), "TRUNCATE");
    }

    #[test]
    fn missing_keys_is_malformed() {
        let mut raw = sample_record();
        raw["dynamodb"].as_object_mut().unwrap().remove("Keys");
        assert!(matches!(
            ChangeEvent::from_value(raw),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn malformed_nested_node_is_malformed_record() {
        let mut raw = sample_record();
        raw["dynamodb"]["NewImage"]["Message"] = json!({"S": "a", "N": "1"});
        let err = ChangeEvent::from_value(raw).unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn missing_new_image_is_reported() {
        let event = ChangeEvent::builder()
            .event_type(EventType::Modify)
            .source("arn:aws:dynamodb:us-east-1:1:table/T/stream/x")
            .keys(record([("id", TypedNode::number(1))]))
            .build();

        let err = event.new_image().unwrap_err();
        assert!(matches!(err, RecordError::MissingNewImage { ref event_type } if event_type == "MODIFY"));
    }

    #[test]
    fn builder_round_trips_through_json() {
        let event = ChangeEvent::builder()
            .event_id("1")
            .event_type(EventType::Remove)
            .source("arn:aws:dynamodb:us-east-1:1:table/T/stream/x")
            .keys(record([("id", TypedNode::number(1))]))
            .sequence_number("100")
            .build();

        let batch = StreamBatch::from_events(std::slice::from_ref(&event)).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0]["eventName"], json!("REMOVE"));

        let parsed = ChangeEvent::from_value(batch.records[0].clone()).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn try_build_requires_type_and_source() {
        assert!(ChangeEvent::builder().try_build().is_none());
        assert!(
            ChangeEvent::builder()
                .event_type(EventType::Insert)
                .try_build()
                .is_none()
        );
    }

    #[test]
    fn batch_tolerates_missing_records_key() {
        let batch: StreamBatch = serde_json::from_value(json!({})).unwrap();
        assert!(batch.is_empty());
    }
}
