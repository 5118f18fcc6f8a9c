//! Object notification model.
//!
//! Cloud Storage notifications arrive as CloudEvents in binary content mode:
//! the event attributes travel in `ce-*` headers and the body carries the
//! object resource under `data`. Missing or mistyped fields read as absent;
//! parsing never fails.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields extracted from the `data` object of a storage notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectNotification {
    /// Bucket holding the object.
    pub bucket: Option<String>,
    /// Object key within the bucket.
    pub name: Option<String>,
    /// Object content type, from `data.contentType`.
    pub content_type: Option<String>,
    /// Object size in bytes, from `data.size`.
    pub size: Option<u64>,
}

impl ObjectNotification {
    /// Parses a raw request body.
    ///
    /// Bodies that are not JSON produce an empty notification.
    ///
    /// # Example
    ///
    /// ```
    /// use filedrop_core::ObjectNotification;
    ///
    /// let n = ObjectNotification::from_slice(br#"{"data":{"bucket":"b","name":"a/b.txt"}}"#);
    /// assert_eq!(n.bucket.as_deref(), Some("b"));
    ///
    /// let empty = ObjectNotification::from_slice(b"not json");
    /// assert!(empty.is_empty());
    /// ```
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::default(),
        }
    }

    /// Extracts the notification fields from a parsed document.
    pub fn from_value(value: &Value) -> Self {
        let Some(data) = value.get("data") else {
            return Self::default();
        };

        Self {
            bucket: string_field(data, "bucket"),
            name: string_field(data, "name"),
            content_type: string_field(data, "contentType"),
            size: data.get("size").and_then(parse_size),
        }
    }

    /// True when neither bucket nor name was supplied.
    pub fn is_empty(&self) -> bool {
        self.bucket.is_none() && self.name.is_none()
    }

    /// `gs://` location of the referenced object.
    pub fn uri(&self) -> ObjectUri<'_> {
        ObjectUri { bucket: self.bucket.as_deref(), name: self.name.as_deref() }
    }
}

fn string_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_owned)
}

// Cloud Storage encodes object sizes as decimal strings.
fn parse_size(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// `gs://bucket/name` rendering of an object location.
///
/// Absent parts render as empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectUri<'a> {
    bucket: Option<&'a str>,
    name: Option<&'a str>,
}

impl fmt::Display for ObjectUri<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket.unwrap_or_default(), self.name.unwrap_or_default())
    }
}

/// CloudEvent attributes delivered as `ce-*` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudEventContext {
    /// `ce-id`
    pub id: Option<String>,
    /// `ce-type`, e.g. `google.cloud.storage.object.v1.finalized`
    pub event_type: Option<String>,
    /// `ce-source`
    pub source: Option<String>,
    /// `ce-subject`, e.g. `objects/path/to/file.txt`
    pub subject: Option<String>,
}

impl CloudEventContext {
    /// Builds the context from a header lookup function.
    pub fn from_lookup<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let get = |name: &str| lookup(name).map(str::to_owned);

        Self {
            id: get("ce-id"),
            event_type: get("ce-type"),
            source: get("ce-source"),
            subject: get("ce-subject"),
        }
    }
}

/// A received notification, as handed to sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEvent {
    /// Fields read from the body.
    pub notification: ObjectNotification,
    /// Fields read from the headers.
    pub context: CloudEventContext,
    /// When the receiver accepted the request.
    pub received_at: DateTime<Utc>,
}

impl ObjectEvent {
    /// Human-readable line recorded for every notification.
    pub fn summary(&self) -> String {
        format!("Received file: {}", self.notification.uri())
    }
}
