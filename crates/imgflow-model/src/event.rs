//! S3 event notification payloads.
//!
//! [`S3EventNotification`] mirrors the JSON document an S3-compatible store
//! delivers to its notification target. Every field is optional at this layer,
//! and a record whose fields have the wrong JSON type is kept as
//! [`RawRecord::Malformed`] instead of failing the whole payload.
//! [`CreationEvent::try_from`] performs the validation and returns a typed
//! record or an [`EventError`].
//!
//! # Examples
//!
//! ```
//! use imgflow_model::{CreationEvent, S3EventNotification};
//!
//! let payload = r#"{"Records":[{"eventName":"ObjectCreated:Put",
//!     "s3":{"bucket":{"name":"photos"},"object":{"key":"original/my+cat.png","size":42}}}]}"#;
//! let notification: S3EventNotification = serde_json::from_str(payload).unwrap();
//! let event = CreationEvent::try_from(&notification.records[0]).unwrap();
//! assert_eq!(event.key, "original/my cat.png");
//! assert_eq!(event.size, 42);
//! ```

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EventError;

/// Event name prefix shared by all object creation events.
const OBJECT_CREATED_PREFIX: &str = "ObjectCreated:";

/// A notification payload holding zero or more records.
///
/// Payloads without a `Records` array (such as the `s3:TestEvent` a store
/// sends when a notification is first configured) deserialize as an empty
/// batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3EventNotification {
    /// The event records.
    #[serde(rename = "Records", default)]
    pub records: Vec<RawRecord>,
}

/// One element of the `Records` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    /// An element matching the record schema.
    Parsed(S3EventRecord),
    /// An element that could not be read as a record.
    Malformed {
        /// The element as delivered.
        value: serde_json::Value,
        /// Deserializer message.
        reason: String,
    },
}

impl RawRecord {
    /// The raw (still encoded) object key, if one can be found.
    #[must_use]
    pub fn raw_key(&self) -> Option<&str> {
        match self {
            Self::Parsed(record) => record.raw_key(),
            Self::Malformed { value, .. } => value
                .pointer("/s3/object/key")
                .and_then(serde_json::Value::as_str),
        }
    }
}

impl From<S3EventRecord> for RawRecord {
    fn from(record: S3EventRecord) -> Self {
        Self::Parsed(record)
    }
}

impl Serialize for RawRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Parsed(record) => record.serialize(serializer),
            Self::Malformed { value, .. } => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match S3EventRecord::deserialize(&value) {
            Ok(record) => Self::Parsed(record),
            Err(e) => Self::Malformed {
                reason: e.to_string(),
                value,
            },
        })
    }
}

/// A single raw notification record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    /// Notification schema version.
    pub event_version: Option<String>,
    /// Producer, `aws:s3` for S3-compatible stores.
    pub event_source: Option<String>,
    /// Region of the bucket.
    pub aws_region: Option<String>,
    /// RFC 3339 timestamp at which the event occurred.
    pub event_time: Option<String>,
    /// Event name, e.g. `ObjectCreated:Put`.
    pub event_name: Option<String>,
    /// Bucket and object details.
    pub s3: Option<S3Entity>,
}

/// Bucket and object section of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Entity {
    /// Notification schema version of the `s3` section.
    pub s3_schema_version: Option<String>,
    /// ID of the notification configuration that fired.
    pub configuration_id: Option<String>,
    /// The bucket holding the object.
    pub bucket: Option<S3Bucket>,
    /// The object that triggered the event.
    pub object: Option<S3Object>,
}

/// Bucket details of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Bucket {
    /// Bucket name.
    pub name: Option<String>,
    /// Bucket ARN.
    pub arn: Option<String>,
}

/// Object details of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Object {
    /// URL-encoded object key (spaces are encoded as `+`).
    pub key: Option<String>,
    /// Object size in bytes.
    pub size: Option<u64>,
    /// Object ETag.
    pub e_tag: Option<String>,
    /// Version ID when the bucket is versioned.
    pub version_id: Option<String>,
    /// Ordering token for events on the same key.
    pub sequencer: Option<String>,
}

impl S3EventRecord {
    /// Build an `ObjectCreated:Put` record for the given bucket and raw key.
    ///
    /// The key is stored as given; callers that want a literal `+` or `%` in
    /// the decoded key must encode it themselves.
    #[must_use]
    pub fn object_created(bucket: impl Into<String>, key: impl Into<String>, size: u64) -> Self {
        Self {
            event_version: Some("2.1".to_owned()),
            event_source: Some("aws:s3".to_owned()),
            aws_region: None,
            event_time: Some(Utc::now().to_rfc3339()),
            event_name: Some(format!("{OBJECT_CREATED_PREFIX}Put")),
            s3: Some(S3Entity {
                s3_schema_version: Some("1.0".to_owned()),
                configuration_id: None,
                bucket: Some(S3Bucket {
                    name: Some(bucket.into()),
                    arn: None,
                }),
                object: Some(S3Object {
                    key: Some(key.into()),
                    size: Some(size),
                    e_tag: None,
                    version_id: None,
                    sequencer: None,
                }),
            }),
        }
    }

    /// The raw (still encoded) object key, if present.
    #[must_use]
    pub fn raw_key(&self) -> Option<&str> {
        self.s3
            .as_ref()
            .and_then(|s3| s3.object.as_ref())
            .and_then(|object| object.key.as_deref())
    }
}

impl S3EventNotification {
    /// Wrap the given records in a notification.
    #[must_use]
    pub fn new(records: Vec<S3EventRecord>) -> Self {
        Self {
            records: records.into_iter().map(RawRecord::from).collect(),
        }
    }
}

/// A validated object creation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationEvent {
    /// Bucket holding the new object.
    pub bucket: String,
    /// Decoded object key.
    pub key: String,
    /// Event name, e.g. `ObjectCreated:Put`.
    pub event_name: String,
    /// Time the store recorded the event, when supplied.
    pub event_time: Option<DateTime<Utc>>,
    /// Object size in bytes as reported by the store (0 when absent).
    pub size: u64,
    /// Object checksum (ETag), when supplied.
    pub etag: Option<String>,
}

impl CreationEvent {
    /// Create an `ObjectCreated:Put` event for a decoded key.
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            event_name: format!("{OBJECT_CREATED_PREFIX}Put"),
            event_time: None,
            size: 0,
            etag: None,
        }
    }
}

impl TryFrom<&RawRecord> for CreationEvent {
    type Error = EventError;

    fn try_from(record: &RawRecord) -> Result<Self, Self::Error> {
        match record {
            RawRecord::Parsed(record) => Self::try_from(record),
            RawRecord::Malformed { reason, .. } => Err(EventError::Malformed {
                reason: reason.clone(),
            }),
        }
    }
}

impl TryFrom<&S3EventRecord> for CreationEvent {
    type Error = EventError;

    fn try_from(record: &S3EventRecord) -> Result<Self, Self::Error> {
        let event_name = record
            .event_name
            .as_deref()
            .ok_or(EventError::MissingField("eventName"))?;
        // EventBridge-style names carry an `s3:` prefix.
        let event_name = event_name.strip_prefix("s3:").unwrap_or(event_name);
        if !event_name.starts_with(OBJECT_CREATED_PREFIX) {
            return Err(EventError::NotACreationEvent {
                event_name: event_name.to_owned(),
            });
        }

        let s3 = record.s3.as_ref().ok_or(EventError::MissingField("s3"))?;
        let bucket = s3
            .bucket
            .as_ref()
            .and_then(|b| b.name.as_deref())
            .filter(|name| !name.is_empty())
            .ok_or(EventError::MissingField("s3.bucket.name"))?;
        let object = s3
            .object
            .as_ref()
            .ok_or(EventError::MissingField("s3.object"))?;
        let raw_key = object
            .key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(EventError::MissingField("s3.object.key"))?;

        let event_time = record
            .event_time
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| EventError::InvalidEventTime {
                        value: value.to_owned(),
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        Ok(Self {
            bucket: bucket.to_owned(),
            key: decode_key(raw_key)?,
            event_name: event_name.to_owned(),
            event_time,
            size: object.size.unwrap_or_default(),
            etag: object.e_tag.clone(),
        })
    }
}

/// Decode an object key as delivered in a notification.
///
/// Notification keys are form-encoded: `+` stands for a space and other
/// reserved bytes are percent-encoded.
///
/// # Examples
///
/// ```
/// use imgflow_model::decode_key;
///
/// assert_eq!(decode_key("original/a+b%2Bc.png").unwrap(), "original/a b+c.png");
/// ```
pub fn decode_key(raw: &str) -> Result<String, EventError> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| EventError::InvalidKeyEncoding {
            key: raw.to_owned(),
        })
}
