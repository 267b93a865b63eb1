//! Event validation errors.

/// Error produced when a raw notification record cannot be turned into a
/// [`CreationEvent`](crate::CreationEvent).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// A field required to locate the object is absent.
    #[error("event record is missing required field `{0}`")]
    MissingField(&'static str),

    /// The object key is not valid URL-encoded UTF-8.
    #[error("object key is not valid URL-encoded UTF-8: {key}")]
    InvalidKeyEncoding {
        /// The key as it appeared in the payload.
        key: String,
    },

    /// The event time is not an RFC 3339 timestamp.
    #[error("invalid event time {value}: {reason}")]
    InvalidEventTime {
        /// The timestamp as it appeared in the payload.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// The record does not match the notification schema.
    #[error("malformed event record: {reason}")]
    Malformed {
        /// Deserializer message.
        reason: String,
    },

    /// The record describes something other than an object creation.
    #[error("event {event_name} is not an object creation event")]
    NotACreationEvent {
        /// The event name, e.g. `ObjectRemoved:Delete`.
        event_name: String,
    },
}
