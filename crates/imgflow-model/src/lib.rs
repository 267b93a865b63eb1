//! Wire types for imgflow.
//!
//! This crate holds the data that crosses the invocation boundary: the S3
//! event notification payload delivered by the store, the validated
//! [`CreationEvent`] the worker consumes, the per-record [`RecordOutcome`]s it
//! produces, and the [`InvocationResponse`] returned to the runtime.
//!
//! Raw payload types keep every field optional, and each element of the
//! `Records` array deserializes on its own, so that a single malformed record
//! is rejected with an [`EventError`] instead of failing the deserialization
//! of the whole batch.

pub mod error;
pub mod event;
pub mod report;
pub mod response;

pub use error::EventError;
pub use event::{
    CreationEvent, RawRecord, S3Bucket, S3Entity, S3EventNotification, S3EventRecord, S3Object,
    decode_key,
};
pub use report::{BatchReport, RecordOutcome, Summary};
pub use response::InvocationResponse;
