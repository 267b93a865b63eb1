//! Transform worker for imgflow.
//!
//! A [`TransformWorker`] is invoked once per object creation event. It fetches
//! the object from an [`ObjectStore`], runs it through a [`Transformer`] and
//! uploads the result under the destination prefix.
//!
//! # Architecture
//!
//! ```text
//! S3EventNotification (imgflow-model)
//!        |
//!        v
//! TransformWorker::handle_batch  (per-record validation, report)
//!        |
//!        v
//! TransformWorker::handle        (prefix check, scratch space)
//!        |
//!        +--> ObjectStore::get --> Transformer --> ObjectStore::put
//! ```
//!
//! The worker holds no mutable state. The store client and transformer are
//! injected at construction so tests can substitute the in-memory store.

mod batch;
pub mod config;
pub mod error;
pub mod keys;
pub mod scratch;
pub mod store;
pub mod transform;
pub mod worker;

pub use config::{FailurePolicy, LogFormat, OutputFormat, WorkerConfig};
pub use error::{CleanupError, ConfigError, StoreError, TransformError, WorkerError};
pub use store::{InMemoryObjectStore, ObjectStore, S3ObjectStore};
pub use transform::{Downscaler, Transformed, Transformer};
pub use worker::{Outcome, SkipReason, TransformWorker};
