//! The transform worker.
//!
//! [`TransformWorker::handle`] processes one [`CreationEvent`]:
//!
//! 1. skip keys outside the source prefix,
//! 2. create a scratch directory named by a random token,
//! 3. fetch the object into it,
//! 4. transform it on the blocking pool,
//! 5. derive the destination key,
//! 6. upload the result,
//! 7. remove the scratch directory whatever the outcome.
//!
//! Nothing is retried here. A failed step is returned to the caller, which
//! lets the invoking platform apply its own redelivery policy. The upload is
//! the last step, so an invocation that is cut short never leaves a partial
//! result behind.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use imgflow_model::{CreationEvent, Summary};
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::error::{ConfigError, TransformError, WorkerError};
use crate::keys;
use crate::scratch::Scratch;
use crate::store::ObjectStore;
use crate::transform::{Downscaler, Transformed, Transformer};

/// Why an event was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The key is not under the configured source prefix.
    OutsideSourcePrefix,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideSourcePrefix => f.write_str("key is outside the source prefix"),
        }
    }
}

/// Successful result of [`TransformWorker::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The object was transformed and the result uploaded.
    Processed(Summary),
    /// The event was ignored; nothing was read or written.
    Skipped {
        /// Key of the ignored object.
        key: String,
        /// Why it was ignored.
        reason: SkipReason,
    },
}

/// Stateless worker transforming objects named by creation events.
///
/// Cloning is cheap; all fields are shared.
#[derive(Debug, Clone)]
pub struct TransformWorker {
    store: Arc<dyn ObjectStore>,
    transformer: Arc<dyn Transformer>,
    config: Arc<WorkerConfig>,
}

impl TransformWorker {
    /// Create a worker after validating `config`.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        transformer: Arc<dyn Transformer>,
        config: WorkerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            transformer,
            config: Arc::new(config),
        })
    }

    /// Create a worker using the image [`Downscaler`] described by `config`.
    pub fn with_downscaler(
        store: Arc<dyn ObjectStore>,
        config: WorkerConfig,
    ) -> Result<Self, ConfigError> {
        let transformer = Arc::new(Downscaler::from_config(&config));
        Self::new(store, transformer, config)
    }

    /// The worker configuration.
    #[must_use]
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Process one creation event.
    pub async fn handle(&self, event: &CreationEvent) -> Result<Outcome, WorkerError> {
        let Some(dest_key) = keys::destination_key(
            &event.key,
            &self.config.source_prefix,
            &self.config.destination_prefix,
        ) else {
            info!(
                bucket = %event.bucket,
                key = %event.key,
                source_prefix = %self.config.source_prefix,
                "ignoring object outside the source prefix"
            );
            return Ok(Outcome::Skipped {
                key: event.key.clone(),
                reason: SkipReason::OutsideSourcePrefix,
            });
        };
        if keys::is_under_prefix(&dest_key, &self.config.source_prefix) {
            return Err(WorkerError::LoopDetected { key: dest_key });
        }

        let root = self.config.scratch_root();
        let scratch = Scratch::create(&root).map_err(|source| WorkerError::Scratch {
            path: root.clone(),
            source,
        })?;
        debug!(key = %event.key, token = %scratch.token(), "created scratch space");

        let result = self.process(event, dest_key, &scratch).await;

        if let Err(e) = scratch.close() {
            warn!(key = %event.key, error = %e, "failed to clean up scratch space");
        }

        result.map(Outcome::Processed)
    }

    async fn process(
        &self,
        event: &CreationEvent,
        dest_key: String,
        scratch: &Scratch,
    ) -> Result<Summary, WorkerError> {
        let body = self
            .store
            .get(&event.bucket, &event.key)
            .await
            .map_err(|source| WorkerError::Fetch {
                bucket: event.bucket.clone(),
                key: event.key.clone(),
                source,
            })?;
        let bytes_in = body.len() as u64;
        let source_path = scratch.source_path();
        write_file(&source_path, &body).await?;
        drop(body);

        let transformed = self.transform_file(&event.key, &source_path).await?;

        let dest_bucket = self
            .config
            .destination_bucket
            .clone()
            .unwrap_or_else(|| event.bucket.clone());
        let content_type = transformed.content_type;
        let output = Bytes::from(transformed.bytes);
        let bytes_out = output.len() as u64;

        self.store
            .put(&dest_bucket, &dest_key, output, content_type)
            .await
            .map_err(|source| WorkerError::Upload {
                bucket: dest_bucket.clone(),
                key: dest_key.clone(),
                source,
            })?;

        info!(
            bucket = %event.bucket,
            key = %event.key,
            dest_bucket = %dest_bucket,
            dest_key = %dest_key,
            bytes_in,
            bytes_out,
            width = transformed.width,
            height = transformed.height,
            "transformed object"
        );

        Ok(Summary {
            source_bucket: event.bucket.clone(),
            source_key: event.key.clone(),
            dest_bucket,
            dest_key,
            bytes_in,
            bytes_out,
            width: transformed.width,
            height: transformed.height,
        })
    }

    /// Read the fetched object back from scratch space and transform it on
    /// the blocking pool.
    async fn transform_file(&self, key: &str, path: &Path) -> Result<Transformed, WorkerError> {
        let input = read_file(path).await?;
        let transformer = Arc::clone(&self.transformer);
        tokio::task::spawn_blocking(move || transformer.transform(&input))
            .await
            .map_err(|e| TransformError::Aborted(e.to_string()))
            .and_then(|result| result)
            .map_err(|source| WorkerError::Transform {
                key: key.to_owned(),
                source,
            })
    }
}

async fn write_file(path: &Path, data: &[u8]) -> Result<(), WorkerError> {
    tokio::fs::write(path, data)
        .await
        .map_err(|source| WorkerError::Scratch {
            path: path.to_path_buf(),
            source,
        })
}

async fn read_file(path: &Path) -> Result<Vec<u8>, WorkerError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| WorkerError::Scratch {
            path: path.to_path_buf(),
            source,
        })
}
