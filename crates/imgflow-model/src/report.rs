//! Per-record outcomes and the batch report returned by an invocation.

use serde::{Deserialize, Serialize};

/// Result of a successful transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Bucket the source object was read from.
    pub source_bucket: String,
    /// Key of the source object.
    pub source_key: String,
    /// Bucket the result was written to.
    pub dest_bucket: String,
    /// Key of the written result.
    pub dest_key: String,
    /// Size of the source object in bytes.
    pub bytes_in: u64,
    /// Size of the written result in bytes.
    pub bytes_out: u64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// What happened to one record of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RecordOutcome {
    /// The object was transformed and the result uploaded.
    Processed(Summary),
    /// The record was intentionally ignored.
    Skipped {
        /// Key of the ignored object, when known.
        key: Option<String>,
        /// Why the record was ignored.
        reason: String,
    },
    /// The record could not be processed.
    Failed {
        /// Key of the failed object, when known.
        key: Option<String>,
        /// Error message.
        error: String,
    },
}

/// Outcomes for every record of one invocation, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One outcome per record.
    pub records: Vec<RecordOutcome>,
}

impl BatchReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome.
    pub fn push(&mut self, outcome: RecordOutcome) {
        self.records.push(outcome);
    }

    /// Number of processed records.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Processed(_)))
    }

    /// Number of skipped records.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Skipped { .. }))
    }

    /// Number of failed records.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Failed { .. }))
    }

    /// Whether any record failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Keys of the failed records (`None` for records without a usable key).
    #[must_use]
    pub fn failed_keys(&self) -> Vec<Option<&str>> {
        self.records
            .iter()
            .filter_map(|o| match o {
                RecordOutcome::Failed { key, .. } => Some(key.as_deref()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.records.iter().filter(|o| pred(o)).count()
    }
}
