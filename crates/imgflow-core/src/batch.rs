//! Batch processing of notification payloads.

use imgflow_model::{
    BatchReport, CreationEvent, EventError, InvocationResponse, RecordOutcome, S3EventNotification,
};
use tracing::{error, info, warn};

use crate::config::FailurePolicy;
use crate::worker::{Outcome, TransformWorker};

impl TransformWorker {
    /// Process every record of a notification independently.
    ///
    /// Records are handled in delivery order. A record that fails validation
    /// or processing is reported and the remaining records still run.
    /// Records describing something other than an object creation are
    /// skipped.
    pub async fn handle_batch(&self, notification: &S3EventNotification) -> BatchReport {
        let mut report = BatchReport::new();

        for (index, record) in notification.records.iter().enumerate() {
            let event = match CreationEvent::try_from(record) {
                Ok(event) => event,
                Err(EventError::NotACreationEvent { event_name }) => {
                    info!(index, event_name = %event_name, "ignoring non-creation event");
                    report.push(RecordOutcome::Skipped {
                        key: record.raw_key().map(ToOwned::to_owned),
                        reason: format!("event {event_name} is not an object creation event"),
                    });
                    continue;
                }
                Err(e) => {
                    warn!(index, error = %e, "rejecting malformed event record");
                    report.push(RecordOutcome::Failed {
                        key: record.raw_key().map(ToOwned::to_owned),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let outcome = match self.handle(&event).await {
                Ok(Outcome::Processed(summary)) => RecordOutcome::Processed(summary),
                Ok(Outcome::Skipped { key, reason }) => RecordOutcome::Skipped {
                    key: Some(key),
                    reason: reason.to_string(),
                },
                Err(e) => {
                    error!(
                        index,
                        bucket = %event.bucket,
                        key = %event.key,
                        kind = e.kind(),
                        error = %e,
                        "failed to process record"
                    );
                    RecordOutcome::Failed {
                        key: Some(event.key),
                        error: e.to_string(),
                    }
                }
            };
            report.push(outcome);
        }

        info!(
            records = notification.records.len(),
            processed = report.processed(),
            skipped = report.skipped(),
            failed = report.failed(),
            "finished batch"
        );
        report
    }

    /// Build the invocation response for a report under the configured
    /// failure policy.
    #[must_use]
    pub fn response_for(&self, report: &BatchReport) -> InvocationResponse {
        let accept_failures = self.config().failure_policy == FailurePolicy::Drop;
        if accept_failures && report.has_failures() {
            warn!(
                failed = report.failed(),
                "dropping failed records without redelivery"
            );
        }
        InvocationResponse::from_report(report, accept_failures)
    }
}
