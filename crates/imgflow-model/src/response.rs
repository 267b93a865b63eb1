//! Invocation response returned to the runtime.

use serde::{Deserialize, Serialize};

use crate::report::BatchReport;

/// `{statusCode, body}` document returned from an invocation.
///
/// A `statusCode` of 200 tells the invoking platform the invocation
/// succeeded; anything else is a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    /// HTTP-style status code.
    pub status_code: u16,
    /// JSON-encoded report.
    pub body: String,
}

impl InvocationResponse {
    /// Status code of a successful invocation.
    pub const OK: u16 = 200;
    /// Status code of an invocation with failed records.
    pub const FAILED: u16 = 500;

    /// Build a response from a batch report.
    ///
    /// `accept_failures` turns a report with failed records into a 200
    /// response, which tells the platform not to redeliver the payload.
    #[must_use]
    pub fn from_report(report: &BatchReport, accept_failures: bool) -> Self {
        let status_code = if report.has_failures() && !accept_failures {
            Self::FAILED
        } else {
            Self::OK
        };
        let body = serde_json::json!({
            "processed": report.processed(),
            "skipped": report.skipped(),
            "failed": report.failed(),
            "records": report.records,
        });
        Self {
            status_code,
            body: body.to_string(),
        }
    }

    /// Whether the response signals success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code == Self::OK
    }
}
