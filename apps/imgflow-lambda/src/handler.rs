//! Bridge between the Lambda runtime and the transform worker.

use imgflow_core::TransformWorker;
use imgflow_model::{InvocationResponse, S3EventNotification};
use lambda_runtime::{Error, LambdaEvent};
use tracing::info;

/// Returned to the runtime when an invocation must be redelivered.
#[derive(Debug, thiserror::Error)]
#[error("{failed} of {total} records failed: {body}")]
pub(crate) struct InvocationFailed {
    failed: usize,
    total: usize,
    body: String,
}

/// Handle one invocation.
///
/// Under the `redeliver` failure policy any failed record turns into an
/// error, which marks the invocation failed for the runtime.
pub(crate) async fn function_handler(
    event: LambdaEvent<S3EventNotification>,
    worker: &TransformWorker,
) -> Result<InvocationResponse, Error> {
    let (payload, context) = event.into_parts();
    info!(
        request_id = %context.request_id,
        records = payload.records.len(),
        "received invocation"
    );

    let report = worker.handle_batch(&payload).await;
    let response = worker.response_for(&report);
    if !response.is_success() {
        return Err(InvocationFailed {
            failed: report.failed(),
            total: report.records.len(),
            body: response.body,
        }
        .into());
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use bytes::Bytes;
    use image::{DynamicImage, ImageFormat};
    use imgflow_core::{FailurePolicy, InMemoryObjectStore, WorkerConfig};
    use imgflow_model::S3EventRecord;
    use lambda_runtime::Context;

    use super::*;

    fn png_fixture() -> Bytes {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(64, 64)
            .write_to(&mut buf, ImageFormat::Png)
            .expect("encode fixture");
        Bytes::from(buf.into_inner())
    }

    fn setup(policy: FailurePolicy) -> (TransformWorker, Arc<InMemoryObjectStore>, tempfile::TempDir) {
        let scratch_root = tempfile::tempdir().expect("scratch root");
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert("photos", "original/cat.png", png_fixture(), "image/png");
        let config = WorkerConfig::builder()
            .failure_policy(policy)
            .scratch_dir(Some(scratch_root.path().to_path_buf()))
            .build();
        let worker = TransformWorker::with_downscaler(store.clone(), config).expect("valid config");
        (worker, store, scratch_root)
    }

    fn invocation(keys: &[&str]) -> LambdaEvent<S3EventNotification> {
        let records = keys
            .iter()
            .map(|key| S3EventRecord::object_created("photos", *key, 0))
            .collect();
        LambdaEvent::new(S3EventNotification::new(records), Context::default())
    }

    #[tokio::test]
    async fn test_should_return_ok_response() {
        let (worker, store, _scratch) = setup(FailurePolicy::Redeliver);

        let response = function_handler(invocation(&["original/cat.png", "other/cat.png"]), &worker)
            .await
            .expect("invocation succeeds");

        assert_eq!(response.status_code, 200);
        let body: serde_json::Value = serde_json::from_str(&response.body).expect("json body");
        assert_eq!(body["processed"], 1);
        assert_eq!(body["skipped"], 1);
        assert!(store.object("photos", "resized/cat.png").is_some());
    }

    #[tokio::test]
    async fn test_should_fail_invocation_with_failed_records() {
        let (worker, _store, _scratch) = setup(FailurePolicy::Redeliver);

        let err = function_handler(invocation(&["original/missing.png"]), &worker)
            .await
            .expect_err("invocation fails");

        assert!(err.to_string().starts_with("1 of 1 records failed"));
    }

    #[tokio::test]
    async fn test_should_report_dropped_records() {
        let (worker, _store, _scratch) = setup(FailurePolicy::Drop);

        let response = function_handler(invocation(&["original/missing.png"]), &worker)
            .await
            .expect("invocation completes");

        assert!(response.is_success());
        assert!(response.body.contains("original/missing.png"));
    }

    #[tokio::test]
    async fn test_should_process_valid_records_next_to_mistyped_one() {
        let (worker, store, _scratch) = setup(FailurePolicy::Drop);
        let payload: S3EventNotification = serde_json::from_value(serde_json::json!({
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "photos" },
                        "object": { "key": "original/broken.png", "size": "10" }
                    }
                },
                S3EventRecord::object_created("photos", "original/cat.png", 0)
            ]
        }))
        .expect("payload deserializes");

        let response = function_handler(LambdaEvent::new(payload, Context::default()), &worker)
            .await
            .expect("invocation completes");

        let body: serde_json::Value = serde_json::from_str(&response.body).expect("json body");
        assert_eq!(body["processed"], 1);
        assert_eq!(body["failed"], 1);
        assert!(response.body.contains("original/broken.png"));
        assert!(store.object("photos", "resized/cat.png").is_some());
    }
}
