//! Notification batch integration tests.

#[cfg(test)]
mod tests {
    use imgflow_model::{S3EventNotification, S3EventRecord};

    use crate::{cleanup_bucket, create_test_bucket, list_keys, png_fixture, put_object, s3_client, worker};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_process_batch_with_partial_failure() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "batch").await;
        let scratch = tempfile::tempdir().expect("scratch root");
        put_object(&client, &bucket, "original/a.png", png_fixture(20, 20)).await;
        put_object(&client, &bucket, "original/b c.png", png_fixture(30, 10)).await;

        let notification = S3EventNotification::new(vec![
            S3EventRecord::object_created(&bucket, "original/a.png", 0),
            S3EventRecord::object_created(&bucket, "original/missing.png", 0),
            S3EventRecord::object_created(&bucket, "original/b+c.png", 0),
        ]);

        let worker = worker(&client, scratch.path());
        let report = worker.handle_batch(&notification).await;

        assert_eq!(report.processed(), 2);
        assert_eq!(report.failed_keys(), vec![Some("original/missing.png")]);
        assert!(!worker.response_for(&report).is_success());

        let mut written = list_keys(&client, &bucket, "resized/").await;
        written.sort();
        assert_eq!(written, vec!["resized/a.png", "resized/b c.png"]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_overwrite_identically_on_redelivery() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "redeliver").await;
        let scratch = tempfile::tempdir().expect("scratch root");
        put_object(&client, &bucket, "original/dup.png", png_fixture(16, 16)).await;

        let notification = S3EventNotification::new(vec![S3EventRecord::object_created(
            &bucket,
            "original/dup.png",
            0,
        )]);
        let worker = worker(&client, scratch.path());

        worker.handle_batch(&notification).await;
        let first = crate::get_object(&client, &bucket, "resized/dup.png").await;
        worker.handle_batch(&notification).await;
        let second = crate::get_object(&client, &bucket, "resized/dup.png").await;

        assert_eq!(first, second);

        cleanup_bucket(&client, &bucket).await;
    }
}
