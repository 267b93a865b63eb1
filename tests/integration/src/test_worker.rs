//! Single-event worker integration tests.

#[cfg(test)]
mod tests {
    use image::{GenericImageView, ImageFormat};
    use imgflow_core::{Outcome, StoreError, WorkerError};
    use imgflow_model::CreationEvent;

    use crate::{
        cleanup_bucket, create_test_bucket, get_object, list_keys, png_fixture, put_object,
        s3_client, worker,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_write_resized_copy() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "resize").await;
        let scratch = tempfile::tempdir().expect("scratch root");
        put_object(&client, &bucket, "original/cat.png", png_fixture(64, 64)).await;

        let outcome = worker(&client, scratch.path())
            .handle(&CreationEvent::new(&bucket, "original/cat.png"))
            .await
            .expect("handle");

        let Outcome::Processed(summary) = outcome else {
            panic!("expected processed outcome, got {outcome:?}");
        };
        assert_eq!(summary.dest_key, "resized/cat.png");

        let body = get_object(&client, &bucket, "resized/cat.png").await;
        assert_eq!(image::guess_format(&body).expect("format"), ImageFormat::Png);
        let img = image::load_from_memory(&body).expect("decode result");
        assert_eq!(img.dimensions(), (32, 32));
        assert_eq!(summary.bytes_out, body.len() as u64);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_ignore_keys_outside_source_prefix() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "skip").await;
        let scratch = tempfile::tempdir().expect("scratch root");
        put_object(&client, &bucket, "other/cat.png", png_fixture(8, 8)).await;

        let outcome = worker(&client, scratch.path())
            .handle(&CreationEvent::new(&bucket, "other/cat.png"))
            .await
            .expect("handle");

        assert!(matches!(outcome, Outcome::Skipped { .. }));
        assert!(list_keys(&client, &bucket, "resized/").await.is_empty());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_missing_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "missing").await;
        let scratch = tempfile::tempdir().expect("scratch root");

        let err = worker(&client, scratch.path())
            .handle(&CreationEvent::new(&bucket, "original/gone.png"))
            .await
            .expect_err("missing object");

        assert!(
            matches!(
                err,
                WorkerError::Fetch {
                    source: StoreError::NotFound { .. },
                    ..
                }
            ),
            "unexpected error: {err}"
        );
        assert!(list_keys(&client, &bucket, "resized/").await.is_empty());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_leave_no_result_for_corrupt_input() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "corrupt").await;
        let scratch = tempfile::tempdir().expect("scratch root");
        put_object(&client, &bucket, "original/bad.dat", b"not an image".to_vec()).await;

        let err = worker(&client, scratch.path())
            .handle(&CreationEvent::new(&bucket, "original/bad.dat"))
            .await
            .expect_err("corrupt input");

        assert_eq!(err.kind(), "transform");
        assert!(list_keys(&client, &bucket, "resized/").await.is_empty());
        assert_eq!(
            std::fs::read_dir(scratch.path()).expect("read scratch").count(),
            0
        );

        cleanup_bucket(&client, &bucket).await;
    }
}
