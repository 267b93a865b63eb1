//! imgflow Lambda function.
//!
//! Runs the transform worker behind the Lambda runtime API. Each invocation
//! receives an S3 event notification, transforms every object created under
//! the source prefix and writes the result under the destination prefix.
//!
//! # Usage
//!
//! ```text
//! bootstrap                          # serve the Lambda runtime API
//! bootstrap --invoke payload.json    # process one payload locally and exit
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SOURCE_PREFIX` | `original/` | Prefix of keys to transform |
//! | `DESTINATION_PREFIX` | `resized/` | Prefix of written results |
//! | `DESTINATION_BUCKET` | *(event bucket)* | Bucket results are written to |
//! | `OUTPUT_FORMAT` | `png` | `png` or `jpeg` |
//! | `SCALE_DIVISOR` | `2` | Each side is divided by this value |
//! | `JPEG_QUALITY` | `85` | JPEG quality, 1 to 100 |
//! | `MAX_PIXELS` | `100000000` | Larger inputs are rejected |
//! | `SCRATCH_DIR` | *(system temp dir)* | Root of per-invocation scratch space |
//! | `FAILURE_POLICY` | `redeliver` | `redeliver` or `drop` |
//! | `S3_ENDPOINT_URL` | *(unset)* | Custom S3 endpoint, path-style addressing |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `json` | `json` or `text` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use imgflow_core::{LogFormat, S3ObjectStore, TransformWorker, WorkerConfig};
use imgflow_model::S3EventNotification;
use lambda_runtime::service_fn;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Version reported at start-up.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }

    Ok(())
}

/// Build an S3 client from the ambient AWS configuration.
///
/// When `endpoint_url` is set the client targets it with path-style
/// addressing, which S3-compatible emulators expect.
async fn build_s3_client(endpoint_url: Option<&str>) -> aws_sdk_s3::Client {
    let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(url) = endpoint_url {
        builder = builder.endpoint_url(url).force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}

/// Extract the payload path from `--invoke <path>` or `--invoke=<path>`.
fn invoke_path(args: impl IntoIterator<Item = String>) -> Option<PathBuf> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--invoke" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--invoke=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// Process one payload file and print the invocation response.
async fn invoke_local(worker: &TransformWorker, path: &Path) -> Result<()> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    let payload: S3EventNotification = serde_json::from_slice(&raw)
        .with_context(|| format!("invalid notification payload in {}", path.display()))?;

    let report = worker.handle_batch(&payload).await;
    let response = worker.response_for(&report);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        anyhow::bail!("{} of {} records failed", report.failed(), report.records.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = WorkerConfig::from_env().context("invalid worker configuration")?;

    init_tracing(&config.log_level, config.log_format)?;

    info!(
        source_prefix = %config.source_prefix,
        destination_prefix = %config.destination_prefix,
        destination_bucket = ?config.destination_bucket,
        output_format = %config.output_format,
        scale_divisor = config.scale_divisor,
        failure_policy = ?config.failure_policy,
        version = VERSION,
        "starting imgflow worker",
    );

    let endpoint_url = std::env::var("S3_ENDPOINT_URL").ok();
    let client = build_s3_client(endpoint_url.as_deref()).await;
    let store = Arc::new(S3ObjectStore::new(client));
    let worker = TransformWorker::with_downscaler(store, config)?;

    if let Some(path) = invoke_path(std::env::args().skip(1)) {
        return invoke_local(&worker, &path).await;
    }

    lambda_runtime::run(service_fn(|event| {
        handler::function_handler(event, &worker)
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))
}
