//! Worker configuration.
//!
//! Provides [`WorkerConfig`] for the transform worker. Values are loaded from
//! environment variables and validated before the worker starts, so a
//! misconfigured trigger fails at start-up rather than on the first event.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::ConfigError;
use crate::keys;

/// Default pixel limit for decoded inputs.
const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

/// Encoding of transformed objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Baseline JPEG.
    Jpeg,
}

impl OutputFormat {
    /// MIME type written with uploaded results.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Matching [`image::ImageFormat`].
    #[must_use]
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            _ => Err(ConfigError::InvalidValue {
                name: "OUTPUT_FORMAT",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        })
    }
}

/// What an invocation reports when some of its records failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the invocation so the platform redelivers the payload.
    #[default]
    Redeliver,
    /// Log and report failed records, then complete the invocation.
    Drop,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redeliver" | "retry" => Ok(Self::Redeliver),
            "drop" => Ok(Self::Drop),
            _ => Err(ConfigError::InvalidValue {
                name: "FAILURE_POLICY",
                value: s.to_owned(),
            }),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable lines.
    Text,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            _ => Err(ConfigError::InvalidValue {
                name: "LOG_FORMAT",
                value: s.to_owned(),
            }),
        }
    }
}

/// Transform worker configuration.
///
/// # Examples
///
/// ```
/// use imgflow_core::config::WorkerConfig;
///
/// let config = WorkerConfig::builder()
///     .source_prefix("uploads/".into())
///     .destination_prefix("thumbs/".into())
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.scale_divisor, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Prefix of keys the worker transforms.
    #[builder(default = String::from("original/"))]
    pub source_prefix: String,

    /// Prefix that replaces the source prefix in result keys.
    #[builder(default = String::from("resized/"))]
    pub destination_prefix: String,

    /// Bucket results are written to; the event's bucket when unset.
    #[builder(default)]
    pub destination_bucket: Option<String>,

    /// Encoding of results.
    #[builder(default)]
    pub output_format: OutputFormat,

    /// Each side of the image is divided by this value.
    #[builder(default = 2)]
    pub scale_divisor: u32,

    /// JPEG quality (1-100), ignored for PNG output.
    #[builder(default = 85)]
    pub jpeg_quality: u8,

    /// Inputs with more pixels than this are rejected before decoding.
    #[builder(default = DEFAULT_MAX_PIXELS)]
    pub max_pixels: u64,

    /// Directory holding per-invocation scratch space; the system temp dir when unset.
    #[builder(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Handling of failed records.
    #[builder(default)]
    pub failure_policy: FailurePolicy,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Log output format.
    #[builder(default)]
    pub log_format: LogFormat,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WorkerConfig {
    /// Load and validate configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SOURCE_PREFIX` | `original/` |
    /// | `DESTINATION_PREFIX` | `resized/` |
    /// | `DESTINATION_BUCKET` | *(event bucket)* |
    /// | `OUTPUT_FORMAT` | `png` |
    /// | `SCALE_DIVISOR` | `2` |
    /// | `JPEG_QUALITY` | `85` |
    /// | `MAX_PIXELS` | `100000000` |
    /// | `SCRATCH_DIR` | system temp dir |
    /// | `FAILURE_POLICY` | `redeliver` |
    /// | `LOG_LEVEL` | `info` |
    /// | `LOG_FORMAT` | `json` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load and validate configuration from an arbitrary variable source.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgflow_core::config::{OutputFormat, WorkerConfig};
    ///
    /// let config = WorkerConfig::from_lookup(|name| match name {
    ///     "OUTPUT_FORMAT" => Some("jpeg".to_owned()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.output_format, OutputFormat::Jpeg);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("SOURCE_PREFIX") {
            config.source_prefix = v;
        }
        if let Some(v) = lookup("DESTINATION_PREFIX") {
            config.destination_prefix = v;
        }
        if let Some(v) = lookup("DESTINATION_BUCKET").filter(|v| !v.is_empty()) {
            config.destination_bucket = Some(v);
        }
        if let Some(v) = lookup("OUTPUT_FORMAT") {
            config.output_format = v.parse()?;
        }
        if let Some(v) = lookup("SCALE_DIVISOR") {
            config.scale_divisor = parse_number("SCALE_DIVISOR", &v)?;
        }
        if let Some(v) = lookup("JPEG_QUALITY") {
            config.jpeg_quality = parse_number("JPEG_QUALITY", &v)?;
        }
        if let Some(v) = lookup("MAX_PIXELS") {
            config.max_pixels = parse_number("MAX_PIXELS", &v)?;
        }
        if let Some(v) = lookup("SCRATCH_DIR").filter(|v| !v.is_empty()) {
            config.scratch_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("FAILURE_POLICY") {
            config.failure_policy = v.parse()?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            config.log_format = v.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the worker relies on.
    ///
    /// Both prefixes must be non-empty and neither may be a prefix of the
    /// other; otherwise a result could land under the source prefix and
    /// trigger the worker again.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix {
                name: "SOURCE_PREFIX",
            });
        }
        if self.destination_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix {
                name: "DESTINATION_PREFIX",
            });
        }
        if keys::prefixes_overlap(&self.source_prefix, &self.destination_prefix) {
            return Err(ConfigError::OverlappingPrefixes {
                source_prefix: self.source_prefix.clone(),
                destination_prefix: self.destination_prefix.clone(),
            });
        }
        if self.scale_divisor == 0 {
            return Err(ConfigError::InvalidValue {
                name: "SCALE_DIVISOR",
                value: "0".to_owned(),
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                name: "JPEG_QUALITY",
                value: self.jpeg_quality.to_string(),
            });
        }
        Ok(())
    }

    /// Root directory for scratch space.
    #[must_use]
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_owned(),
    })
}
