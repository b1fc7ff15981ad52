//! Job configuration
//!
//! Values come from environment variables layered over defaults:
//!
//! | Variable                    | Default                        |
//! |-----------------------------|--------------------------------|
//! | `DURATION`                  | `5` (minutes)                  |
//! | `REGION`                    | `REGION NOT SET`               |
//! | `OUTPUT_DIR`                | `.`                            |
//! | `SPEEDTEST_SERVERS_URL`     | speedtest.net server list      |
//! | `SPEEDTEST_TIMEOUT_SECS`    | `30`                           |
//! | `BUCKET_ENDPOINT_URL`       | required for publishing        |
//! | `BUCKET_ACCESS_KEY_ID`      | required for publishing        |
//! | `BUCKET_SECRET_ACCESS_KEY`  | required for publishing        |
//! | `BUCKET_REGION`             | `us-east-1`                    |
//! | `BUCKET_URL_EXPIRY_SECS`    | `604800` (7 days)              |

use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::collectors::SamplerConfig;
use crate::collectors::speedtest_http::DEFAULT_SERVERS_URL;
use crate::storage::{BucketSettings, PublishError};

pub const DEFAULT_DURATION_MINUTES: u64 = 5;
pub const DEFAULT_REGION: &str = "REGION NOT SET";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobConfig {
    /// Sampling window in minutes
    pub duration: u64,
    /// Free-form label used in file names, chart titles and logs
    pub region: String,
    /// Where artifacts are written before upload
    pub output_dir: PathBuf,
    pub speedtest_servers_url: String,
    pub speedtest_timeout_secs: u64,
    #[serde(default)]
    pub bucket_endpoint_url: Option<String>,
    #[serde(default)]
    pub bucket_access_key_id: Option<String>,
    #[serde(default)]
    pub bucket_secret_access_key: Option<String>,
    pub bucket_region: String,
    pub bucket_url_expiry_secs: u64,
}

impl JobConfig {
    /// Loads configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    /// Loads configuration from an explicit variable map instead of the
    /// process environment
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().source(Some(vars)))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let mut config: JobConfig = Config::builder()
            .set_default("duration", DEFAULT_DURATION_MINUTES as i64)?
            .set_default("region", DEFAULT_REGION)?
            .set_default("output_dir", ".")?
            .set_default("speedtest_servers_url", DEFAULT_SERVERS_URL)?
            .set_default("speedtest_timeout_secs", 30_i64)?
            .set_default("bucket_region", "us-east-1")?
            .set_default("bucket_url_expiry_secs", 604_800_i64)?
            // Values stay strings; numeric fields are parsed during deserialization
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        if config.region.trim().is_empty() {
            config.region = DEFAULT_REGION.to_string();
        }
        Ok(config)
    }

    /// Applies command line overrides on top of the loaded values
    pub fn with_overrides(
        mut self,
        duration: Option<u64>,
        region: Option<String>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(duration) = duration {
            self.duration = duration;
        }
        if let Some(region) = region.filter(|r| !r.trim().is_empty()) {
            self.region = region;
        }
        if let Some(output_dir) = output_dir {
            self.output_dir = output_dir;
        }
        self
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig::from_minutes(self.duration)
    }

    pub fn speedtest_timeout(&self) -> Duration {
        Duration::from_secs(self.speedtest_timeout_secs)
    }

    /// Object store settings; every credential must be present
    pub fn bucket_settings(&self) -> Result<BucketSettings, PublishError> {
        let required = |value: &Option<String>, name: &'static str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or(PublishError::NotConfigured(name))
        };

        Ok(BucketSettings {
            endpoint_url: required(&self.bucket_endpoint_url, "BUCKET_ENDPOINT_URL")?,
            access_key_id: required(&self.bucket_access_key_id, "BUCKET_ACCESS_KEY_ID")?,
            secret_access_key: required(
                &self.bucket_secret_access_key,
                "BUCKET_SECRET_ACCESS_KEY",
            )?,
            region: self.bucket_region.clone(),
            url_expiry: Duration::from_secs(self.bucket_url_expiry_secs),
        })
    }
}
