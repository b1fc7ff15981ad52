//! Measurement samples and the run they belong to

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Raw throughput units reported by the measurement client per Mbps.
///
/// This is the divisor used by every report this job has ever produced and
/// must stay at exactly ten million.
pub const RAW_UNITS_PER_MBPS: f64 = 10_000_000.0;

/// Timestamp layout used in the results document
pub const SAMPLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One download/upload/ping measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// UTC wall-clock time the sample was taken, second resolution
    #[serde(with = "sample_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub download_speed_mbps: f64,
    pub upload_speed_mbps: f64,
    /// Latency to the selected server in milliseconds
    pub ping_ms: f64,
}

impl Sample {
    /// Builds a sample from raw client throughput values.
    ///
    /// The timestamp is truncated to whole seconds.
    pub fn from_raw(
        timestamp: DateTime<Utc>,
        download_raw: f64,
        upload_raw: f64,
        ping_ms: f64,
    ) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            download_speed_mbps: to_mbps(download_raw),
            upload_speed_mbps: to_mbps(upload_raw),
            ping_ms,
        }
    }
}

/// Converts raw client throughput to Mbps
pub fn to_mbps(raw: f64) -> f64 {
    raw / RAW_UNITS_PER_MBPS
}

/// All samples gathered by one job invocation, labelled with the region
/// the worker runs in
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub region: String,
    pub samples: Vec<Sample>,
}

impl Run {
    pub fn new(region: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            region: region.into(),
            samples,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Arithmetic mean of the download speeds, `None` for an empty run
    pub fn mean_download_mbps(&self) -> Option<f64> {
        mean(self.samples.iter().map(|s| s.download_speed_mbps))
    }

    /// Arithmetic mean of the upload speeds, `None` for an empty run
    pub fn mean_upload_mbps(&self) -> Option<f64> {
        mean(self.samples.iter().map(|s| s.upload_speed_mbps))
    }

    pub fn mean_ping_ms(&self) -> Option<f64> {
        mean(self.samples.iter().map(|s| s.ping_ms))
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

mod sample_timestamp {
    use super::SAMPLE_TIMESTAMP_FORMAT;
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        timestamp: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&timestamp.format(SAMPLE_TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, SAMPLE_TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
