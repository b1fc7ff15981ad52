//! Fixed-cadence sampling loop
//!
//! Resolves the best server once, then takes download, upload and ping
//! measurements until the configured window has elapsed, sleeping a fixed
//! interval after every cycle. Termination is purely time based, so the
//! number of samples depends on how long each measurement takes.

use chrono::Utc;
use log::{debug, info};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::collectors::client::MeasurementClient;
use crate::collectors::errors::MeasurementError;
use crate::logging::{TAG, TESTING_TAG};
use crate::models::{Sample, ServerDescriptor};

/// Delay between the end of one measurement cycle and the start of the next
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Total sampling window
    pub duration: Duration,
    pub interval: Duration,
}

impl SamplerConfig {
    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            duration: Duration::from_secs(minutes.saturating_mul(60)),
            interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// What one sampling run produced
#[derive(Debug, Clone)]
pub struct SamplerOutput {
    pub server: ServerDescriptor,
    pub samples: Vec<Sample>,
}

/// Drives a `MeasurementClient` for a fixed window
pub struct SpeedSampler<C> {
    client: C,
    config: SamplerConfig,
}

impl<C: MeasurementClient> SpeedSampler<C> {
    pub fn new(client: C, config: SamplerConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Runs the sampling window.
    ///
    /// The first client failure aborts the run; samples gathered so far are
    /// discarded with it.
    pub async fn run(&mut self, region: &str) -> Result<SamplerOutput, MeasurementError> {
        info!("{TAG}: Starting test on region {region}");

        let candidates = self.client.list_candidate_servers().await?;
        debug!("{TAG}: {} candidate servers listed", candidates.len());

        let server = self.client.select_best_server().await?;
        info!("{TAG}: Selected server for test: {server}");

        let started = Instant::now();
        let deadline = started + self.config.duration;
        let mut samples = Vec::new();

        while Instant::now() < deadline {
            let sample = self.sample_once().await?;
            info!(
                "{TESTING_TAG}: {region} | {} ms | Download {:.2} Mbps | Upload {:.2} Mbps",
                sample.ping_ms, sample.download_speed_mbps, sample.upload_speed_mbps
            );
            samples.push(sample);

            sleep(self.config.interval).await;
        }

        info!(
            "{TAG}: Collected {} samples in {:.1}s",
            samples.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(SamplerOutput { server, samples })
    }

    async fn sample_once(&mut self) -> Result<Sample, MeasurementError> {
        let download = self.client.measure_download().await?;
        let upload = self.client.measure_upload().await?;
        let ping = self
            .client
            .last_ping_ms()
            .ok_or(MeasurementError::NoServerSelected)?;

        Ok(Sample::from_raw(Utc::now(), download, upload, ping))
    }
}
