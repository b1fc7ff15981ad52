//! One job invocation: sample, render, publish.
//!
//! Every stage failure ends the job with a `JobError`. Artifacts are
//! published one at a time in a fixed order and each local copy is removed
//! as soon as its upload succeeds. A failed upload stops the job; objects
//! already uploaded stay in the bucket.

use config::ConfigError;
use log::{debug, error, info};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::collectors::{MeasurementClient, MeasurementError, SpeedSampler};
use crate::graphs::{ArtifactKind, RenderError, ReportRenderer, RunArtifacts};
use crate::logging::TAG;
use crate::models::{Run, ServerDescriptor};
use crate::storage::{DEFAULT_BUCKET, PublishError, Publisher};

/// Result handed back to the invoking framework on success
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub avg_download_speed: f64,
    pub avg_upload_speed: f64,
    pub results_url: String,
    pub speed_image_url: String,
    pub ping_image_url: String,
    pub best_server: ServerDescriptor,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot publish artifacts: {0}")]
    PublisherSetup(#[source] PublishError),

    #[error("speed test failed: {0}")]
    Measurement(#[from] MeasurementError),

    #[error("report rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("upload of {artifact} artifact failed: {source}")]
    Publish {
        artifact: ArtifactKind,
        /// Remote keys uploaded before the failure; they are not removed
        published: Vec<String>,
        #[source]
        source: PublishError,
    },
}

impl JobError {
    /// Fixed log prefix naming the failing stage
    pub fn stage_tag(&self) -> &'static str {
        match self {
            JobError::Config(_) => "[Speedtest][ERROR][config]",
            JobError::Measurement(_) => "[Speedtest][ERROR][measure]",
            JobError::Render(_) => "[Speedtest][ERROR][render]",
            JobError::PublisherSetup(_) | JobError::Publish { .. } => "[Speedtest][ERROR][publish]",
        }
    }

    /// Logs the failure under its stage tag, including objects left behind
    pub fn log(&self) {
        error!("{}: {self}", self.stage_tag());
        if let JobError::Publish { published, .. } = self {
            if !published.is_empty() {
                error!("{}: already published: {}", self.stage_tag(), published.join(", "));
            }
        }
    }

    /// Process exit code the binary terminates with
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub struct SpeedtestJob<C, R, P> {
    region: String,
    bucket: String,
    sampler: SpeedSampler<C>,
    renderer: R,
    publisher: P,
}

impl<C, R, P> SpeedtestJob<C, R, P>
where
    C: MeasurementClient,
    R: ReportRenderer,
    P: Publisher,
{
    pub fn new(
        region: impl Into<String>,
        sampler: SpeedSampler<C>,
        renderer: R,
        publisher: P,
    ) -> Self {
        Self {
            region: region.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            sampler,
            renderer,
            publisher,
        }
    }

    pub async fn run(&mut self) -> Result<JobSummary, JobError> {
        let output = self.sampler.run(&self.region).await?;
        let run = Run::new(self.region.clone(), output.samples);

        let artifacts = self.renderer.render(&run)?;
        let (Some(avg_download), Some(avg_upload)) =
            (run.mean_download_mbps(), run.mean_upload_mbps())
        else {
            return Err(RenderError::NoSamples.into());
        };

        let mut published = Vec::with_capacity(3);
        let results_url = self
            .publish(ArtifactKind::Results, &artifacts, &mut published)
            .await?;
        let speed_image_url = self
            .publish(ArtifactKind::SpeedPlot, &artifacts, &mut published)
            .await?;
        let ping_image_url = self
            .publish(ArtifactKind::PingPlot, &artifacts, &mut published)
            .await?;

        let summary = JobSummary {
            avg_download_speed: round_to_hundredths(avg_download),
            avg_upload_speed: round_to_hundredths(avg_upload),
            results_url,
            speed_image_url,
            ping_image_url,
            best_server: output.server,
        };
        info!(
            "{TAG}: Finished {} | avg download {:.2} Mbps | avg upload {:.2} Mbps",
            self.region, summary.avg_download_speed, summary.avg_upload_speed
        );
        Ok(summary)
    }

    async fn publish(
        &self,
        kind: ArtifactKind,
        artifacts: &RunArtifacts,
        published: &mut Vec<String>,
    ) -> Result<String, JobError> {
        let path = artifacts.path(kind);
        let key = remote_key(path);

        match self.publisher.upload(path, &self.bucket, &key).await {
            Ok(url) => {
                info!("{TAG}: Uploaded {kind} artifact {key}");
                remove_local_copy(path);
                published.push(key);
                Ok(url)
            }
            Err(source) => Err(JobError::Publish {
                artifact: kind,
                published: published.clone(),
                source,
            }),
        }
    }
}

/// Rounds to two decimal places, as reported in the summary
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Objects are keyed by the artifact's file name
fn remote_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn remove_local_copy(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!("Ignoring failure to remove {}: {e}", path.display());
    }
}
