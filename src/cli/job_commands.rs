use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use crate::collectors::{HttpSpeedtestClient, MeasurementClient, MeasurementError, SpeedSampler};
use crate::config::JobConfig;
use crate::graphs::{PlottersReportRenderer, RenderError, ReportRenderer, RunArtifacts, read_results};
use crate::job::{JobError, SpeedtestJob};
use crate::logging::TAG;
use crate::models::Run;
use crate::storage::S3Publisher;

pub type DefaultJob = SpeedtestJob<HttpSpeedtestClient, PlottersReportRenderer, S3Publisher>;

/// Wires the production collaborators for each subcommand
pub struct JobCommandHandler {
    config: JobConfig,
}

impl JobCommandHandler {
    pub fn new(config: JobConfig) -> Self {
        Self { config }
    }

    fn speedtest_client(&self) -> Result<HttpSpeedtestClient, MeasurementError> {
        HttpSpeedtestClient::new(
            self.config.speedtest_servers_url.clone(),
            self.config.speedtest_timeout(),
        )
    }

    /// Builds the job; fails before any measurement when the bucket is not configured
    pub fn build_job(&self) -> Result<DefaultJob, JobError> {
        let bucket = self
            .config
            .bucket_settings()
            .map_err(JobError::PublisherSetup)?;
        self.ensure_output_dir()?;

        let sampler = SpeedSampler::new(self.speedtest_client()?, self.config.sampler_config());
        Ok(SpeedtestJob::new(
            self.config.region.clone(),
            sampler,
            PlottersReportRenderer::new(&self.config.output_dir),
            S3Publisher::new(&bucket),
        ))
    }

    pub async fn list_servers(&self) -> Result<()> {
        let mut client = self
            .speedtest_client()
            .context("failed to set up the speed test client")?;

        let servers = client.list_candidate_servers().await?;
        println!("Candidate servers");
        println!("=================");
        for server in &servers {
            match server.distance {
                Some(distance) => println!("  {server} - {distance:.0} km"),
                None => println!("  {server}"),
            }
        }

        let best = client.select_best_server().await?;
        println!("\nSelected: {best}");
        Ok(())
    }

    pub fn render_from_results(&self, results: &Path) -> Result<RunArtifacts> {
        let samples = read_results(results)
            .with_context(|| format!("failed to load {}", results.display()))?;
        info!(
            "{TAG}: Rendering {} samples from {}",
            samples.len(),
            results.display()
        );

        self.ensure_output_dir()
            .context("failed to prepare the output directory")?;
        let renderer = PlottersReportRenderer::new(&self.config.output_dir);
        let artifacts = renderer.render(&Run::new(self.config.region.clone(), samples))?;
        Ok(artifacts)
    }

    fn ensure_output_dir(&self) -> Result<(), RenderError> {
        std::fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| RenderError::io(&self.config.output_dir, e))
    }
}
