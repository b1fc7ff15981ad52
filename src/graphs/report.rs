//! Report rendering
//!
//! Turns a run into its three local artifacts: the JSON results document,
//! the speed chart and the ping chart. All three share one render-time stamp
//! in their file names. Uploading and cleaning up the files is left to the
//! caller.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::graphs::ping_graphs::PingGraph;
use crate::graphs::speed_graphs::SpeedGraph;
use crate::graphs::{GraphRenderer, RenderError};
use crate::logging::TAG;
use crate::models::{Run, Sample};

/// Stamp embedded in artifact file names
pub const RENDER_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Results,
    SpeedPlot,
    PingPlot,
}

impl ArtifactKind {
    pub fn token(&self) -> &'static str {
        match self {
            ArtifactKind::Results => "results",
            ArtifactKind::SpeedPlot => "speed",
            ArtifactKind::PingPlot => "ping",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Results => "json",
            ArtifactKind::SpeedPlot | ArtifactKind::PingPlot => "png",
        }
    }

    /// `{region}_speed_test_{token}_{stamp}.{ext}`
    pub fn file_name(&self, region: &str, stamp: &str) -> String {
        format!(
            "{region}_speed_test_{}_{stamp}.{}",
            self.token(),
            self.extension()
        )
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Local paths of one run's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    pub results: PathBuf,
    pub speed_plot: PathBuf,
    pub ping_plot: PathBuf,
}

impl RunArtifacts {
    pub fn in_dir(dir: &Path, region: &str, stamp: &str) -> Self {
        let path_for = |kind: ArtifactKind| dir.join(kind.file_name(region, stamp));
        Self {
            results: path_for(ArtifactKind::Results),
            speed_plot: path_for(ArtifactKind::SpeedPlot),
            ping_plot: path_for(ArtifactKind::PingPlot),
        }
    }

    pub fn path(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Results => &self.results,
            ArtifactKind::SpeedPlot => &self.speed_plot,
            ArtifactKind::PingPlot => &self.ping_plot,
        }
    }
}

/// Produces a run's local artifacts
pub trait ReportRenderer {
    /// Fails with `RenderError::NoSamples` for an empty run, before any file
    /// is written.
    fn render(&self, run: &Run) -> Result<RunArtifacts, RenderError>;
}

/// Renders PNG charts with plotters next to the JSON results document
#[derive(Debug, Clone)]
pub struct PlottersReportRenderer {
    output_dir: PathBuf,
}

impl PlottersReportRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Renders using `rendered_at` for the file name stamp
    pub fn render_at(
        &self,
        run: &Run,
        rendered_at: DateTime<Utc>,
    ) -> Result<RunArtifacts, RenderError> {
        if run.is_empty() {
            return Err(RenderError::NoSamples);
        }

        let stamp = rendered_at.format(RENDER_TIMESTAMP_FORMAT).to_string();
        let artifacts = RunArtifacts::in_dir(&self.output_dir, &run.region, &stamp);

        write_results(&artifacts.results, &run.samples)?;
        debug!("Wrote results document {}", artifacts.results.display());

        SpeedGraph::new(&run.region, &run.samples).render(&artifacts.speed_plot)?;
        debug!("Rendered speed chart {}", artifacts.speed_plot.display());

        PingGraph::new(&run.region, &run.samples).render(&artifacts.ping_plot)?;
        debug!("Rendered ping chart {}", artifacts.ping_plot.display());

        info!(
            "{TAG}: Rendered report for {} samples ({})",
            run.samples.len(),
            stamp
        );
        Ok(artifacts)
    }
}

impl ReportRenderer for PlottersReportRenderer {
    fn render(&self, run: &Run) -> Result<RunArtifacts, RenderError> {
        self.render_at(run, Utc::now())
    }
}

/// Serializes samples as a JSON array indented with four spaces
pub fn results_document(samples: &[Sample]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    samples.serialize(&mut serializer)?;
    Ok(buffer)
}

pub fn write_results(path: &Path, samples: &[Sample]) -> Result<(), RenderError> {
    let document = results_document(samples)?;
    fs::write(path, document).map_err(|e| RenderError::io(path, e))
}

pub fn read_results(path: &Path) -> Result<Vec<Sample>, RenderError> {
    let raw = fs::read(path).map_err(|e| RenderError::io(path, e))?;
    Ok(serde_json::from_slice(&raw)?)
}
