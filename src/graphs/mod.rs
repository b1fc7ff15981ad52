pub mod ping_graphs;
pub mod report;
pub mod speed_graphs;

use chrono::{DateTime, Duration, Utc};
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Sample;

pub use report::{
    ArtifactKind, PlottersReportRenderer, ReportRenderer, RunArtifacts, read_results,
    results_document, write_results,
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render a report without samples")]
    NoSamples,

    #[error("failed to draw {chart} chart: {message}")]
    Draw { chart: &'static str, message: String },

    #[error("invalid results document: {0}")]
    Results(#[from] serde_json::Error),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub(crate) fn draw(chart: &'static str, err: anyhow::Error) -> Self {
        Self::Draw {
            chart,
            message: format!("{err:#}"),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub trait GraphRenderer {
    fn render(&self, output_path: &Path) -> Result<(), RenderError>;
}

pub struct GraphConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            title: "Speed Test".to_string(),
            x_label: "Timestamp".to_string(),
            y_label: "Value".to_string(),
        }
    }
}

impl GraphConfig {
    pub fn titled(title: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            ..Self::default()
        }
    }
}

/// X range covering every sample, padded so single samples and edge
/// markers stay inside the plot area
pub(crate) fn time_range(samples: &[Sample]) -> Option<Range<DateTime<Utc>>> {
    let first = samples.first()?.timestamp;
    let last = samples.last()?.timestamp;
    let padding = Duration::seconds(5);
    Some(first - padding..last + padding)
}

pub(crate) fn y_upper_bound(max_value: f64) -> f64 {
    if max_value > 0.0 { max_value * 1.1 } else { 1.0 }
}

pub(crate) fn time_label(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%H:%M:%S").to_string()
}
