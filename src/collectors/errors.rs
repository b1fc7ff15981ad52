//! Errors raised while selecting a server or taking measurements

use thiserror::Error;

/// Any failure from the measurement client. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("failed to build HTTP client: {0}")]
    ClientSetup(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid server list from {url}: {source}")]
    ServerList {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("the server list is empty")]
    NoServers,

    #[error("none of the {candidates} candidate servers answered the latency probe")]
    NoReachableServer { candidates: usize },

    #[error("no measurement server has been selected")]
    NoServerSelected,
}

impl MeasurementError {
    pub(crate) fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }
}
