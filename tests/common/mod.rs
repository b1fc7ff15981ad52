//! Fakes shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use speedtest_reporter::collectors::{MeasurementClient, MeasurementError};
use speedtest_reporter::graphs::{RenderError, ReportRenderer, RunArtifacts, write_results};
use speedtest_reporter::models::{Run, ServerDescriptor};
use speedtest_reporter::storage::{PublishError, Publisher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Measurement client returning the same readings every cycle
pub struct ScriptedClient {
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
    pub latency: Duration,
    pub fail_selection: bool,
    selected: bool,
}

impl ScriptedClient {
    pub fn constant(download: f64, upload: f64, ping: f64) -> Self {
        Self {
            download,
            upload,
            ping,
            latency: Duration::ZERO,
            fail_selection: false,
            selected: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_selection: true,
            ..Self::constant(0.0, 0.0, 0.0)
        }
    }

    fn server(&self) -> ServerDescriptor {
        let mut server = ServerDescriptor::new("4242", "http://speed.test:8080/speedtest/upload.php");
        server.sponsor = "Test ISP".to_string();
        server.name = "Ashburn, VA".to_string();
        server.country = "United States".to_string();
        server
    }
}

#[async_trait]
impl MeasurementClient for ScriptedClient {
    async fn list_candidate_servers(&mut self) -> Result<Vec<ServerDescriptor>, MeasurementError> {
        Ok(vec![self.server()])
    }

    async fn select_best_server(&mut self) -> Result<ServerDescriptor, MeasurementError> {
        if self.fail_selection {
            return Err(MeasurementError::NoReachableServer { candidates: 1 });
        }
        self.selected = true;
        let mut server = self.server();
        server.latency_ms = Some(self.ping);
        Ok(server)
    }

    async fn measure_download(&mut self) -> Result<f64, MeasurementError> {
        tokio::time::sleep(self.latency).await;
        Ok(self.download)
    }

    async fn measure_upload(&mut self) -> Result<f64, MeasurementError> {
        tokio::time::sleep(self.latency).await;
        Ok(self.upload)
    }

    fn last_ping_ms(&self) -> Option<f64> {
        self.selected.then_some(self.ping)
    }
}

/// Writes the real results document and placeholder chart files
pub struct StubRenderer {
    output_dir: PathBuf,
}

impl StubRenderer {
    pub const STAMP: &'static str = "20240501_120000";

    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }
}

impl ReportRenderer for StubRenderer {
    fn render(&self, run: &Run) -> Result<RunArtifacts, RenderError> {
        if run.is_empty() {
            return Err(RenderError::NoSamples);
        }
        let artifacts = RunArtifacts::in_dir(&self.output_dir, &run.region, Self::STAMP);
        write_results(&artifacts.results, &run.samples)?;
        for chart in [&artifacts.speed_plot, &artifacts.ping_plot] {
            fs::write(chart, b"png").map_err(|source| RenderError::Io {
                path: chart.clone(),
                source,
            })?;
        }
        Ok(artifacts)
    }
}

#[derive(Debug, Clone)]
pub struct UploadCall {
    pub local_path: PathBuf,
    pub bucket: String,
    pub key: String,
    pub file_existed: bool,
}

/// Publisher recording every call; optionally fails the n-th call (1-based)
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    calls: Arc<Mutex<Vec<UploadCall>>>,
    fail_on_call: Option<usize>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_call(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<UploadCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        remote_key: &str,
    ) -> Result<String, PublishError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(UploadCall {
                local_path: local_path.to_path_buf(),
                bucket: bucket.to_string(),
                key: remote_key.to_string(),
                file_existed: local_path.exists(),
            });
            calls.len()
        };

        if self.fail_on_call == Some(call_number) {
            return Err(PublishError::Upload {
                bucket: bucket.to_string(),
                key: remote_key.to_string(),
                message: "simulated outage".to_string(),
            });
        }
        Ok(format!("https://objects.test/{bucket}/{remote_key}"))
    }
}
