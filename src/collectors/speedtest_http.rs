//! HTTP speed test client
//!
//! Talks to speedtest.net style servers: a JSON server list, a `latency.txt`
//! probe beside each server's upload endpoint, `random{N}x{N}.jpg` download
//! resources and form POST uploads. Transfers run one after another and
//! nothing is retried.

use async_trait::async_trait;
use log::{debug, info, trace, warn};
use reqwest::{Client, Response, Url};
use std::time::{Duration, Instant};

use crate::collectors::client::MeasurementClient;
use crate::collectors::errors::MeasurementError;
use crate::models::ServerDescriptor;

/// Public server list, closest servers first
pub const DEFAULT_SERVERS_URL: &str =
    "https://www.speedtest.net/api/js/servers?engine=js&https_functional=true&limit=10";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How many of the closest servers get latency probed
const CANDIDATE_LIMIT: usize = 5;
const LATENCY_PROBES: usize = 3;
/// Latency charged for a failed probe
const FAILED_PROBE_MS: f64 = 3_600_000.0;

const DEFAULT_DOWNLOAD_SIZES: [u32; 4] = [350, 500, 750, 1000];
const DEFAULT_UPLOAD_SIZES: [usize; 3] = [32_768, 131_072, 524_288];

pub struct HttpSpeedtestClient {
    http: Client,
    servers_url: String,
    servers: Vec<ServerDescriptor>,
    best: Option<ServerDescriptor>,
    download_sizes: Vec<u32>,
    upload_sizes: Vec<usize>,
}

impl HttpSpeedtestClient {
    pub fn new(servers_url: impl Into<String>, timeout: Duration) -> Result<Self, MeasurementError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("speedtest-reporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MeasurementError::ClientSetup)?;

        Ok(Self {
            http,
            servers_url: servers_url.into(),
            servers: Vec::new(),
            best: None,
            download_sizes: DEFAULT_DOWNLOAD_SIZES.to_vec(),
            upload_sizes: DEFAULT_UPLOAD_SIZES.to_vec(),
        })
    }

    /// Image edge lengths requested per download measurement
    pub fn with_download_sizes(mut self, sizes: Vec<u32>) -> Self {
        self.download_sizes = sizes;
        self
    }

    /// Payload sizes in bytes posted per upload measurement
    pub fn with_upload_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.upload_sizes = sizes;
        self
    }

    pub fn best_server(&self) -> Option<&ServerDescriptor> {
        self.best.as_ref()
    }

    fn selected_url(&self) -> Result<String, MeasurementError> {
        self.best
            .as_ref()
            .map(|server| server.url.clone())
            .ok_or(MeasurementError::NoServerSelected)
    }

    async fn fetch_servers(&self) -> Result<Vec<ServerDescriptor>, MeasurementError> {
        debug!("Fetching server list from {}", self.servers_url);
        let response = self
            .http
            .get(&self.servers_url)
            .send()
            .await
            .map_err(|e| MeasurementError::request(&self.servers_url, e))?;
        let body = check_status(response)?
            .text()
            .await
            .map_err(|e| MeasurementError::request(&self.servers_url, e))?;

        serde_json::from_str(&body).map_err(|source| MeasurementError::ServerList {
            url: self.servers_url.clone(),
            source,
        })
    }

    /// Average round trip to `latency.txt` in ms, rounded to microseconds
    async fn probe_latency(&self, server: &ServerDescriptor) -> Result<f64, MeasurementError> {
        let probe_url = sibling_url(&server.url, "latency.txt")?;
        let mut total_ms = 0.0;

        for attempt in 1..=LATENCY_PROBES {
            let started = Instant::now();
            let outcome = self.http.get(probe_url.clone()).send().await;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

            total_ms += match outcome {
                Ok(response) if response.status().is_success() => elapsed_ms,
                Ok(response) => {
                    debug!(
                        "Latency probe {attempt} to {probe_url} answered HTTP {}",
                        response.status().as_u16()
                    );
                    FAILED_PROBE_MS
                }
                Err(e) => {
                    debug!("Latency probe {attempt} to {probe_url} failed: {e}");
                    FAILED_PROBE_MS
                }
            };
        }

        let average = total_ms / LATENCY_PROBES as f64;
        Ok((average * 1000.0).round() / 1000.0)
    }
}

#[async_trait]
impl MeasurementClient for HttpSpeedtestClient {
    async fn list_candidate_servers(&mut self) -> Result<Vec<ServerDescriptor>, MeasurementError> {
        let servers = self.fetch_servers().await?;
        if servers.is_empty() {
            return Err(MeasurementError::NoServers);
        }
        info!("Server list returned {} servers", servers.len());
        self.servers = servers.clone();
        Ok(servers)
    }

    async fn select_best_server(&mut self) -> Result<ServerDescriptor, MeasurementError> {
        if self.servers.is_empty() {
            self.list_candidate_servers().await?;
        }

        let mut candidates = self.servers.clone();
        // Stable sort keeps list order for servers without a distance
        candidates.sort_by(|a, b| {
            a.distance
                .unwrap_or(f64::MAX)
                .total_cmp(&b.distance.unwrap_or(f64::MAX))
        });
        candidates.truncate(CANDIDATE_LIMIT);

        let mut best: Option<(ServerDescriptor, f64)> = None;
        for candidate in &candidates {
            let latency = match self.probe_latency(candidate).await {
                Ok(latency) => latency,
                Err(e) => {
                    warn!("Skipping server {}: {e}", candidate.id);
                    FAILED_PROBE_MS
                }
            };
            trace!("Server {} latency {latency:.3} ms", candidate.id);
            if best.as_ref().is_none_or(|(_, lowest)| latency < *lowest) {
                best = Some((candidate.clone(), latency));
            }
        }

        match best {
            Some((mut server, latency)) if latency < FAILED_PROBE_MS => {
                server.latency_ms = Some(latency);
                self.best = Some(server.clone());
                Ok(server)
            }
            _ => {
                warn!("No candidate server answered its latency probe");
                Err(MeasurementError::NoReachableServer {
                    candidates: candidates.len(),
                })
            }
        }
    }

    async fn measure_download(&mut self) -> Result<f64, MeasurementError> {
        let server_url = self.selected_url()?;
        let started = Instant::now();
        let mut total_bytes = 0u64;

        for size in &self.download_sizes {
            let url = sibling_url(&server_url, &format!("random{size}x{size}.jpg"))?;
            let response = self
                .http
                .get(url.clone())
                .send()
                .await
                .map_err(|e| MeasurementError::request(url.as_str(), e))?;
            let body = check_status(response)?
                .bytes()
                .await
                .map_err(|e| MeasurementError::request(url.as_str(), e))?;
            total_bytes += body.len() as u64;
        }

        let rate = throughput(total_bytes, started.elapsed());
        debug!("Downloaded {total_bytes} bytes at {rate:.0} B/s");
        Ok(rate)
    }

    async fn measure_upload(&mut self) -> Result<f64, MeasurementError> {
        let server_url = self.selected_url()?;
        let started = Instant::now();
        let mut total_bytes = 0u64;

        for size in &self.upload_sizes {
            let payload = upload_payload(*size);
            let sent = payload.len() as u64;
            let response = self
                .http
                .post(&server_url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(payload)
                .send()
                .await
                .map_err(|e| MeasurementError::request(&server_url, e))?;
            check_status(response)?;
            total_bytes += sent;
        }

        let rate = throughput(total_bytes, started.elapsed());
        debug!("Uploaded {total_bytes} bytes at {rate:.0} B/s");
        Ok(rate)
    }

    fn last_ping_ms(&self) -> Option<f64> {
        self.best.as_ref().and_then(|server| server.latency_ms)
    }
}

fn check_status(response: Response) -> Result<Response, MeasurementError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(MeasurementError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}

/// Resolves `file` relative to the directory holding `server_url`
fn sibling_url(server_url: &str, file: &str) -> Result<Url, MeasurementError> {
    Url::parse(server_url)
        .and_then(|base| base.join(file))
        .map_err(|e| MeasurementError::InvalidServerUrl {
            url: server_url.to_string(),
            reason: e.to_string(),
        })
}

fn upload_payload(size: usize) -> Vec<u8> {
    let mut payload = b"content1=".to_vec();
    payload.resize(size.max(payload.len()), b'0');
    payload
}

fn throughput(bytes: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds > 0.0 {
        bytes as f64 / seconds
    } else {
        0.0
    }
}
