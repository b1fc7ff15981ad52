//! Measurement collection
//!
//! - `client`: the `MeasurementClient` trait the sampler drives
//! - `speedtest_http`: HTTP implementation against speedtest.net style servers
//! - `sampler`: fixed-cadence sampling loop
//! - `errors`: `MeasurementError`
//! - `formatting`: Mbps formatting and rounding helpers

pub mod client;
pub mod errors;
pub mod formatting;
pub mod sampler;
pub mod speedtest_http;

pub use client::MeasurementClient;
pub use errors::MeasurementError;
pub use sampler::{SamplerConfig, SamplerOutput, SpeedSampler, DEFAULT_SAMPLE_INTERVAL};
pub use speedtest_http::HttpSpeedtestClient;
