//! Speed test reporter
//!
//! Samples network throughput and latency against a speed test server for a
//! fixed window, renders the samples as time-series charts plus a JSON results
//! document, and publishes all three artifacts to S3-compatible object storage.
//!
//! ## Module Organization
//!
//! - `collectors`: measurement client abstraction, the HTTP speed test client and the sampler loop
//! - `graphs`: chart rendering and the results document
//! - `storage`: publisher abstraction and the S3 publisher
//! - `job`: orchestration of one job invocation
//! - `config`: environment-driven job configuration
//! - `cli`: command line interface used by the `speedtest-job` binary

pub mod cli;
pub mod collectors;
pub mod config;
pub mod graphs;
pub mod job;
pub mod logging;
pub mod models;
pub mod storage;
