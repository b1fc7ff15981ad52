use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for the speed test job
/// Environment variables provide the defaults; flags given here win
#[derive(Parser, Debug)]
#[command(author = "Dominic Powers")]
#[command(version)]
#[command(about = "Measure network throughput and latency, plot the results and publish them to object storage")]
#[command(long_about = "Runs a fixed-duration speed test against the closest speed test server, \
renders download/upload and ping charts plus a JSON results document, and uploads all three \
to the `Speedtest` bucket. Configuration is read from DURATION, REGION, OUTPUT_DIR and the \
BUCKET_* variables.\n\n\
Examples:\n  \
speedtest-job                              # Run the job with environment configuration\n  \
speedtest-job --duration 1 --region us-east run\n  \
speedtest-job servers                      # Show candidate servers and the selected one\n  \
speedtest-job render results.json          # Re-render charts from a results document")]
pub struct Cli {
    /// Sampling window in minutes (overrides DURATION)
    #[arg(short, long, global = true)]
    pub duration: Option<u64>,

    /// Region label used in file names and chart titles (overrides REGION)
    #[arg(short, long, global = true)]
    pub region: Option<String>,

    /// Directory artifacts are written to before upload (overrides OUTPUT_DIR)
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sample, render and publish; prints the job summary as JSON
    #[command(about = "Run the full speed test job (default)")]
    Run,

    /// List candidate servers and pick the best one without measuring
    #[command(about = "List candidate speed test servers")]
    Servers,

    /// Render charts from an existing results document without measuring or uploading
    #[command(about = "Render charts from a results document")]
    Render {
        /// Path to a `*_speed_test_results_*.json` document
        results: PathBuf,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}
