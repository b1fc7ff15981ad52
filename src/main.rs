use anyhow::{Context, Result};
use clap::Parser;
use speedtest_reporter::cli::{Cli, Commands, JobCommandHandler};
use speedtest_reporter::config::JobConfig;
use speedtest_reporter::job::{JobError, JobSummary};
use speedtest_reporter::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();

    match cli.command() {
        Commands::Run => match run_job(&cli).await {
            Ok(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
            Err(e) => {
                e.log();
                std::process::exit(e.exit_code());
            }
        },
        Commands::Servers => {
            let handler = JobCommandHandler::new(load_config(&cli).context("invalid job configuration")?);
            handler.list_servers().await?;
        }
        Commands::Render { results } => {
            let handler = JobCommandHandler::new(load_config(&cli).context("invalid job configuration")?);
            let artifacts = handler.render_from_results(&results)?;
            println!("Generated results document: {}", artifacts.results.display());
            println!("Generated speed chart: {}", artifacts.speed_plot.display());
            println!("Generated ping chart: {}", artifacts.ping_plot.display());
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<JobConfig, config::ConfigError> {
    Ok(JobConfig::load()?.with_overrides(cli.duration, cli.region.clone(), cli.output_dir.clone()))
}

/// Every failure on this path is reported under its stage tag
async fn run_job(cli: &Cli) -> Result<JobSummary, JobError> {
    let handler = JobCommandHandler::new(load_config(cli)?);
    let mut job = handler.build_job()?;
    job.run().await
}
