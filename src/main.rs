//! s3cost - Report AWS S3 storage costs and storage tiers

use clap::Parser;
use s3cost::{
    cli::Cli,
    commands::{OutputOptions, dispatch},
    retry::RetryStrategy,
};
use s3cost_aws::{AwsClient, AwsSettings};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging. RUST_LOG wins over --verbose; logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            tracing_subscriber::EnvFilter::new("s3cost=info")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = AwsSettings::new()
        .with_profile(cli.profile.clone())
        .with_region(cli.region.clone())
        .with_retry(RetryStrategy::new(cli.max_retries.saturating_add(1)));
    let options = OutputOptions::from_cli(&cli);

    let mut stdout = std::io::stdout().lock();
    match dispatch(&cli, &options, || AwsClient::new(settings), &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
