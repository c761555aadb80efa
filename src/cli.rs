//! CLI interface for s3cost
//!
//! This module defines the command-line interface using clap. Global flags
//! control AWS connection settings and output; each subcommand maps to one
//! report.
//!
//! # Example
//!
//! ```bash
//! # S3 spend over the last 90 days
//! s3cost costs --days 90
//!
//! # Per-tier breakdown of every bucket, exported to CSV
//! s3cost buckets --detailed --csv tiers.csv
//!
//! # One bucket, using a named profile
//! s3cost --profile billing bucket-details my-logs
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Report S3 storage costs and storage tiers
#[derive(Parser, Debug, Clone)]
#[command(name = "s3cost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// AWS profile from the shared config files
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Default AWS region for S3 and CloudWatch
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Retries for throttled AWS requests
    #[arg(long, default_value = "3", global = true)]
    pub max_retries: u32,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Get S3 storage costs for the specified period
    Costs {
        /// Number of days to analyze
        #[arg(long, default_value = "30", allow_negative_numbers = true)]
        days: i64,

        /// Export to CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// List all S3 buckets with storage information
    Buckets {
        /// Show detailed storage tier breakdown
        #[arg(long)]
        detailed: bool,

        /// Number of buckets analyzed concurrently
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Export to CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Get detailed storage tier information for a specific bucket
    BucketDetails {
        /// Bucket to inspect
        bucket_name: String,

        /// Export to CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_costs_defaults() {
        let cli = Cli::parse_from(["s3cost", "costs"]);
        assert_eq!(
            cli.command,
            Command::Costs {
                days: 30,
                csv: None
            }
        );
        assert!(!cli.json);
        assert_eq!(cli.max_retries, 3);
    }

    #[test]
    fn test_costs_accepts_negative_days_for_validation() {
        let cli = Cli::parse_from(["s3cost", "costs", "--days", "-5"]);
        assert!(matches!(cli.command, Command::Costs { days: -5, .. }));
    }

    #[test]
    fn test_buckets_flags() {
        let cli = Cli::parse_from([
            "s3cost",
            "buckets",
            "--detailed",
            "--concurrency",
            "8",
            "--csv",
            "out.csv",
        ]);
        assert_eq!(
            cli.command,
            Command::Buckets {
                detailed: true,
                concurrency: 8,
                csv: Some(PathBuf::from("out.csv"))
            }
        );
    }

    #[test]
    fn test_bucket_details_positional() {
        let cli = Cli::parse_from(["s3cost", "bucket-details", "my-logs", "--json"]);
        assert!(cli.json);
        match cli.command {
            Command::BucketDetails { bucket_name, csv } => {
                assert_eq!(bucket_name, "my-logs");
                assert!(csv.is_none());
            }
            _ => panic!("Expected BucketDetails command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "s3cost",
            "buckets",
            "--profile",
            "billing",
            "--region",
            "eu-west-1",
            "--max-retries",
            "0",
            "-v",
        ]);
        assert_eq!(cli.profile.as_deref(), Some("billing"));
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.max_retries, 0);
        assert!(cli.verbose);
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["s3cost"]).is_err());
        assert!(Cli::try_parse_from(["s3cost", "bucket-details"]).is_err());
    }
}
