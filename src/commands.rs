//! Command dispatch
//!
//! Every command follows the same straight line: validate arguments, build
//! the report from a [`StorageCostSource`], then emit it as a table, JSON,
//! or a CSV file. Arguments are validated before the source is connected,
//! and a report is fully built before anything is written.

use crate::cli::{Cli, Command};
use crate::csv_export::write_csv;
use crate::error::{Result, S3CostError};
use crate::output::{ReportTable, get_formatter};
use crate::source::StorageCostSource;
use crate::types::{BucketTiers, CostReport};
use crate::units::format_currency;
use crate::validation::{validate_bucket_name, validate_concurrency, validate_days};
use chrono::Utc;
use futures::{StreamExt, TryStreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use s3cost_aws::cost_explorer::cost_period;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A validated command, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Costs {
        days: u32,
        csv: Option<PathBuf>,
    },
    Buckets {
        detailed: bool,
        concurrency: usize,
        csv: Option<PathBuf>,
    },
    BucketDetails {
        bucket: String,
        csv: Option<PathBuf>,
    },
}

impl Action {
    /// Validate parsed arguments
    pub fn from_command(command: &Command) -> Result<Self> {
        match command {
            Command::Costs { days, csv } => Ok(Action::Costs {
                days: validate_days(*days)?,
                csv: csv.clone(),
            }),
            Command::Buckets {
                detailed,
                concurrency,
                csv,
            } => Ok(Action::Buckets {
                detailed: *detailed,
                concurrency: validate_concurrency(*concurrency)?,
                csv: csv.clone(),
            }),
            Command::BucketDetails { bucket_name, csv } => {
                validate_bucket_name(bucket_name)?;
                Ok(Action::BucketDetails {
                    bucket: bucket_name.clone(),
                    csv: csv.clone(),
                })
            }
        }
    }
}

/// How reports are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub json: bool,
    pub show_progress: bool,
}

impl OutputOptions {
    /// Progress is only drawn for table output on a terminal
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json: cli.json,
            show_progress: !cli.json && is_terminal::is_terminal(std::io::stdout()),
        }
    }
}

/// Build the cost report for the last `days` days
pub async fn costs_report<S>(source: &S, days: u32) -> Result<CostReport>
where
    S: StorageCostSource + ?Sized,
{
    let (start, end) = cost_period(days, Utc::now().date_naive())?;
    let records = source.fetch_costs(days).await?;
    debug!("Received {} cost records", records.len());
    CostReport::from_records(days, start, end, &records)
}

/// Collect storage tiers for every bucket, at most `concurrency` at a time
///
/// Results keep the order of the bucket listing. The first failing bucket
/// aborts the whole collection.
pub async fn collect_bucket_tiers<S>(
    source: &S,
    concurrency: usize,
    show_progress: bool,
) -> Result<Vec<BucketTiers>>
where
    S: StorageCostSource + ?Sized,
{
    let buckets = source.list_buckets().await?;
    info!("Analyzing {} buckets", buckets.len());

    let progress = if show_progress && !buckets.is_empty() {
        let pb = ProgressBar::new(buckets.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} buckets")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Analyzing buckets");
        Some(pb)
    } else {
        None
    };

    let result = stream::iter(buckets.iter())
        .map(|bucket| {
            let progress = progress.as_ref();
            async move {
                let samples = source.fetch_tier_samples(&bucket.name).await?;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                Ok::<_, S3CostError>(BucketTiers::from_samples(bucket.name.clone(), &samples))
            }
        })
        .buffered(concurrency.max(1))
        .try_collect::<Vec<_>>()
        .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    result
}

/// Collect the storage tiers of a single bucket
pub async fn bucket_details<S>(source: &S, bucket: &str) -> Result<BucketTiers>
where
    S: StorageCostSource + ?Sized,
{
    let samples = source.fetch_tier_samples(bucket).await?;
    Ok(BucketTiers::from_samples(bucket, &samples))
}

fn exported(path: &Path, kind: &str, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{kind} exported to {}", path.display())?;
    Ok(())
}

/// Run a validated action against `source`, writing to `out`
pub async fn execute<S, W>(
    action: &Action,
    source: &S,
    options: &OutputOptions,
    out: &mut W,
) -> Result<()>
where
    S: StorageCostSource + ?Sized,
    W: Write,
{
    let formatter = get_formatter(options.json);

    match action {
        Action::Costs { days, csv } => {
            info!("Running S3 cost report for the last {} days", days);
            let report = costs_report(source, *days).await?;

            if let Some(path) = csv {
                write_csv(&ReportTable::costs(&report), path)?;
                if !options.json {
                    writeln!(
                        out,
                        "Total S3 Cost (last {} days): {}",
                        report.days,
                        format_currency(report.total, &report.currency)
                    )?;
                    return exported(path, "Cost data", out);
                }
            }
            writeln!(out, "{}", formatter.format_costs(&report)?)?;
        }

        Action::Buckets {
            detailed,
            concurrency,
            csv,
        } => {
            info!("Running bucket storage report");
            let buckets = collect_bucket_tiers(source, *concurrency, options.show_progress).await?;

            if buckets.is_empty() && !options.json {
                writeln!(out, "No S3 buckets found in the account.")?;
                return Ok(());
            }

            if let Some(path) = csv {
                let table = if *detailed {
                    ReportTable::bucket_tiers(&buckets)
                } else {
                    ReportTable::bucket_summary(&buckets)
                };
                write_csv(&table, path)?;
                if !options.json {
                    return exported(path, "Bucket data", out);
                }
            }
            writeln!(out, "{}", formatter.format_buckets(&buckets, *detailed)?)?;
        }

        Action::BucketDetails { bucket, csv } => {
            info!("Running storage tier report for {}", bucket);
            let details = bucket_details(source, bucket).await?;

            if details.is_empty() && !options.json {
                writeln!(out, "No storage tier data found for bucket: {bucket}")?;
                return Ok(());
            }

            if let Some(path) = csv {
                write_csv(&ReportTable::bucket_details(&details), path)?;
                if !options.json {
                    return exported(path, "Bucket details", out);
                }
            }
            writeln!(out, "{}", formatter.format_bucket_details(&details)?)?;
        }
    }

    Ok(())
}

/// Validate the command line, connect a source, and run the command
///
/// `connect` is only awaited once the arguments are known to be valid.
pub async fn dispatch<S, F, Fut, W>(
    cli: &Cli,
    options: &OutputOptions,
    connect: F,
    out: &mut W,
) -> Result<()>
where
    S: StorageCostSource,
    F: FnOnce() -> Fut,
    Fut: Future<Output = S>,
    W: Write,
{
    let action = Action::from_command(&cli.command)?;
    let source = connect().await;
    execute(&action, &source, options, out).await
}
