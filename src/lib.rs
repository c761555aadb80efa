//! s3cost - Report AWS S3 storage costs and storage tiers
//!
//! This library provides functionality to:
//! - Query S3 spend from Cost Explorer, grouped by usage type
//! - Break bucket storage down by storage class from CloudWatch metrics,
//!   falling back to listing objects
//! - Generate reports in table and JSON formats, with CSV export
//!
//! The domain types and the `StorageCostSource` trait live in `s3cost-core`
//! and are re-exported here; the AWS implementation lives in `s3cost-aws`.
//!
//! # Examples
//!
//! ```no_run
//! use s3cost::commands::costs_report;
//! use s3cost_aws::{AwsClient, AwsSettings};
//!
//! #[tokio::main]
//! async fn main() -> s3cost::Result<()> {
//!     let client = AwsClient::new(AwsSettings::new()).await;
//!     let report = costs_report(&client, 30).await?;
//!
//!     for line in &report.lines {
//!         println!("{}: {:.2}", line.usage_type, line.amount);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod csv_export;
pub mod output;

// Re-export core modules so the rest of the crate can use `crate::types` etc.
pub use s3cost_core::{aggregation, error, retry, source, types, units, validation};

// Re-export commonly used types
pub use s3cost_core::{Result, S3CostError, StorageCostSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
