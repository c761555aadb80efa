//! AWS adapter for s3cost
//!
//! This crate implements `StorageCostSource` on top of the AWS SDK,
//! mapping Cost Explorer, CloudWatch, and S3 responses into the typed
//! records from `s3cost-core`.

pub mod client;
pub mod cloudwatch;
pub mod cost_explorer;
mod error;
mod s3;
pub mod settings;

pub use client::AwsClient;
pub use settings::AwsSettings;
