//! Core types, traits, and utilities for s3cost
//!
//! This crate provides the domain records, error handling, storage tier
//! aggregation, byte formatting, argument validation, and retry strategy
//! used by the other s3cost crates.

pub mod aggregation;
pub mod error;
pub mod retry;
pub mod source;
pub mod types;
pub mod units;
pub mod validation;

// Re-export commonly used types
pub use error::{ApiErrorKind, Result, S3CostError};
pub use source::StorageCostSource;
pub use types::{
    BucketInfo, BucketTiers, CostLine, CostRecord, CostReport, StorageClass, TierSample,
    TierTotals,
};
