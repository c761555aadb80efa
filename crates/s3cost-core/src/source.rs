//! Source trait for storage cost data
//!
//! This module defines the `StorageCostSource` trait that the AWS adapter
//! implements. Commands are written against the trait so they can run
//! against an in-memory source in tests.

use crate::error::Result;
use crate::types::{BucketInfo, CostRecord, TierSample};
use async_trait::async_trait;

/// Trait for anything that can report S3 costs and bucket storage tiers.
#[async_trait]
pub trait StorageCostSource: Send + Sync {
    /// Cost line items for S3 over the last `days` days, grouped by usage type.
    async fn fetch_costs(&self, days: u32) -> Result<Vec<CostRecord>>;

    /// Every bucket in the account.
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>>;

    /// Per-storage-class size samples for one bucket.
    ///
    /// An empty result means no storage data is available for the bucket.
    async fn fetch_tier_samples(&self, bucket: &str) -> Result<Vec<TierSample>>;
}
