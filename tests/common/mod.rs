//! Common test utilities and helpers for s3cost tests
//!
//! This module provides an in-memory `StorageCostSource` with call counters,
//! so command tests can assert both on output and on which upstream calls
//! were made.

use async_trait::async_trait;
use chrono::NaiveDate;
use s3cost::{
    S3CostError,
    error::{ApiErrorKind, Result},
    source::StorageCostSource,
    types::{BucketInfo, CostRecord, StorageClass, TierSample},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory source of costs, buckets, and tier samples
#[derive(Default)]
pub struct MockSource {
    pub costs: Vec<CostRecord>,
    pub buckets: Vec<BucketInfo>,
    pub samples: HashMap<String, Vec<TierSample>>,
    /// Buckets whose tier lookup fails with a permission error
    pub failing: Vec<String>,
    pub cost_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub tier_calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_cost(mut self, usage_type: &str, amount: f64) -> Self {
        self.costs.push(CostRecord {
            usage_type: usage_type.to_string(),
            amount,
            currency: "USD".to_string(),
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        });
        self
    }

    pub fn with_bucket(mut self, name: &str, tiers: &[(StorageClass, u64)]) -> Self {
        self.buckets.push(BucketInfo::new(name));
        self.samples.insert(
            name.to_string(),
            tiers
                .iter()
                .map(|(class, bytes)| TierSample::new(name, *class, *bytes, 0))
                .collect(),
        );
        self
    }

    #[allow(dead_code)]
    pub fn with_failing_bucket(mut self, name: &str) -> Self {
        self.buckets.push(BucketInfo::new(name));
        self.failing.push(name.to_string());
        self
    }

    /// Total number of upstream calls made so far
    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.cost_calls.load(Ordering::SeqCst)
            + self.list_calls.load(Ordering::SeqCst)
            + self.tier_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageCostSource for MockSource {
    async fn fetch_costs(&self, _days: u32) -> Result<Vec<CostRecord>> {
        self.cost_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.costs.clone())
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.buckets.clone())
    }

    async fn fetch_tier_samples(&self, bucket: &str) -> Result<Vec<TierSample>> {
        self.tier_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|b| b == bucket) {
            return Err(S3CostError::external(
                "cloudwatch",
                ApiErrorKind::Permission,
                "AccessDenied",
            ));
        }
        Ok(self.samples.get(bucket).cloned().unwrap_or_default())
    }
}

/// Borrowed view of a mock, so counters can be read after the source is consumed
#[allow(dead_code)]
pub struct MockRef<'a>(pub &'a MockSource);

#[async_trait]
impl<'a> StorageCostSource for MockRef<'a> {
    async fn fetch_costs(&self, days: u32) -> Result<Vec<CostRecord>> {
        self.0.fetch_costs(days).await
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        self.0.list_buckets().await
    }

    async fn fetch_tier_samples(&self, bucket: &str) -> Result<Vec<TierSample>> {
        self.0.fetch_tier_samples(bucket).await
    }
}

/// Run a command line against `source`, returning what was written to stdout
#[allow(dead_code)]
pub async fn run_cli(args: &[&str], source: &MockSource) -> (Result<()>, String) {
    use clap::Parser;
    use s3cost::{
        cli::Cli,
        commands::{OutputOptions, dispatch},
    };

    let cli = Cli::parse_from(args);
    let options = OutputOptions {
        json: cli.json,
        show_progress: false,
    };
    let mut out = Vec::new();
    let result = dispatch(&cli, &options, || async { MockRef(source) }, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}
