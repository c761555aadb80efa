//! Core domain types for s3cost
//!
//! This module contains the records produced at the AWS boundary and the
//! aggregated shapes consumed by the formatters. Raw API responses are mapped
//! into these types by the client adapter so that nothing downstream deals
//! with loosely-typed key/value payloads.

use crate::error::{Result, S3CostError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// A single Cost Explorer line item
///
/// One record is produced per usage type per result period.
///
/// # Examples
/// ```
/// use s3cost_core::types::CostRecord;
/// use chrono::NaiveDate;
///
/// let record = CostRecord {
///     usage_type: "TimedStorage-ByteHrs".to_string(),
///     amount: 12.5,
///     currency: "USD".to_string(),
///     period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     period_end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
/// };
/// assert_eq!(record.amount, 12.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Cost Explorer usage type (e.g. `TimedStorage-ByteHrs`)
    pub usage_type: String,
    /// Blended cost amount
    pub amount: f64,
    /// Currency unit reported by Cost Explorer
    pub currency: String,
    /// Inclusive start of the result period
    pub period_start: NaiveDate,
    /// Exclusive end of the result period
    pub period_end: NaiveDate,
}

/// Cost summed per usage type across all result periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub usage_type: String,
    pub amount: f64,
    pub currency: String,
}

/// Cost report for the `costs` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    /// Number of days covered by the query
    pub days: u32,
    /// Inclusive start of the queried window
    pub period_start: NaiveDate,
    /// Exclusive end of the queried window
    pub period_end: NaiveDate,
    /// Sum of every record amount
    pub total: f64,
    /// Currency of the total
    pub currency: String,
    /// Positive cost lines, most expensive first
    pub lines: Vec<CostLine>,
}

impl CostReport {
    /// Build a report from raw cost records
    ///
    /// Records are summed per usage type, lines with a non-positive amount are
    /// dropped, and the remaining lines are sorted by amount descending (ties
    /// broken by usage type). Records in more than one currency cannot be
    /// totalled and are an invalid response.
    pub fn from_records(
        days: u32,
        period_start: NaiveDate,
        period_end: NaiveDate,
        records: &[CostRecord],
    ) -> Result<Self> {
        let currency = records
            .first()
            .map(|r| r.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if let Some(other) = records.iter().find(|r| r.currency != currency) {
            return Err(S3CostError::InvalidResponse(format!(
                "cost records mix currencies {} and {}",
                currency, other.currency
            )));
        }

        let mut by_type: BTreeMap<&str, (f64, &str)> = BTreeMap::new();
        let mut total = 0.0;

        for record in records {
            total += record.amount;
            let entry = by_type
                .entry(record.usage_type.as_str())
                .or_insert((0.0, record.currency.as_str()));
            entry.0 += record.amount;
        }

        let mut lines: Vec<CostLine> = by_type
            .into_iter()
            .filter(|(_, (amount, _))| *amount > 0.0)
            .map(|(usage_type, (amount, currency))| CostLine {
                usage_type: usage_type.to_string(),
                amount,
                currency: currency.to_string(),
            })
            .collect();

        lines.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.usage_type.cmp(&b.usage_type))
        });

        Ok(Self {
            days,
            period_start,
            period_end,
            total,
            currency,
            lines,
        })
    }
}

/// Currency assumed when Cost Explorer returns no records
pub const DEFAULT_CURRENCY: &str = "USD";

/// An S3 bucket as returned by `ListBuckets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

impl BucketInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creation_date: None,
        }
    }
}

/// S3 storage class
///
/// Variants are declared from hottest to coldest so that the derived ordering
/// gives a natural row order in reports. Anything that is not recognised is
/// collected under [`StorageClass::Other`].
///
/// # Examples
/// ```
/// use s3cost_core::types::StorageClass;
///
/// assert_eq!(StorageClass::from_metric_storage_type("StandardIAStorage"), StorageClass::StandardIA);
/// assert_eq!(StorageClass::from_object_storage_class("DEEP_ARCHIVE"), StorageClass::DeepArchive);
/// assert_eq!("SOMETHING_NEW".parse::<StorageClass>().unwrap(), StorageClass::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StorageClass {
    Standard,
    IntelligentTiering,
    StandardIA,
    OneZoneIA,
    ReducedRedundancy,
    GlacierInstantRetrieval,
    Glacier,
    DeepArchive,
    Other,
}

impl StorageClass {
    /// Every recognised class, in report order
    pub const KNOWN: [StorageClass; 8] = [
        StorageClass::Standard,
        StorageClass::IntelligentTiering,
        StorageClass::StandardIA,
        StorageClass::OneZoneIA,
        StorageClass::ReducedRedundancy,
        StorageClass::GlacierInstantRetrieval,
        StorageClass::Glacier,
        StorageClass::DeepArchive,
    ];

    /// Parse a CloudWatch `StorageType` dimension value
    ///
    /// S3 publishes several storage types per class: one per Intelligent-Tiering
    /// access tier, plus overhead and staging types. Each is counted with the
    /// class it belongs to.
    pub fn from_metric_storage_type(value: &str) -> Self {
        const PREFIXES: [(&str, StorageClass); 9] = [
            ("StandardStorage", StorageClass::Standard),
            ("IntelligentTiering", StorageClass::IntelligentTiering),
            ("StandardIA", StorageClass::StandardIA),
            ("OneZoneIA", StorageClass::OneZoneIA),
            ("ReducedRedundancy", StorageClass::ReducedRedundancy),
            ("GlacierInstantRetrieval", StorageClass::GlacierInstantRetrieval),
            ("GlacierIR", StorageClass::GlacierInstantRetrieval),
            ("Glacier", StorageClass::Glacier),
            ("DeepArchive", StorageClass::DeepArchive),
        ];

        PREFIXES
            .into_iter()
            .find(|(prefix, _)| value.starts_with(prefix))
            .map(|(_, class)| class)
            .unwrap_or(StorageClass::Other)
    }

    /// Parse an S3 object storage class (`STANDARD`, `STANDARD_IA`, ...)
    pub fn from_object_storage_class(value: &str) -> Self {
        match value {
            "STANDARD" => StorageClass::Standard,
            "INTELLIGENT_TIERING" => StorageClass::IntelligentTiering,
            "STANDARD_IA" => StorageClass::StandardIA,
            "ONEZONE_IA" => StorageClass::OneZoneIA,
            "REDUCED_REDUNDANCY" => StorageClass::ReducedRedundancy,
            "GLACIER_IR" => StorageClass::GlacierInstantRetrieval,
            "GLACIER" => StorageClass::Glacier,
            "DEEP_ARCHIVE" => StorageClass::DeepArchive,
            _ => StorageClass::Other,
        }
    }

    /// Human-readable tier name used in reports
    pub fn label(&self) -> &'static str {
        match self {
            StorageClass::Standard => "Standard",
            StorageClass::IntelligentTiering => "Intelligent-Tiering",
            StorageClass::StandardIA => "Standard-IA",
            StorageClass::OneZoneIA => "One Zone-IA",
            StorageClass::ReducedRedundancy => "Reduced Redundancy",
            StorageClass::GlacierInstantRetrieval => "Glacier Instant Retrieval",
            StorageClass::Glacier => "Glacier",
            StorageClass::DeepArchive => "Glacier Deep Archive",
            StorageClass::Other => "Other",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StorageClass {
    type Err = std::convert::Infallible;

    /// Accepts CloudWatch storage types, object storage classes, or labels.
    /// Never fails: unknown values map to `Other`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let from_metric = Self::from_metric_storage_type(s);
        if from_metric != StorageClass::Other {
            return Ok(from_metric);
        }
        let from_object = Self::from_object_storage_class(s);
        if from_object != StorageClass::Other {
            return Ok(from_object);
        }
        Ok(Self::KNOWN
            .into_iter()
            .find(|class| class.label() == s)
            .unwrap_or(StorageClass::Other))
    }
}

/// One storage class measurement for a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSample {
    pub bucket: String,
    pub storage_class: StorageClass,
    pub size_bytes: u64,
    /// Zero when the source does not report per-class object counts
    pub object_count: u64,
}

impl TierSample {
    pub fn new(
        bucket: impl Into<String>,
        storage_class: StorageClass,
        size_bytes: u64,
        object_count: u64,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            storage_class,
            size_bytes,
            object_count,
        }
    }
}

/// Aggregated bytes and objects for a single storage class
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTotals {
    pub bytes: u64,
    pub objects: u64,
}

impl TierTotals {
    pub fn new(bytes: u64, objects: u64) -> Self {
        Self { bytes, objects }
    }
}

impl Add for TierTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            bytes: self.bytes.saturating_add(other.bytes),
            objects: self.objects.saturating_add(other.objects),
        }
    }
}

impl AddAssign for TierTotals {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Per-bucket storage tier breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTiers {
    pub bucket: String,
    pub tiers: BTreeMap<StorageClass, TierTotals>,
}

impl BucketTiers {
    /// A bucket for which no tier data could be obtained
    pub fn empty(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            tiers: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Total bytes across every tier
    pub fn total_bytes(&self) -> u64 {
        self.totals().bytes
    }

    /// Total objects across every tier
    pub fn total_objects(&self) -> u64 {
        self.totals().objects
    }

    /// Sum of every tier
    pub fn totals(&self) -> TierTotals {
        self.tiers
            .values()
            .fold(TierTotals::default(), |acc, t| acc + *t)
    }

    /// Storage classes present in the bucket, in tier order
    pub fn storage_classes(&self) -> impl Iterator<Item = StorageClass> + '_ {
        self.tiers.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(usage_type: &str, amount: f64) -> CostRecord {
        CostRecord {
            usage_type: usage_type.to_string(),
            amount,
            currency: "USD".to_string(),
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        }
    }

    #[test]
    fn test_storage_class_parsing() {
        for (metric, class) in [
            ("StandardStorage", StorageClass::Standard),
            ("StandardIAStorage", StorageClass::StandardIA),
            ("StandardIASizeOverhead", StorageClass::StandardIA),
            ("OneZoneIAStorage", StorageClass::OneZoneIA),
            ("ReducedRedundancyStorage", StorageClass::ReducedRedundancy),
            ("GlacierInstantRetrievalStorage", StorageClass::GlacierInstantRetrieval),
            ("GlacierIRSizeOverhead", StorageClass::GlacierInstantRetrieval),
            ("GlacierStorage", StorageClass::Glacier),
            ("GlacierObjectOverhead", StorageClass::Glacier),
            ("DeepArchiveStorage", StorageClass::DeepArchive),
            ("DeepArchiveS3ObjectOverhead", StorageClass::DeepArchive),
        ] {
            assert_eq!(StorageClass::from_metric_storage_type(metric), class, "{metric}");
        }
        assert_eq!(
            StorageClass::from_metric_storage_type("AllStorageTypes"),
            StorageClass::Other
        );
        assert_eq!(
            StorageClass::from_object_storage_class("GLACIER_IR"),
            StorageClass::GlacierInstantRetrieval
        );
        assert_eq!(
            StorageClass::from_object_storage_class("EXPRESS_ONEZONE"),
            StorageClass::Other
        );
        assert_eq!(
            "Standard-IA".parse::<StorageClass>().unwrap(),
            StorageClass::StandardIA
        );
    }

    #[test]
    fn test_storage_class_ordering() {
        assert!(StorageClass::Standard < StorageClass::Glacier);
        assert!(StorageClass::DeepArchive < StorageClass::Other);
    }

    #[test]
    fn test_intelligent_tiering_storage_types() {
        for metric in [
            "IntelligentTieringFAStorage",
            "IntelligentTieringIAStorage",
            "IntelligentTieringAAStorage",
            "IntelligentTieringAIAStorage",
            "IntelligentTieringDAAStorage",
        ] {
            assert_eq!(
                StorageClass::from_metric_storage_type(metric),
                StorageClass::IntelligentTiering,
                "{metric}"
            );
        }
    }

    #[test]
    fn test_unknown_storage_types_are_other() {
        for metric in ["ExpressOneZone", "SomeFutureStorage", ""] {
            assert_eq!(
                StorageClass::from_metric_storage_type(metric),
                StorageClass::Other
            );
        }
    }

    #[test]
    fn test_tier_totals_arithmetic() {
        let mut total = TierTotals::new(100, 2);
        total += TierTotals::new(50, 1);
        assert_eq!(total, TierTotals::new(150, 3));

        let saturated = TierTotals::new(u64::MAX, 0) + TierTotals::new(1, 0);
        assert_eq!(saturated.bytes, u64::MAX);
    }

    #[test]
    fn test_bucket_tiers_totals() {
        let mut tiers = BucketTiers::empty("logs");
        assert!(tiers.is_empty());
        assert_eq!(tiers.total_bytes(), 0);

        tiers
            .tiers
            .insert(StorageClass::Standard, TierTotals::new(1024, 3));
        tiers
            .tiers
            .insert(StorageClass::Glacier, TierTotals::new(2048, 1));
        assert_eq!(tiers.total_bytes(), 3072);
        assert_eq!(tiers.total_objects(), 4);
        assert_eq!(
            tiers.storage_classes().collect::<Vec<_>>(),
            vec![StorageClass::Standard, StorageClass::Glacier]
        );
    }

    #[test]
    fn test_cost_report_sums_and_sorts() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let records = vec![
            record("Requests-Tier1", 1.0),
            record("TimedStorage-ByteHrs", 10.0),
            record("Requests-Tier1", 2.5),
            record("DataTransfer-Out-Bytes", 0.0),
            record("Requests-Tier2", 3.5),
        ];

        let report = CostReport::from_records(30, start, end, &records).unwrap();
        assert_eq!(report.total, 17.0);
        assert_eq!(report.currency, "USD");

        let types: Vec<_> = report.lines.iter().map(|l| l.usage_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["TimedStorage-ByteHrs", "Requests-Tier1", "Requests-Tier2"]
        );
        assert_eq!(report.lines[1].amount, 3.5);
    }

    #[test]
    fn test_cost_report_empty() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let report = CostReport::from_records(7, start, start, &[]).unwrap();
        assert_eq!(report.total, 0.0);
        assert_eq!(report.currency, DEFAULT_CURRENCY);
        assert!(report.lines.is_empty());
    }

    #[test]
    fn test_cost_report_rejects_mixed_currencies() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut euro = record("Requests-Tier1", 2.0);
        euro.currency = "EUR".to_string();
        let records = vec![record("TimedStorage-ByteHrs", 1.0), euro];

        let err = CostReport::from_records(30, start, start, &records).unwrap_err();
        assert!(matches!(err, S3CostError::InvalidResponse(_)));
        assert!(err.to_string().contains("EUR"));
    }
}
