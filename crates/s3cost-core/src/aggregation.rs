//! Storage tier aggregation
//!
//! Groups per-storage-class samples into a mapping from storage class to
//! total bytes and objects. The result is a `BTreeMap`, so iteration order
//! follows [`StorageClass`] ordering regardless of sample order.

use crate::types::{BucketTiers, StorageClass, TierSample, TierTotals};
use std::collections::BTreeMap;

/// Sum samples per storage class
///
/// Unknown classes have already been folded into `StorageClass::Other` at
/// parse time, so they are summed there rather than rejected.
///
/// # Examples
/// ```
/// use s3cost_core::aggregation::aggregate;
/// use s3cost_core::types::{StorageClass, TierSample};
///
/// let samples = vec![
///     TierSample::new("logs", StorageClass::Standard, 1024, 1),
///     TierSample::new("logs", StorageClass::Standard, 2048, 2),
///     TierSample::new("logs", StorageClass::Glacier, 4096, 1),
/// ];
/// let tiers = aggregate(&samples);
/// assert_eq!(tiers[&StorageClass::Standard].bytes, 3072);
/// assert_eq!(tiers[&StorageClass::Glacier].objects, 1);
/// assert!(aggregate(&[]).is_empty());
/// ```
pub fn aggregate(samples: &[TierSample]) -> BTreeMap<StorageClass, TierTotals> {
    let mut tiers: BTreeMap<StorageClass, TierTotals> = BTreeMap::new();

    for sample in samples {
        *tiers.entry(sample.storage_class).or_default() +=
            TierTotals::new(sample.size_bytes, sample.object_count);
    }

    tiers
}

impl BucketTiers {
    /// Aggregate the samples for one bucket
    ///
    /// Samples belonging to another bucket are ignored.
    pub fn from_samples(bucket: impl Into<String>, samples: &[TierSample]) -> Self {
        let bucket = bucket.into();
        let tiers = if samples.iter().all(|s| s.bucket == bucket) {
            aggregate(samples)
        } else {
            let own: Vec<TierSample> = samples
                .iter()
                .filter(|s| s.bucket == bucket)
                .cloned()
                .collect();
            aggregate(&own)
        };

        Self { bucket, tiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_groups_by_class() {
        let samples = vec![
            TierSample::new("b", StorageClass::Glacier, 10, 1),
            TierSample::new("b", StorageClass::Standard, 5, 2),
            TierSample::new("b", StorageClass::Glacier, 7, 3),
        ];
        let tiers = aggregate(&samples);

        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[&StorageClass::Glacier], TierTotals::new(17, 4));
        assert_eq!(tiers[&StorageClass::Standard], TierTotals::new(5, 2));
        // BTreeMap iterates in tier order, not insertion order
        assert_eq!(
            tiers.keys().next().copied(),
            Some(StorageClass::Standard)
        );
    }

    #[test]
    fn test_unknown_classes_collect_under_other() {
        let samples = vec![
            TierSample::new(
                "b",
                StorageClass::from_object_storage_class("EXPRESS_ONEZONE"),
                100,
                1,
            ),
            TierSample::new(
                "b",
                StorageClass::from_metric_storage_type("SomeFutureStorage"),
                50,
                0,
            ),
        ];
        let tiers = aggregate(&samples);
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[&StorageClass::Other], TierTotals::new(150, 1));
    }

    #[test]
    fn test_bucket_tiers_from_samples_filters_other_buckets() {
        let samples = vec![
            TierSample::new("a", StorageClass::Standard, 100, 1),
            TierSample::new("b", StorageClass::Standard, 999, 9),
            TierSample::new("a", StorageClass::DeepArchive, 50, 1),
        ];
        let tiers = BucketTiers::from_samples("a", &samples);
        assert_eq!(tiers.bucket, "a");
        assert_eq!(tiers.total_bytes(), 150);
        assert_eq!(tiers.total_objects(), 2);
    }
}
