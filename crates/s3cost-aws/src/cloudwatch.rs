//! CloudWatch storage metrics for S3 buckets
//!
//! The storage types a bucket publishes are discovered with `ListMetrics`,
//! so newer types such as the Intelligent-Tiering access tiers are picked up
//! without a fixed list. S3 publishes `BucketSizeBytes` once a day per
//! storage type, so a two day window with a one day period always covers the
//! most recent datapoint.

use crate::error::{CLOUDWATCH, api_error};
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Datapoint, Dimension, DimensionFilter, Metric, Statistic};
use chrono::{Duration, Utc};
use s3cost_core::error::{ApiErrorKind, Result};
use s3cost_core::retry::RetryStrategy;
use s3cost_core::types::{StorageClass, TierSample};
use std::collections::BTreeSet;
use tracing::{debug, warn};

const S3_NAMESPACE: &str = "AWS/S3";
const BUCKET_SIZE_METRIC: &str = "BucketSizeBytes";
const BUCKET_DIMENSION: &str = "BucketName";
const STORAGE_TYPE_DIMENSION: &str = "StorageType";
const METRIC_WINDOW_DAYS: i64 = 2;
const METRIC_PERIOD_SECS: i32 = 86_400;

/// Storage types with a `BucketSizeBytes` metric for `bucket`
///
/// A failure that is neither an auth, permission, nor throttling error is
/// logged and treated as "no metrics", which sends the caller to the
/// object-listing fallback.
async fn list_storage_types(
    client: &Client,
    retry: &RetryStrategy,
    bucket: &str,
) -> Result<Vec<String>> {
    let mut metrics = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let token = next_token.take();
        let result = retry
            .run("ListMetrics", || {
                let request = client
                    .list_metrics()
                    .namespace(S3_NAMESPACE)
                    .metric_name(BUCKET_SIZE_METRIC)
                    .dimensions(
                        DimensionFilter::builder()
                            .name(BUCKET_DIMENSION)
                            .value(bucket)
                            .build(),
                    )
                    .set_next_token(token.clone())
                    .send();
                async move { request.await.map_err(|e| api_error(CLOUDWATCH, e)) }
            })
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.api_kind() == Some(ApiErrorKind::Other) => {
                warn!("Cannot list storage metrics for {}: {}", bucket, e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        metrics.extend_from_slice(output.metrics());

        match output.next_token() {
            Some(next) => next_token = Some(next.to_string()),
            None => break,
        }
    }

    Ok(storage_types(&metrics))
}

/// Distinct `StorageType` dimension values, sorted
pub fn storage_types(metrics: &[Metric]) -> Vec<String> {
    metrics
        .iter()
        .flat_map(|metric| metric.dimensions())
        .filter(|dimension| dimension.name() == Some(STORAGE_TYPE_DIMENSION))
        .filter_map(|dimension| dimension.value())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Query `BucketSizeBytes` for every storage type a bucket publishes
///
/// Storage types without datapoints, or with a zero size, produce no sample.
/// Authentication, permission, and throttling failures abort the lookup;
/// any other failure only skips the affected storage type.
pub(crate) async fn fetch_bucket_size_samples(
    client: &Client,
    retry: &RetryStrategy,
    bucket: &str,
) -> Result<Vec<TierSample>> {
    let storage_types = list_storage_types(client, retry, bucket).await?;
    debug!("{}: storage types {:?}", bucket, storage_types);

    let end = Utc::now();
    let start = end - Duration::days(METRIC_WINDOW_DAYS);
    let start_time = DateTime::from_secs(start.timestamp());
    let end_time = DateTime::from_secs(end.timestamp());

    let mut samples = Vec::new();

    for storage_type in &storage_types {
        let result = retry
            .run("GetMetricStatistics", || {
                let request = client
                    .get_metric_statistics()
                    .namespace(S3_NAMESPACE)
                    .metric_name(BUCKET_SIZE_METRIC)
                    .dimensions(
                        Dimension::builder()
                            .name(BUCKET_DIMENSION)
                            .value(bucket)
                            .build(),
                    )
                    .dimensions(
                        Dimension::builder()
                            .name(STORAGE_TYPE_DIMENSION)
                            .value(storage_type.as_str())
                            .build(),
                    )
                    .start_time(start_time)
                    .end_time(end_time)
                    .period(METRIC_PERIOD_SECS)
                    .statistics(Statistic::Average)
                    .send();
                async move { request.await.map_err(|e| api_error(CLOUDWATCH, e)) }
            })
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.api_kind() == Some(ApiErrorKind::Other) => {
                warn!("Skipping {} metrics for {}: {}", storage_type, bucket, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        match latest_average(output.datapoints()) {
            Some(size) if size > 0.0 => {
                debug!("{}: {} = {} bytes", bucket, storage_type, size);
                let class = StorageClass::from_metric_storage_type(storage_type);
                samples.push(TierSample::new(bucket, class, size.round() as u64, 0));
            }
            _ => debug!("{}: no {} datapoints", bucket, storage_type),
        }
    }

    Ok(samples)
}

/// Average of the most recent datapoint
///
/// CloudWatch does not guarantee datapoint order, so the latest timestamp is
/// selected explicitly. Datapoints without a timestamp are ignored.
pub fn latest_average(datapoints: &[Datapoint]) -> Option<f64> {
    datapoints
        .iter()
        .filter_map(|dp| Some((dp.timestamp()?.secs(), dp.average()?)))
        .max_by_key(|(secs, _)| *secs)
        .map(|(_, average)| average)
}
