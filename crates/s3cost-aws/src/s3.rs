//! S3 bucket listing, location lookup, and object-listing fallback

use crate::error::{S3, api_error};
use crate::settings::bucket_region;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::Object;
use chrono::DateTime;
use s3cost_core::error::{ApiErrorKind, Result};
use s3cost_core::retry::RetryStrategy;
use s3cost_core::types::{BucketInfo, StorageClass, TierSample, TierTotals};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// List every bucket visible to the caller
pub(crate) async fn list_buckets(client: &Client, retry: &RetryStrategy) -> Result<Vec<BucketInfo>> {
    let output = retry
        .run("ListBuckets", || {
            let request = client.list_buckets().send();
            async move { request.await.map_err(|e| api_error(S3, e)) }
        })
        .await?;

    let buckets = output
        .buckets()
        .iter()
        .filter_map(|bucket| {
            let name = bucket.name()?;
            let creation_date = bucket
                .creation_date()
                .and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos()));
            Some(BucketInfo {
                name: name.to_string(),
                creation_date,
            })
        })
        .collect::<Vec<_>>();

    debug!("Found {} buckets", buckets.len());
    Ok(buckets)
}

/// Region a bucket lives in, or `None` if the lookup failed
pub(crate) async fn locate_bucket(
    client: &Client,
    retry: &RetryStrategy,
    bucket: &str,
) -> Option<String> {
    let result = retry
        .run("GetBucketLocation", || {
            let request = client.get_bucket_location().bucket(bucket).send();
            async move { request.await.map_err(|e| api_error(S3, e)) }
        })
        .await;

    match result {
        Ok(output) => Some(bucket_region(
            output.location_constraint().map(|c| c.as_str()),
        )),
        Err(e) => {
            warn!("Could not determine region of {}: {}", bucket, e);
            None
        }
    }
}

/// Size every object of a bucket by listing it
///
/// Used when CloudWatch has no storage metrics for the bucket. Each page is
/// folded into per-class totals as it arrives. A bucket the caller may not
/// list yields no samples rather than an error.
pub(crate) async fn list_object_samples(
    client: &Client,
    retry: &RetryStrategy,
    bucket: &str,
) -> Result<Vec<TierSample>> {
    let mut tiers: BTreeMap<StorageClass, TierTotals> = BTreeMap::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let token = continuation_token.take();
        let result = retry
            .run("ListObjectsV2", || {
                let request = client
                    .list_objects_v2()
                    .bucket(bucket)
                    .set_continuation_token(token.clone())
                    .send();
                async move { request.await.map_err(|e| api_error(S3, e)) }
            })
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.api_kind() == Some(ApiErrorKind::Permission) => {
                warn!("Cannot list objects in {}: {}", bucket, e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        add_objects(&mut tiers, output.contents());

        match output.next_continuation_token() {
            Some(next) if output.is_truncated() == Some(true) => {
                continuation_token = Some(next.to_string())
            }
            _ => break,
        }
    }

    Ok(tiers
        .into_iter()
        .filter(|(_, totals)| totals.bytes > 0)
        .map(|(class, totals)| TierSample::new(bucket, class, totals.bytes, totals.objects))
        .collect())
}

/// Add one page of objects to the running per-class totals
fn add_objects(tiers: &mut BTreeMap<StorageClass, TierTotals>, objects: &[Object]) {
    for object in objects {
        let (class, size) = object_tier(object);
        *tiers.entry(class).or_default() += TierTotals::new(size, 1);
    }
}

fn object_tier(object: &Object) -> (StorageClass, u64) {
    let storage_class = object
        .storage_class()
        .map(|c| StorageClass::from_object_storage_class(c.as_str()))
        .unwrap_or(StorageClass::Standard);
    let size = object.size().unwrap_or(0).max(0) as u64;
    (storage_class, size)
}
