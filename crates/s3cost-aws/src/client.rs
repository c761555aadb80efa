//! AWS-backed implementation of `StorageCostSource`

use crate::settings::{AwsSettings, COST_EXPLORER_REGION, DEFAULT_BUCKET_REGION};
use crate::{cloudwatch, cost_explorer, s3};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use chrono::Utc;
use s3cost_core::error::Result;
use s3cost_core::retry::RetryStrategy;
use s3cost_core::source::StorageCostSource;
use s3cost_core::types::{BucketInfo, CostRecord, TierSample};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// S3 and CloudWatch clients bound to one region
#[derive(Clone)]
struct RegionalClients {
    s3: aws_sdk_s3::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
}

/// Client for Cost Explorer, CloudWatch, and S3
///
/// Regional clients are created lazily, one pair per bucket region, and
/// cached for the lifetime of the client. The SDK's own retries are
/// disabled on every client; throttling is retried by `RetryStrategy` alone.
pub struct AwsClient {
    sdk_config: SdkConfig,
    cost_explorer: aws_sdk_costexplorer::Client,
    s3: aws_sdk_s3::Client,
    regional: RwLock<HashMap<String, RegionalClients>>,
    retry: RetryStrategy,
}

impl AwsClient {
    /// Resolve AWS configuration and build the clients
    pub async fn new(settings: AwsSettings) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).retry_config(RetryConfig::disabled());

        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        let client = Self::from_sdk_config(sdk_config, settings.retry);
        info!("Using AWS region {}", client.default_region());
        client
    }

    /// Build the clients from an already-loaded configuration
    pub fn from_sdk_config(sdk_config: SdkConfig, retry: RetryStrategy) -> Self {
        let cost_explorer_config = aws_sdk_costexplorer::config::Builder::from(&sdk_config)
            .region(Region::new(COST_EXPLORER_REGION))
            .retry_config(RetryConfig::disabled())
            .build();

        Self {
            cost_explorer: aws_sdk_costexplorer::Client::from_conf(cost_explorer_config),
            s3: aws_sdk_s3::Client::from_conf(
                aws_sdk_s3::config::Builder::from(&sdk_config)
                    .region(
                        sdk_config
                            .region()
                            .cloned()
                            .unwrap_or_else(|| Region::new(DEFAULT_BUCKET_REGION)),
                    )
                    .retry_config(RetryConfig::disabled())
                    .build(),
            ),
            sdk_config,
            regional: RwLock::new(HashMap::new()),
            retry,
        }
    }

    /// Configured region, or `us-east-1` when none is set
    fn default_region(&self) -> &str {
        self.sdk_config
            .region()
            .map(|r| r.as_ref())
            .unwrap_or(DEFAULT_BUCKET_REGION)
    }

    /// Clients for `region`, created on first use
    async fn regional_clients(&self, region: &str) -> RegionalClients {
        {
            let cache = self.regional.read().await;
            if let Some(clients) = cache.get(region) {
                return clients.clone();
            }
        }

        let mut cache = self.regional.write().await;
        cache
            .entry(region.to_string())
            .or_insert_with(|| {
                debug!("Creating clients for region {}", region);
                let s3_config = aws_sdk_s3::config::Builder::from(&self.sdk_config)
                    .region(Region::new(region.to_string()))
                    .retry_config(RetryConfig::disabled())
                    .build();
                let cloudwatch_config =
                    aws_sdk_cloudwatch::config::Builder::from(&self.sdk_config)
                        .region(Region::new(region.to_string()))
                        .retry_config(RetryConfig::disabled())
                        .build();
                RegionalClients {
                    s3: aws_sdk_s3::Client::from_conf(s3_config),
                    cloudwatch: aws_sdk_cloudwatch::Client::from_conf(cloudwatch_config),
                }
            })
            .clone()
    }
}

#[async_trait]
impl StorageCostSource for AwsClient {
    async fn fetch_costs(&self, days: u32) -> Result<Vec<CostRecord>> {
        let (start, end) = cost_explorer::cost_period(days, Utc::now().date_naive())?;
        info!("Querying S3 costs from {} to {}", start, end);
        cost_explorer::fetch_cost_records(&self.cost_explorer, &self.retry, start, end).await
    }

    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        s3::list_buckets(&self.s3, &self.retry).await
    }

    async fn fetch_tier_samples(&self, bucket: &str) -> Result<Vec<TierSample>> {
        let region = match s3::locate_bucket(&self.s3, &self.retry, bucket).await {
            Some(region) => region,
            None => self.default_region().to_string(),
        };
        let clients = self.regional_clients(&region).await;

        let samples =
            cloudwatch::fetch_bucket_size_samples(&clients.cloudwatch, &self.retry, bucket)
                .await?;
        if !samples.is_empty() {
            return Ok(samples);
        }

        info!("No CloudWatch storage metrics for {}, listing objects", bucket);
        s3::list_object_samples(&clients.s3, &self.retry, bucket).await
    }
}
