//! Connection settings for the AWS clients

use s3cost_core::retry::RetryStrategy;

/// Region Cost Explorer is served from
pub const COST_EXPLORER_REGION: &str = "us-east-1";

/// Region used when a bucket reports no location constraint
pub const DEFAULT_BUCKET_REGION: &str = "us-east-1";

/// Settings used to build an [`AwsClient`](crate::AwsClient)
///
/// Anything left unset is resolved by the standard AWS configuration chain
/// (environment, shared config and credentials files, instance role).
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    /// Named profile from the shared config files
    pub profile: Option<String>,
    /// Default region for S3 and CloudWatch
    pub region: Option<String>,
    /// Retry strategy for throttled calls
    pub retry: RetryStrategy,
}

impl AwsSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn with_retry(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }
}

/// Normalize a `GetBucketLocation` constraint into a region name
///
/// Buckets in `us-east-1` report an empty constraint and very old buckets in
/// Ireland report the legacy `EU` value.
///
/// # Examples
/// ```
/// use s3cost_aws::settings::bucket_region;
///
/// assert_eq!(bucket_region(None), "us-east-1");
/// assert_eq!(bucket_region(Some("")), "us-east-1");
/// assert_eq!(bucket_region(Some("EU")), "eu-west-1");
/// assert_eq!(bucket_region(Some("ap-northeast-1")), "ap-northeast-1");
/// ```
pub fn bucket_region(constraint: Option<&str>) -> String {
    match constraint {
        None | Some("") => DEFAULT_BUCKET_REGION.to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}
