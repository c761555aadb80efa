//! Mapping of AWS SDK errors into `S3CostError`

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use s3cost_core::error::{ApiErrorKind, S3CostError};

pub(crate) const COST_EXPLORER: &str = "costexplorer";
pub(crate) const CLOUDWATCH: &str = "cloudwatch";
pub(crate) const S3: &str = "s3";

/// Convert any SDK error into an external API error
///
/// The upstream message is kept verbatim when the service returned one;
/// otherwise the full error chain is rendered, which is where credential
/// and connection failures put their detail.
pub(crate) fn api_error<E>(service: &'static str, err: E) -> S3CostError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    let kind = ApiErrorKind::classify(err.code(), &message);
    S3CostError::external(service, kind, message)
}
