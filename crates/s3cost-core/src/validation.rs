//! Argument validation
//!
//! These checks run before any AWS client is built, so bad input never
//! reaches the network.

use crate::error::{Result, S3CostError};
use std::net::Ipv4Addr;

/// Longest `--days` window accepted
///
/// Cost Explorer keeps at most 38 months of history, so longer windows can
/// never return more data.
pub const MAX_DAYS: u32 = 1_200;

/// Validate the `--days` window
///
/// # Examples
/// ```
/// use s3cost_core::validation::validate_days;
///
/// assert_eq!(validate_days(30).unwrap(), 30);
/// assert!(validate_days(0).is_err());
/// assert!(validate_days(-5).is_err());
/// assert!(validate_days(4_000_000_000).is_err());
/// ```
pub fn validate_days(days: i64) -> Result<u32> {
    if days <= 0 {
        return Err(S3CostError::InvalidArgument(format!(
            "--days must be a positive integer, got {days}"
        )));
    }
    match u32::try_from(days) {
        Ok(days) if days <= MAX_DAYS => Ok(days),
        _ => Err(S3CostError::InvalidArgument(format!(
            "--days must be at most {MAX_DAYS}, got {days}"
        ))),
    }
}

/// Validate a bucket-level concurrency limit
pub fn validate_concurrency(concurrency: usize) -> Result<usize> {
    if concurrency == 0 {
        return Err(S3CostError::InvalidArgument(
            "--concurrency must be at least 1".to_string(),
        ));
    }
    Ok(concurrency)
}

/// Validate an S3 bucket name against the general purpose bucket naming rules
///
/// # Examples
/// ```
/// use s3cost_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-logs.2024").is_ok());
/// assert!(validate_bucket_name("My_Bucket").is_err());
/// assert!(validate_bucket_name("192.168.0.1").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(S3CostError::InvalidArgument(format!(
            "invalid bucket name '{name}': {reason}"
        )))
    };

    if !(3..=63).contains(&name.len()) {
        return invalid("must be between 3 and 63 characters long");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return invalid("only lowercase letters, digits, '.' and '-' are allowed");
    }

    let is_alnum = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !is_alnum(name.chars().next()) || !is_alnum(name.chars().last()) {
        return invalid("must begin and end with a letter or digit");
    }
    if name.contains("..") {
        return invalid("must not contain two adjacent periods");
    }
    if name.parse::<Ipv4Addr>().is_ok() {
        return invalid("must not be formatted as an IP address");
    }

    Ok(())
}
