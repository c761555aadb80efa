//! Cost Explorer queries for S3 spend

use crate::error::{COST_EXPLORER, api_error};
use aws_sdk_costexplorer::Client;
use aws_sdk_costexplorer::types::{
    DateInterval, Dimension, DimensionValues, Expression, Granularity, GroupDefinition,
    GroupDefinitionType, ResultByTime,
};
use chrono::{Duration, NaiveDate};
use s3cost_core::error::{Result, S3CostError};
use s3cost_core::retry::RetryStrategy;
use s3cost_core::types::{CostRecord, DEFAULT_CURRENCY};
use tracing::debug;

/// Cost Explorer `SERVICE` dimension value for S3
pub const S3_SERVICE_NAME: &str = "Amazon Simple Storage Service";

/// Metric requested from Cost Explorer
pub const COST_METRIC: &str = "BlendedCost";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The `[start, end)` window covering the last `days` days before `today`
///
/// # Examples
/// ```
/// use s3cost_aws::cost_explorer::cost_period;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let (start, end) = cost_period(30, today).unwrap();
/// assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
/// assert_eq!(end, today);
/// ```
pub fn cost_period(days: u32, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let start = today
        .checked_sub_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| {
            S3CostError::InvalidArgument(format!("--days {days} reaches before the calendar"))
        })?;
    Ok((start, today))
}

/// Fetch S3 cost line items grouped by usage type, following pagination
pub(crate) async fn fetch_cost_records(
    client: &Client,
    retry: &RetryStrategy,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CostRecord>> {
    let time_period = DateInterval::builder()
        .start(start.format(DATE_FORMAT).to_string())
        .end(end.format(DATE_FORMAT).to_string())
        .build()
        .map_err(|e| S3CostError::InvalidArgument(format!("invalid cost period: {e}")))?;

    let filter = Expression::builder()
        .dimensions(
            DimensionValues::builder()
                .key(Dimension::Service)
                .values(S3_SERVICE_NAME)
                .build(),
        )
        .build();

    let group_by = GroupDefinition::builder()
        .r#type(GroupDefinitionType::Dimension)
        .key("USAGE_TYPE")
        .build();

    let mut records = Vec::new();
    let mut next_page_token: Option<String> = None;

    loop {
        let token = next_page_token.take();
        let output = retry
            .run("GetCostAndUsage", || {
                let request = client
                    .get_cost_and_usage()
                    .time_period(time_period.clone())
                    .granularity(Granularity::Monthly)
                    .metrics(COST_METRIC)
                    .group_by(group_by.clone())
                    .filter(filter.clone())
                    .set_next_page_token(token.clone())
                    .send();
                async move { request.await.map_err(|e| api_error(COST_EXPLORER, e)) }
            })
            .await?;

        records.extend(records_from_results(output.results_by_time())?);

        match output.next_page_token() {
            Some(token) if !token.is_empty() => next_page_token = Some(token.to_string()),
            _ => break,
        }
    }

    debug!("Cost Explorer returned {} cost records", records.len());
    Ok(records)
}

/// Map Cost Explorer results into typed cost records
///
/// Groups without a `BlendedCost` metric are skipped; an amount that does not
/// parse as a number is an invalid response.
pub fn records_from_results(results: &[ResultByTime]) -> Result<Vec<CostRecord>> {
    let mut records = Vec::new();

    for result in results {
        let (period_start, period_end) = match result.time_period() {
            Some(period) => (parse_date(period.start())?, parse_date(period.end())?),
            None => {
                return Err(S3CostError::InvalidResponse(
                    "cost result without a time period".to_string(),
                ));
            }
        };

        for group in result.groups() {
            let Some(usage_type) = group.keys().first() else {
                continue;
            };
            let Some(metric) = group.metrics().and_then(|m| m.get(COST_METRIC)) else {
                continue;
            };

            let raw_amount = metric.amount().unwrap_or("0");
            let amount = raw_amount.parse::<f64>().map_err(|_| {
                S3CostError::InvalidResponse(format!(
                    "unparsable cost amount '{raw_amount}' for {usage_type}"
                ))
            })?;

            records.push(CostRecord {
                usage_type: usage_type.clone(),
                amount,
                currency: metric.unit().unwrap_or(DEFAULT_CURRENCY).to_string(),
                period_start,
                period_end,
            });
        }
    }

    Ok(records)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| S3CostError::InvalidResponse(format!("invalid date '{value}'")))
}
