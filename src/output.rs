//! Output formatting module for s3cost
//!
//! Every report is first turned into a [`ReportTable`], the single tabular
//! model shared by the terminal table and the CSV export, so both always
//! carry the same cells. On top of that this module provides formatters for:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output
//!
//! # Examples
//!
//! ```
//! use s3cost::output::get_formatter;
//! use s3cost::types::{BucketTiers, StorageClass, TierTotals};
//!
//! let mut tiers = BucketTiers::empty("my-logs");
//! tiers.tiers.insert(StorageClass::Standard, TierTotals::new(1536, 3));
//!
//! let formatter = get_formatter(false);
//! let output = formatter.format_bucket_details(&tiers).unwrap();
//! assert!(output.contains("1.50 KB"));
//! ```

use crate::error::Result;
use crate::types::{BucketTiers, CostReport};
use crate::units::{format_currency, format_number, human_size};
use prettytable::{Cell, Row, Table, format};
use serde_json::json;

/// Cell shown for buckets without tier data
pub const NO_DATA: &str = "No data";
/// Companion cell for buckets without tier data
pub const NOT_AVAILABLE: &str = "N/A";

/// Rows and columns of one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    /// Column headers
    pub headers: Vec<String>,
    /// One row per entity
    pub rows: Vec<Vec<String>>,
    /// Optional summary row rendered after the entity rows
    pub total: Option<Vec<String>>,
    /// Columns rendered right-aligned in the terminal
    pub numeric_columns: Vec<usize>,
}

impl ReportTable {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            total: None,
            numeric_columns: Vec::new(),
        }
    }

    fn numeric(mut self, columns: &[usize]) -> Self {
        self.numeric_columns = columns.to_vec();
        self
    }

    /// `Usage Type, Cost` rows, most expensive first
    pub fn costs(report: &CostReport) -> Self {
        let mut table = Self::new(&["Usage Type", "Cost"]).numeric(&[1]);
        table.rows = report
            .lines
            .iter()
            .map(|line| {
                vec![
                    line.usage_type.clone(),
                    format_currency(line.amount, &line.currency),
                ]
            })
            .collect();
        table
    }

    /// One row per bucket with its total size and storage classes
    pub fn bucket_summary(buckets: &[BucketTiers]) -> Self {
        let mut table = Self::new(&["Bucket", "Total Size", "Storage Types"]).numeric(&[1]);
        table.rows = buckets
            .iter()
            .map(|bucket| {
                if bucket.is_empty() {
                    vec![
                        bucket.bucket.clone(),
                        NO_DATA.to_string(),
                        NOT_AVAILABLE.to_string(),
                    ]
                } else {
                    let classes = bucket
                        .storage_classes()
                        .map(|c| c.label())
                        .collect::<Vec<_>>()
                        .join(", ");
                    vec![bucket.bucket.clone(), human_size(bucket.total_bytes()), classes]
                }
            })
            .collect();
        table
    }

    /// One row per bucket and storage tier
    pub fn bucket_tiers(buckets: &[BucketTiers]) -> Self {
        let mut table = Self::new(&["Bucket", "Storage Tier", "Size"]).numeric(&[2]);
        for bucket in buckets {
            if bucket.is_empty() {
                table.rows.push(vec![
                    bucket.bucket.clone(),
                    NO_DATA.to_string(),
                    NOT_AVAILABLE.to_string(),
                ]);
                continue;
            }
            for (class, totals) in &bucket.tiers {
                table.rows.push(vec![
                    bucket.bucket.clone(),
                    class.label().to_string(),
                    human_size(totals.bytes),
                ]);
            }
        }
        table
    }

    /// Tier breakdown of a single bucket with a total row
    pub fn bucket_details(bucket: &BucketTiers) -> Self {
        let mut table = Self::new(&["Storage Tier", "Size", "Objects"]).numeric(&[1, 2]);
        table.rows = bucket
            .tiers
            .iter()
            .map(|(class, totals)| {
                vec![
                    class.label().to_string(),
                    human_size(totals.bytes),
                    format_objects(totals.objects),
                ]
            })
            .collect();
        table.total = Some(vec![
            "Total".to_string(),
            human_size(bucket.total_bytes()),
            format_objects(bucket.total_objects()),
        ]);
        table
    }
}

/// Object counts of zero mean the source did not report them
fn format_objects(objects: u64) -> String {
    if objects == 0 {
        "-".to_string()
    } else {
        format_number(objects)
    }
}

/// Render a report table for the terminal
pub fn render_table(report: &ReportTable) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    table.set_titles(Row::new(
        report
            .headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));

    let cell = |index: usize, value: &str, bold: bool| {
        let spec = match (report.numeric_columns.contains(&index), bold) {
            (true, true) => "br",
            (true, false) => "r",
            (false, true) => "b",
            (false, false) => "",
        };
        Cell::new(value).style_spec(spec)
    };

    for row in &report.rows {
        table.add_row(Row::new(
            row.iter()
                .enumerate()
                .map(|(i, value)| cell(i, value, false))
                .collect(),
        ));
    }

    if let Some(total) = &report.total {
        // Add separator
        table.add_row(Row::new(vec![Cell::new(""); report.headers.len()]));
        table.add_row(Row::new(
            total
                .iter()
                .enumerate()
                .map(|(i, value)| cell(i, value, true))
                .collect(),
        ));
    }

    table.to_string()
}

/// Trait for output formatters
///
/// Implementations render each report for standard output. Serialization
/// failures surface as [`S3CostError::Json`](crate::error::S3CostError::Json).
pub trait OutputFormatter {
    /// Format the S3 cost report
    fn format_costs(&self, report: &CostReport) -> Result<String>;

    /// Format the bucket listing, summarized or per tier
    fn format_buckets(&self, buckets: &[BucketTiers], detailed: bool) -> Result<String>;

    /// Format the tier breakdown of a single bucket
    fn format_bucket_details(&self, bucket: &BucketTiers) -> Result<String>;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl OutputFormatter for TableFormatter {
    fn format_costs(&self, report: &CostReport) -> Result<String> {
        let mut output = format!(
            "Total S3 Cost (last {} days): {}\n",
            report.days,
            format_currency(report.total, &report.currency)
        );

        if report.lines.is_empty() {
            output.push_str("\nNo S3 cost line items found.\n");
        } else {
            output.push_str("\nDetailed Cost Breakdown:\n");
            output.push_str(&render_table(&ReportTable::costs(report)));
        }

        Ok(output)
    }

    fn format_buckets(&self, buckets: &[BucketTiers], detailed: bool) -> Result<String> {
        let output = if detailed {
            format!(
                "S3 Bucket Storage Tiers (Detailed):\n{}",
                render_table(&ReportTable::bucket_tiers(buckets))
            )
        } else {
            format!(
                "S3 Bucket Storage Summary:\n{}",
                render_table(&ReportTable::bucket_summary(buckets))
            )
        };
        Ok(output)
    }

    fn format_bucket_details(&self, bucket: &BucketTiers) -> Result<String> {
        Ok(format!(
            "Storage Tier Breakdown for {}:\n{}",
            bucket.bucket,
            render_table(&ReportTable::bucket_details(bucket))
        ))
    }
}

/// JSON formatter for machine-readable output
///
/// Sizes are emitted both raw and human-readable.
pub struct JsonFormatter;

impl JsonFormatter {
    fn bucket_json(bucket: &BucketTiers) -> serde_json::Value {
        json!({
            "bucket": bucket.bucket,
            "total_bytes": bucket.total_bytes(),
            "total_size": human_size(bucket.total_bytes()),
            "total_objects": bucket.total_objects(),
            "tiers": bucket.tiers.iter().map(|(class, totals)| json!({
                "storage_class": class.label(),
                "bytes": totals.bytes,
                "size": human_size(totals.bytes),
                "objects": totals.objects,
            })).collect::<Vec<_>>(),
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_costs(&self, report: &CostReport) -> Result<String> {
        let output = json!({
            "period": {
                "days": report.days,
                "start": report.period_start.format("%Y-%m-%d").to_string(),
                "end": report.period_end.format("%Y-%m-%d").to_string(),
            },
            "total": report.total,
            "currency": report.currency,
            "costs": report.lines.iter().map(|line| json!({
                "usage_type": line.usage_type,
                "amount": line.amount,
                "currency": line.currency,
            })).collect::<Vec<_>>(),
        });

        Ok(serde_json::to_string_pretty(&output)?)
    }

    fn format_buckets(&self, buckets: &[BucketTiers], _detailed: bool) -> Result<String> {
        let output = json!({
            "buckets": buckets.iter().map(Self::bucket_json).collect::<Vec<_>>(),
        });

        Ok(serde_json::to_string_pretty(&output)?)
    }

    fn format_bucket_details(&self, bucket: &BucketTiers) -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::bucket_json(bucket))?)
    }
}

/// Get appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CostLine, StorageClass, TierTotals};
    use chrono::NaiveDate;

    fn cost_report() -> CostReport {
        CostReport {
            days: 30,
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            total: 15.75,
            currency: "USD".to_string(),
            lines: vec![
                CostLine {
                    usage_type: "TimedStorage-ByteHrs".to_string(),
                    amount: 12.5,
                    currency: "USD".to_string(),
                },
                CostLine {
                    usage_type: "Requests-Tier1".to_string(),
                    amount: 3.25,
                    currency: "USD".to_string(),
                },
            ],
        }
    }

    fn bucket(name: &str, tiers: &[(StorageClass, u64, u64)]) -> BucketTiers {
        let mut bucket = BucketTiers::empty(name);
        for (class, bytes, objects) in tiers {
            bucket.tiers.insert(*class, TierTotals::new(*bytes, *objects));
        }
        bucket
    }

    #[test]
    fn test_cost_table_rows() {
        let table = ReportTable::costs(&cost_report());
        assert_eq!(table.headers, vec!["Usage Type", "Cost"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["TimedStorage-ByteHrs".to_string(), "$12.50".to_string()],
                vec!["Requests-Tier1".to_string(), "$3.25".to_string()],
            ]
        );
        assert!(table.total.is_none());
    }

    #[test]
    fn test_bucket_summary_rows() {
        let buckets = vec![
            bucket(
                "a",
                &[
                    (StorageClass::Standard, 1024, 0),
                    (StorageClass::Glacier, 1024, 0),
                ],
            ),
            BucketTiers::empty("b"),
        ];
        let table = ReportTable::bucket_summary(&buckets);
        assert_eq!(table.rows[0], vec!["a", "2.00 KB", "Standard, Glacier"]);
        assert_eq!(table.rows[1], vec!["b", NO_DATA, NOT_AVAILABLE]);
    }

    #[test]
    fn test_bucket_tier_rows() {
        let buckets = vec![
            bucket(
                "a",
                &[
                    (StorageClass::DeepArchive, 1536, 0),
                    (StorageClass::Standard, 512, 0),
                ],
            ),
            BucketTiers::empty("b"),
        ];
        let table = ReportTable::bucket_tiers(&buckets);
        assert_eq!(table.headers, vec!["Bucket", "Storage Tier", "Size"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["a", "Standard", "512.00 B"],
                vec!["a", "Glacier Deep Archive", "1.50 KB"],
                vec!["b", NO_DATA, NOT_AVAILABLE],
            ]
        );
    }

    #[test]
    fn test_bucket_detail_rows_with_total() {
        let detail = bucket(
            "logs",
            &[
                (StorageClass::Standard, 1024, 1200),
                (StorageClass::StandardIA, 2048, 0),
            ],
        );
        let table = ReportTable::bucket_details(&detail);
        assert_eq!(table.rows[0], vec!["Standard", "1.00 KB", "1,200"]);
        assert_eq!(table.rows[1], vec!["Standard-IA", "2.00 KB", "-"]);
        assert_eq!(
            table.total,
            Some(vec![
                "Total".to_string(),
                "3.00 KB".to_string(),
                "1,200".to_string()
            ])
        );
    }

    #[test]
    fn test_table_formatter_costs() {
        let output = TableFormatter.format_costs(&cost_report()).unwrap();
        assert!(output.contains("Total S3 Cost (last 30 days): $15.75"));
        assert!(output.contains("Usage Type"));
        assert!(output.contains("TimedStorage-ByteHrs"));
        assert!(output.contains("$3.25"));

        let empty = CostReport {
            lines: Vec::new(),
            total: 0.0,
            ..cost_report()
        };
        assert!(
            TableFormatter
                .format_costs(&empty)
                .unwrap()
                .contains("No S3 cost line items found.")
        );
    }

    #[test]
    fn test_table_formatter_buckets() {
        let buckets = vec![bucket("a", &[(StorageClass::Standard, 1024, 0)])];
        let summary = TableFormatter.format_buckets(&buckets, false).unwrap();
        assert!(summary.starts_with("S3 Bucket Storage Summary:"));
        assert!(summary.contains("Storage Types"));

        let detailed = TableFormatter.format_buckets(&buckets, true).unwrap();
        assert!(detailed.starts_with("S3 Bucket Storage Tiers (Detailed):"));
        assert!(detailed.contains("Storage Tier"));
        assert!(detailed.contains("1.00 KB"));
    }

    #[test]
    fn test_table_formatter_bucket_details() {
        let detail = bucket("logs", &[(StorageClass::Glacier, 1_099_511_627_776, 10)]);
        let output = TableFormatter.format_bucket_details(&detail).unwrap();
        assert!(output.starts_with("Storage Tier Breakdown for logs:"));
        assert!(output.contains("1.00 TB"));
        assert!(output.contains("Total"));
    }

    #[test]
    fn test_json_formatter_costs() {
        let output = JsonFormatter.format_costs(&cost_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total"], 15.75);
        assert_eq!(value["period"]["start"], "2024-01-01");
        assert_eq!(value["costs"][0]["usage_type"], "TimedStorage-ByteHrs");
        assert_eq!(value["costs"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_formatter_non_finite_amounts() {
        let report = CostReport {
            total: f64::NAN,
            ..cost_report()
        };
        let output = JsonFormatter.format_costs(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value["total"].is_null());
        assert_eq!(value["costs"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_formatter_buckets() {
        let buckets = vec![
            bucket(
                "a",
                &[
                    (StorageClass::Standard, 100, 1),
                    (StorageClass::Glacier, 200, 2),
                ],
            ),
            BucketTiers::empty("b"),
        ];
        let output = JsonFormatter.format_buckets(&buckets, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["buckets"][0]["total_bytes"], 300);
        assert_eq!(value["buckets"][0]["tiers"][1]["storage_class"], "Glacier");
        assert_eq!(value["buckets"][1]["tiers"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_get_formatter() {
        let json_formatter = get_formatter(true);
        let detail = BucketTiers::empty("x");
        assert!(
            json_formatter
                .format_bucket_details(&detail)
                .unwrap()
                .contains("\"bucket\"")
        );

        let table_formatter = get_formatter(false);
        assert!(
            table_formatter
                .format_bucket_details(&detail)
                .unwrap()
                .contains("Storage Tier Breakdown")
        );
    }
}
