//! Byte and currency formatting helpers

/// Binary size units, smallest first
const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Format a byte count with 1024-based units and two decimals
///
/// Picks the largest unit whose scaled value is at least 1. Zero is
/// rendered without decimals.
///
/// # Examples
/// ```
/// use s3cost_core::units::human_size;
///
/// assert_eq!(human_size(0), "0 B");
/// assert_eq!(human_size(1024), "1.00 KB");
/// assert_eq!(human_size(1536), "1.50 KB");
/// assert_eq!(human_size(1_099_511_627_776), "1.00 TB");
/// ```
pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.2} {}", SIZE_UNITS[unit])
}

/// Format a cost amount
///
/// USD amounts get a dollar sign, other currencies a trailing code.
///
/// # Examples
/// ```
/// use s3cost_core::units::format_currency;
///
/// assert_eq!(format_currency(12.345, "USD"), "$12.35");
/// assert_eq!(format_currency(3.0, "EUR"), "3.00 EUR");
/// ```
pub fn format_currency(amount: f64, currency: &str) -> String {
    if currency.is_empty() || currency == "USD" {
        format!("${amount:.2}")
    } else {
        format!("{amount:.2} {currency}")
    }
}

/// Format an integer with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, ch) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }

    result.chars().rev().collect()
}
