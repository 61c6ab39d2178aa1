use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Normalizes input for decimal parsing: trims whitespace and removes commas
/// (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into an optional [`Decimal`].
///
/// Handles comma as thousands separator. Returns `None` for empty or
/// whitespace-only input, or when parsing fails (logs a warning on parse
/// failure).
pub fn parse_optional_decimal(s: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        None
    } else {
        normalized.parse().map_or_else(
            |e| {
                tracing::warn!(input = %s, "invalid optional decimal: {}", e);
                None
            },
            Some,
        )
    }
}

/// Formats a monetary amount for table cells.
pub fn format_money(amount: &Decimal) -> String {
    format!("${amount:.2}")
}

/// Formats an optional timestamp as `MM/DD/YYYY`, using "—" when `None`.
pub fn format_date(date: &Option<DateTime<Utc>>) -> String {
    date.as_ref()
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}

/// Formats an optional string for display, using "—" when missing or empty.
pub fn opt_display(value: &Option<String>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "—",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_optional_decimal_handles_comma_and_empty() {
        assert_eq!(parse_optional_decimal("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_optional_decimal(""), None);
        assert_eq!(parse_optional_decimal("   "), None);
        assert_eq!(parse_optional_decimal("abc"), None);
    }

    #[test]
    fn money_is_rendered_with_two_places() {
        assert_eq!(format_money(&dec!(125.5)), "$125.50");
        assert_eq!(format_money(&dec!(1000)), "$1000.00");
    }

    #[test]
    fn dates_render_in_us_order_with_dash_fallback() {
        let date = Utc.with_ymd_and_hms(2026, 3, 9, 8, 30, 0).unwrap();
        assert_eq!(format_date(&Some(date)), "03/09/2026");
        assert_eq!(format_date(&None), "—");
    }

    #[test]
    fn optional_strings_fall_back_to_dash() {
        assert_eq!(opt_display(&Some("Sam".to_string())), "Sam");
        assert_eq!(opt_display(&Some(String::new())), "—");
        assert_eq!(opt_display(&None), "—");
    }
}
