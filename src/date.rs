//! Report date parsing
//!
//! The summary page and footers can carry a report date. The CLI accepts a
//! small set of expressions for it.

use chrono::{Local, NaiveDate};
use crate::error::{Error, Result};

/// Parse a report date expression
///
/// Supported formats:
/// - `""` (empty) → no date
/// - `"today"` → the local date
/// - `"2024-11-20"` → explicit date (ISO format)
/// - `"11/20/2024"` → explicit date (US format)
pub fn parse_report_date(expr: &str) -> Result<Option<NaiveDate>> {
    let expr = expr.trim();

    if expr.is_empty() || expr.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    if expr.eq_ignore_ascii_case("today") {
        return Ok(Some(Local::now().date_naive()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    if let Ok(date) = NaiveDate::parse_from_str(expr, "%m/%d/%Y") {
        return Ok(Some(date));
    }

    Err(Error::InvalidDateExpression(format!("Unable to parse date expression: {}", expr)))
}

/// Format a date for display (e.g., "January 14, 2026")
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
