//! Display formatting for money, form types and timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a decimal money string. Blank or non-numeric text yields `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// `"1500"` → `"$1,500"`. Unparseable text renders as `"$0"`.
pub fn format_currency(raw: &str) -> String {
    parse_amount(raw)
        .map(format_currency_value)
        .unwrap_or_else(|| "$0".to_string())
}

/// Whole-dollar USD with thousands separators; halves round away from zero.
pub fn format_currency_value(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}${}", group_thousands(&digits))
}

/// Abbreviates at 10^3/10^6/10^9 (`"$2.5M"`), falling back to
/// [`format_currency_value`] below a thousand.
pub fn format_large_number(raw: &str) -> String {
    parse_amount(raw)
        .map(format_large_number_value)
        .unwrap_or_else(|| "$0".to_string())
}

pub fn format_large_number_value(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    if amount >= 1e9 {
        format!("${:.1}B", amount / 1e9)
    } else if amount >= 1e6 {
        format!("${:.1}M", amount / 1e6)
    } else if amount >= 1e3 {
        format!("${:.1}K", amount / 1e3)
    } else {
        format_currency_value(amount)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// IRS form code → form name.
pub fn form_type_name(formtype: i32) -> String {
    match formtype {
        0 => "990".to_string(),
        1 => "990-EZ".to_string(),
        2 => "990-PF".to_string(),
        other => other.to_string(),
    }
}

/// Renders a service timestamp as `January 5, 2024`. Text that is not a
/// recognizable date is returned unchanged.
pub fn format_date_label(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}
