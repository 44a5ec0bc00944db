//! Item value formatting
//!
//! Converts loosely typed panel fields into the plain strings a Zabbix item
//! expects. All functions here are pure.
//!
//! | kind        | result                                                    |
//! |-------------|-----------------------------------------------------------|
//! | `Numeric`   | decimal rendering of the leading number (`"42.5"`, `"100"`) |
//! | `Boolean`   | `"1"` / `"0"`                                             |
//! | `Timestamp` | epoch seconds, `"0"` when unparsable                      |
//! | `Bytes`     | integer byte count, `"1.5M"` → `"1572864"`                |
//! | `String`    | sanitized text                                            |
//!
//! A JSON `null` always formats as `""`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    #[default]
    String,
    Numeric,
    Boolean,
    Timestamp,
    Bytes,
}

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").expect("valid numeric regex")
});

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("valid prefix regex")
});

static HUMAN_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*([BKMGT])?$").expect("valid size regex")
});

/// Whitespace stripped from sanitized text; Unicode spaces such as U+00A0 are kept.
const TRIMMED: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

const TRUTHY: [&str; 6] = ["1", "yes", "y", "true", "on", "active"];

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Format a raw field value for a Zabbix item of the given kind.
pub fn format_item_value(value: &Value, kind: ValueKind) -> String {
    if value.is_null() {
        return String::new();
    }

    match kind {
        ValueKind::Numeric => render_number(to_float(value)),
        ValueKind::Boolean => bool_flag(parse_boolean(value)).to_string(),
        ValueKind::Timestamp => format_timestamp(value),
        ValueKind::Bytes => parse_bytes(value).to_string(),
        ValueKind::String => sanitize_value(value),
    }
}

/// Plain string rendering with control characters removed and ASCII whitespace trimmed.
pub fn sanitize_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => bool_flag(*b).to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => render_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s
            .chars()
            .filter(|c| !matches!(*c, '\u{00}'..='\u{1F}' | '\u{7F}'))
            .collect::<String>()
            .trim_matches(TRIMMED)
            .to_string(),
    }
}

/// Mailbox usage as a percentage of quota, capped at 100. Zero when there is no quota.
pub fn calculate_email_usage_percent(used: f64, quota: f64) -> f64 {
    if quota <= 0.0 {
        return 0.0;
    }
    (used / quota * 100.0).min(100.0)
}

/// Build a Zabbix item key such as `ispconfig.website.status[123,active]`.
pub fn create_item_key<S: AsRef<str>>(prefix: &str, metric: &str, params: &[S]) -> String {
    let mut key = format!("{}.{}", prefix, metric);

    if !params.is_empty() {
        let params = params
            .iter()
            .map(|p| escape_key_param(p.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        key.push('[');
        key.push_str(&params);
        key.push(']');
    }

    key
}

fn escape_key_param(param: &str) -> String {
    let mut escaped = String::with_capacity(param.len());
    for c in param.chars() {
        if matches!(c, '\\' | '"' | '[' | ']' | ',') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    if escaped.contains(' ') {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

fn bool_flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// Whole numbers render without a fractional part.
fn render_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

fn is_numeric(s: &str) -> bool {
    NUMERIC.is_match(s)
}

/// Value of the leading number in `s`, zero when there is none.
fn leading_float(s: &str) -> f64 {
    LEADING_NUMBER
        .find(s)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => leading_float(s),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Array(items) => f64::from(u8::from(!items.is_empty())),
        Value::Object(map) => f64::from(u8::from(!map.is_empty())),
        Value::Null => 0.0,
    }
}

/// Integer cast: numbers truncate, strings use their leading number.
pub(crate) fn to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .unwrap_or_else(|_| leading_float(s) as i64),
        other => to_float(other) as i64,
    }
}

fn parse_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f > 0.0),
        Value::String(s) if is_numeric(s) => leading_float(s) > 0.0,
        Value::String(s) => TRUTHY.contains(&s.to_lowercase().as_str()),
        _ => false,
    }
}

fn format_timestamp(value: &Value) -> String {
    match value {
        Value::Number(_) => to_int(value).to_string(),
        Value::String(s) if is_numeric(s) => to_int(value).to_string(),
        Value::String(s) => parse_date_time(s.trim())
            .map(|ts| ts.to_string())
            .unwrap_or_else(|| "0".to_string()),
        _ => "0".to_string(),
    }
}

/// Epoch seconds for common date/time renderings; naive times are taken as UTC.
fn parse_date_time(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

fn parse_bytes(value: &Value) -> i64 {
    match value {
        Value::Number(_) => to_int(value),
        Value::String(s) if is_numeric(s) => to_int(value),
        Value::Array(_) | Value::Object(_) | Value::Null => 0,
        other => parse_human_size(&sanitize_value(other)),
    }
}

fn parse_human_size(s: &str) -> i64 {
    let Some(caps) = HUMAN_SIZE.captures(s.trim()) else {
        return 0;
    };

    let number = caps[1].parse::<f64>().unwrap_or(0.0);
    let multiplier: f64 = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(unit) if unit == "K" => 1024.0,
        Some(unit) if unit == "M" => 1_048_576.0,
        Some(unit) if unit == "G" => 1_073_741_824.0,
        Some(unit) if unit == "T" => 1_099_511_627_776.0,
        _ => 1.0,
    };

    (number * multiplier) as i64
}
