//! Millisecond timestamps to ISO-8601.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Zone used when rendering ISO-8601 timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneMode {
    #[default]
    Local,
    Utc,
}

impl FromStr for TimeZoneMode {
    type Err = chatdig_types::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" => Ok(Self::Utc),
            other => Err(chatdig_types::ConfigError::InvalidValue {
                key: "timezone".into(),
                message: format!("expected local or utc, got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for TimeZoneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Utc => "utc",
        })
    }
}

/// Convert a stored epoch-millisecond value to `(ms, iso)`.
///
/// Numbers are truncated to whole milliseconds and integer strings are
/// accepted. Anything else, including values outside the representable
/// date range, yields `(None, None)`.
pub fn format_timestamp(date: Option<&Value>, zone: TimeZoneMode) -> (Option<i64>, Option<String>) {
    let Some(ms) = date.and_then(to_millis) else {
        return (None, None);
    };
    let Some(utc) = DateTime::<Utc>::from_timestamp_millis(ms) else {
        return (None, None);
    };
    let iso = match zone {
        TimeZoneMode::Utc => utc.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        TimeZoneMode::Local => utc
            .with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::AutoSi, false),
    };
    (Some(ms), Some(iso))
}

fn to_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn utc_rendering() {
        let (ms, iso) = format_timestamp(Some(&json!(1_700_000_000_000i64)), TimeZoneMode::Utc);
        assert_eq!(ms, Some(1_700_000_000_000));
        assert_eq!(iso.as_deref(), Some("2023-11-14T22:13:20+00:00"));
    }

    #[test]
    fn utc_keeps_milliseconds() {
        let (_, iso) = format_timestamp(Some(&json!(1_700_000_000_123i64)), TimeZoneMode::Utc);
        assert_eq!(iso.as_deref(), Some("2023-11-14T22:13:20.123+00:00"));
    }

    #[test]
    fn local_rendering_is_same_instant() {
        let (ms, iso) = format_timestamp(Some(&json!(1_700_000_000_000i64)), TimeZoneMode::Local);
        assert_eq!(ms, Some(1_700_000_000_000));
        let parsed = DateTime::parse_from_rfc3339(&iso.unwrap()).unwrap();
        assert_eq!(parsed.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn float_and_string_millis() {
        assert_eq!(format_timestamp(Some(&json!(1500.9)), TimeZoneMode::Utc).0, Some(1500));
        assert_eq!(format_timestamp(Some(&json!(" 42 ")), TimeZoneMode::Utc).0, Some(42));
    }

    #[test]
    fn missing_or_non_numeric_is_null() {
        for v in [json!(null), json!("soon"), json!(true), json!([1]), json!("1.5")] {
            assert_eq!(format_timestamp(Some(&v), TimeZoneMode::Utc), (None, None), "{v}");
        }
        assert_eq!(format_timestamp(None, TimeZoneMode::Utc), (None, None));
    }

    #[test]
    fn out_of_range_is_null() {
        assert_eq!(format_timestamp(Some(&json!(i64::MAX)), TimeZoneMode::Utc), (None, None));
    }

    #[test]
    fn zone_parsing() {
        assert_eq!("UTC".parse::<TimeZoneMode>().unwrap(), TimeZoneMode::Utc);
        assert_eq!("local".parse::<TimeZoneMode>().unwrap(), TimeZoneMode::Local);
        assert!("mars".parse::<TimeZoneMode>().is_err());
    }
}
