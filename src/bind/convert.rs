//! Named splitters and a few built-in scalar converters that don't fit the
//! plain `FromStr` path: durations and timestamps.
//!
//! A process-wide splitter registry lets callers register a named splitter
//! function once (e.g. at startup) and reference it from a tag's
//! `||splitter` suffix anywhere in the bound types.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::WeaveError;

type SplitterFn = fn(&str) -> Vec<String>;

fn registry() -> &'static RwLock<HashMap<String, SplitterFn>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, SplitterFn>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a named splitter function, available to any `||name` tag from
/// then on. Re-registering a name overwrites the previous function.
pub fn register_splitter(name: &str, f: SplitterFn) {
    registry().write().insert(name.to_string(), f);
}

fn split_comma(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.to_string()).collect()
}

/// Split `raw` using the named splitter, or the default comma splitter when
/// `splitter` is `None`.
pub fn split_value(raw: &str, splitter: Option<&str>) -> Result<Vec<String>, WeaveError> {
    match splitter {
        None => Ok(split_comma(raw)),
        Some(name) => {
            let guard = registry().read();
            match guard.get(name) {
                Some(f) => Ok(f(raw)),
                None => Err(WeaveError::bind_leaf(format!(
                    "unknown splitter \"{name}\""
                ))),
            }
        }
    }
}

/// Parse a Go-style compound duration string (`"5s"`, `"1h30m"`, `"250ms"`).
/// Units: `ns`, `us`, `ms`, `s`, `m`, `h`. No unit defaults to seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, WeaveError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(WeaveError::bind_leaf("invalid duration value \"\""));
    }
    let bad = || WeaveError::bind_leaf(format!("invalid duration value \"{raw}\""));

    let mut total = Duration::ZERO;
    let bytes = raw.as_bytes();
    let mut i = 0;
    let mut any = false;
    while i < bytes.len() {
        let start = i;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }
        if i == start {
            return Err(bad());
        }
        let number: f64 = raw[start..i].parse().map_err(|_| bad())?;
        let unit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let unit = &raw[unit_start..i];
        let seconds = match unit {
            "ns" => number / 1_000_000_000.0,
            "us" | "µs" => number / 1_000_000.0,
            "ms" => number / 1_000.0,
            "s" | "" => number,
            "m" => number * 60.0,
            "h" => number * 3600.0,
            _ => return Err(bad()),
        };
        total += Duration::from_secs_f64(seconds.max(0.0));
        any = true;
    }
    if !any {
        return Err(bad());
    }
    Ok(total)
}

/// Parse a timestamp in the default `"2006-01-02 15:04:05 UTC"` format (the
/// trailing `UTC` literal is optional on input), falling back to RFC 3339
/// when that doesn't match.
pub fn parse_datetime(raw: &str) -> Result<chrono::NaiveDateTime, WeaveError> {
    let raw = raw.trim();
    let without_utc = raw.strip_suffix("UTC").map(str::trim_end).unwrap_or(raw);
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(without_utc, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    Err(WeaveError::bind_leaf(format!(
        "invalid datetime value \"{raw}\""
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_splitter_is_comma() {
        assert_eq!(split_value("a,b,c", None).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn unregistered_named_splitter_errors() {
        assert!(split_value("a|b", Some("pipe")).is_err());
    }

    #[test]
    fn registered_splitter_is_used() {
        register_splitter("pipe_test", |s| s.split('|').map(String::from).collect());
        assert_eq!(
            split_value("a|b|c", Some("pipe_test")).unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn parses_compound_duration() {
        let d = parse_duration("1h30m").unwrap();
        assert_eq!(d, Duration::from_secs(5400));
    }

    #[test]
    fn rejects_garbage_duration() {
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn parses_default_datetime_format() {
        let dt = parse_datetime("2024-01-02 03:04:05").unwrap();
        assert_eq!(dt.to_string(), "2024-01-02 03:04:05");
    }

    #[test]
    fn parses_rfc3339_fallback() {
        assert!(parse_datetime("2024-01-02T03:04:05Z").is_ok());
    }

    #[test]
    fn parses_default_format_with_trailing_utc_literal() {
        let dt = parse_datetime("2017-06-17 13:20:15 UTC").unwrap();
        assert_eq!(dt.to_string(), "2017-06-17 13:20:15");
    }
}
