//! Parses `-D key=value` command-line overrides, the highest-priority
//! configuration source: `-D key=value` sets a property, `-D key` alone
//! sets it to `"true"`, and a dangling `-D` with nothing after it is fatal.

use crate::error::WeaveError;
use crate::properties::PropertyStore;

/// Walk `args` looking for `-D` tokens and the key[=value] token that
/// follows each one. Anything else (positional arguments, other flags) is
/// ignored, so callers can hand this the raw argv tail alongside `clap`'s
/// own parsing.
pub fn parse_overrides<'a>(args: impl Iterator<Item = &'a str>) -> Result<Vec<(String, String)>, WeaveError> {
    let mut overrides = Vec::new();
    let mut iter = args.peekable();
    while let Some(arg) = iter.next() {
        if arg != "-D" {
            continue;
        }
        let Some(next) = iter.next() else {
            return Err(WeaveError::syntax("cmd option -D needs arg"));
        };
        match next.find('=') {
            Some(sep) => {
                let key = next[..sep].to_string();
                if key.is_empty() {
                    return Err(WeaveError::syntax("cmd option -D needs arg"));
                }
                overrides.push((key, next[sep + 1..].to_string()));
            }
            None => overrides.push((next.to_string(), "true".to_string())),
        }
    }
    Ok(overrides)
}

/// Apply parsed overrides on top of `store`, last one wins.
pub fn apply_overrides(store: &mut PropertyStore, overrides: &[(String, String)]) -> Result<(), WeaveError> {
    for (key, value) in overrides {
        store.set(key, value.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_pair() {
        let args = vec!["-D", "db.url=postgres://x", "--other-flag"];
        let overrides = parse_overrides(args.into_iter()).unwrap();
        assert_eq!(overrides, vec![("db.url".to_string(), "postgres://x".to_string())]);
    }

    #[test]
    fn bare_key_defaults_to_true() {
        let args = vec!["-D", "feature.enabled"];
        let overrides = parse_overrides(args.into_iter()).unwrap();
        assert_eq!(overrides, vec![("feature.enabled".to_string(), "true".to_string())]);
    }

    #[test]
    fn non_matching_args_are_skipped() {
        let args = vec!["positional", "--flag=value"];
        let overrides = parse_overrides(args.into_iter()).unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    fn dangling_dash_d_is_fatal() {
        let args = vec!["-D"];
        let err = parse_overrides(args.into_iter()).unwrap_err();
        assert_eq!(err.to_string(), "cmd option -D needs arg");
    }

    #[test]
    fn apply_overrides_sets_store() {
        let mut store = PropertyStore::new();
        apply_overrides(&mut store, &[("port".to_string(), "9090".to_string())]).unwrap();
        assert_eq!(store.get("port"), "9090");
    }
}
