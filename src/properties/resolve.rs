//! Expands `${key:=default}` references embedded inside arbitrary strings.
//!
//! Unlike the bind tag grammar (`properties::tag`), this scans for `${...}`
//! tokens anywhere in the string, leaving surrounding text untouched.
//! Nested `${}` inside a default is not supported — a default is substituted
//! literally. A resolved value is itself re-scanned for further references,
//! recursively, bounded by `MAX_DEPTH` to guard against reference cycles.

use crate::error::WeaveError;
use crate::properties::store::PropertyStore;

pub const MAX_DEPTH: usize = 64;

pub fn resolve(store: &PropertyStore, s: &str) -> Result<String, WeaveError> {
    resolve_depth(store, s, 0)
}

fn resolve_depth(store: &PropertyStore, s: &str, depth: usize) -> Result<String, WeaveError> {
    if depth > MAX_DEPTH {
        return Err(WeaveError::syntax("resolve: max expansion depth exceeded"));
    }
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let close = after_open
            .find('}')
            .ok_or_else(|| WeaveError::syntax("resolve: unterminated ${...}"))?;
        let inner = &after_open[..close];
        rest = &after_open[close + 1..];

        let (key, default) = match inner.find(":=") {
            Some(idx) => (&inner[..idx], Some(&inner[idx + 2..])),
            None => (inner, None),
        };

        if store.has(key) {
            let value = store.get(key);
            out.push_str(&resolve_depth(store, &value, depth + 1)?);
        } else if let Some(default) = default {
            out.push_str(default);
        } else {
            return Err(WeaveError::bind_leaf(format!(
                "resolve \"{key}\": not exist"
            )));
        }
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tokens_resolves_to_itself() {
        let store = PropertyStore::new();
        assert_eq!(resolve(&store, "plain string").unwrap(), "plain string");
    }

    #[test]
    fn substitutes_existing_key() {
        let mut store = PropertyStore::new();
        store.set("name", "weave").unwrap();
        assert_eq!(
            resolve(&store, "hello ${name}!").unwrap(),
            "hello weave!"
        );
    }

    #[test]
    fn falls_back_to_default_when_missing() {
        let store = PropertyStore::new();
        assert_eq!(resolve(&store, "${missing:=fallback}").unwrap(), "fallback");
    }

    #[test]
    fn missing_with_no_default_fails() {
        let store = PropertyStore::new();
        assert!(resolve(&store, "${missing}").is_err());
    }

    #[test]
    fn recursively_resolves_substituted_value() {
        let mut store = PropertyStore::new();
        store.set("inner", "value").unwrap();
        store.set("outer", "${inner}").unwrap();
        assert_eq!(resolve(&store, "${outer}").unwrap(), "value");
    }

    #[test]
    fn bounds_recursive_expansion_cycles() {
        let mut store = PropertyStore::new();
        store.set("a", "${b}").unwrap();
        store.set("b", "${a}").unwrap();
        assert!(resolve(&store, "${a}").is_err());
    }
}
