//! Imports process environment variables as properties: `GS_DB_URL` becomes
//! `db.url`. Prefixed variables are imported unconditionally; unprefixed
//! variables are also imported, but only when they pass an include/exclude
//! regex filter (default: include everything, exclude nothing).

use regex::Regex;

use crate::error::WeaveError;
use crate::properties::PropertyStore;

#[derive(Debug, Clone)]
pub struct EnvOptions {
    pub prefix: String,
    pub include: Vec<Regex>,
    pub exclude: Vec<Regex>,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            prefix: "GS_".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl EnvOptions {
    /// Build options from `INCLUDE_ENV_PATTERNS`/`EXCLUDE_ENV_PATTERNS`, each
    /// a comma-separated list of regexes, read from the real process
    /// environment.
    pub fn from_process_env(prefix: impl Into<String>) -> Result<Self, WeaveError> {
        Ok(Self {
            prefix: prefix.into(),
            include: parse_pattern_list(&std::env::var("INCLUDE_ENV_PATTERNS").unwrap_or_default())?,
            exclude: parse_pattern_list(&std::env::var("EXCLUDE_ENV_PATTERNS").unwrap_or_default())?,
        })
    }
}

fn parse_pattern_list(raw: &str) -> Result<Vec<Regex>, WeaveError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pattern| {
            Regex::new(pattern)
                .map_err(|e| WeaveError::syntax(format!("bad env pattern \"{pattern}\": {e}")))
        })
        .collect()
}

fn env_key_to_property(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', ".")
}

fn admitted(name: &str, opts: &EnvOptions) -> bool {
    if !opts.include.is_empty() && !opts.include.iter().any(|re| re.is_match(name)) {
        return false;
    }
    if opts.exclude.iter().any(|re| re.is_match(name)) {
        return false;
    }
    true
}

/// Import every `vars`-supplied `(name, value)` pair: names starting with
/// `opts.prefix` are imported unconditionally (prefix stripped before
/// dotting); any other name is imported too, using its full name, but only
/// if it passes the include/exclude filters.
pub fn import_from<'a>(
    store: &mut PropertyStore,
    vars: impl Iterator<Item = (&'a str, &'a str)>,
    opts: &EnvOptions,
) -> Result<(), WeaveError> {
    for (name, value) in vars {
        let key = match name.strip_prefix(&opts.prefix) {
            Some(rest) => env_key_to_property(rest),
            None => {
                if !admitted(name, opts) {
                    continue;
                }
                env_key_to_property(name)
            }
        };
        store.set(&key, value)?;
    }
    Ok(())
}

/// Import from the real process environment.
pub fn import_env(store: &mut PropertyStore, opts: &EnvOptions) -> Result<(), WeaveError> {
    let vars: Vec<(String, String)> = std::env::vars().collect();
    import_from(
        store,
        vars.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        opts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_var_becomes_dotted_property() {
        let mut store = PropertyStore::new();
        let opts = EnvOptions::default();
        import_from(&mut store, [("GS_DB_URL", "postgres://x")].into_iter(), &opts).unwrap();
        assert_eq!(store.get("db.url"), "postgres://x");
    }

    #[test]
    fn prefixed_var_ignores_exclude_filter() {
        let mut store = PropertyStore::new();
        let opts = EnvOptions {
            prefix: "GS_".to_string(),
            include: Vec::new(),
            exclude: vec![Regex::new("^GS_SECRET_").unwrap()],
        };
        import_from(&mut store, [("GS_SECRET_TOKEN", "shh")].into_iter(), &opts).unwrap();
        assert_eq!(store.get("secret.token"), "shh");
    }

    #[test]
    fn unprefixed_var_is_imported_by_default() {
        let mut store = PropertyStore::new();
        let opts = EnvOptions::default();
        import_from(&mut store, [("PATH", "/bin")].into_iter(), &opts).unwrap();
        assert_eq!(store.get("path"), "/bin");
    }

    #[test]
    fn unprefixed_var_honors_exclude() {
        let mut store = PropertyStore::new();
        let opts = EnvOptions {
            prefix: "GS_".to_string(),
            include: Vec::new(),
            exclude: vec![Regex::new("^HOME$").unwrap()],
        };
        import_from(
            &mut store,
            [("HOME", "/root"), ("PATH", "/bin")].into_iter(),
            &opts,
        )
        .unwrap();
        assert!(!store.has("home"));
        assert_eq!(store.get("path"), "/bin");
    }

    #[test]
    fn include_pattern_is_an_allowlist_for_unprefixed_vars() {
        let mut store = PropertyStore::new();
        let opts = EnvOptions {
            prefix: "GS_".to_string(),
            include: vec![Regex::new("^DB_").unwrap()],
            exclude: Vec::new(),
        };
        import_from(
            &mut store,
            [("DB_URL", "x"), ("CACHE_TTL", "5")].into_iter(),
            &opts,
        )
        .unwrap();
        assert!(store.has("db.url"));
        assert!(!store.has("cache.ttl"));
    }

    #[test]
    fn parses_comma_separated_pattern_list() {
        let patterns = parse_pattern_list("^DB_, ^CACHE_").unwrap();
        assert_eq!(patterns.len(), 2);
    }
}
