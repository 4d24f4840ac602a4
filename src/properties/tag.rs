//! Parser for the `${KEY:=DEFAULT}||SPLITTER` binding tag grammar.
//!
//! Grammar (spec): `^\$\{([^:}]*)(:=([^}]*))?\}(\|\|(.*))?$`. Any deviation
//! is a syntax error. `serialize` is the exact inverse of `parse` — the
//! round-trip law this crate is tested against.

use crate::error::WeaveError;

/// A parsed bind tag: the property key to read, an optional literal
/// default, and an optional named splitter function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    pub key: String,
    pub default: Option<String>,
    pub splitter: Option<String>,
}

impl Tag {
    /// Parse a tag string. Bare `${KEY}` is valid; a string with no
    /// `${...}` wrapper at all is invalid syntax.
    pub fn parse(s: &str) -> Result<Tag, WeaveError> {
        let rest = s
            .strip_prefix("${")
            .ok_or_else(|| WeaveError::syntax("invalid syntax"))?;

        let close = rest
            .find('}')
            .ok_or_else(|| WeaveError::syntax("invalid syntax"))?;
        let inner = &rest[..close];
        let after = &rest[close + 1..];

        let (key, default) = match inner.find(':') {
            None => (inner, None),
            Some(idx) => {
                if inner.as_bytes().get(idx + 1) != Some(&b'=') {
                    return Err(WeaveError::syntax("invalid syntax"));
                }
                (&inner[..idx], Some(inner[idx + 2..].to_string()))
            }
        };

        let splitter = if after.is_empty() {
            None
        } else if let Some(rest) = after.strip_prefix("||") {
            Some(rest.to_string())
        } else {
            return Err(WeaveError::syntax("invalid syntax"));
        };

        Ok(Tag {
            key: key.to_string(),
            default,
            splitter,
        })
    }

    /// Re-serialize into the exact original grammar. `parse(t.serialize())
    /// == t` and `Tag::parse(s).serialize() == s` for every valid `s`.
    pub fn serialize(&self) -> String {
        let mut out = String::from("${");
        out.push_str(&self.key);
        if let Some(default) = &self.default {
            out.push_str(":=");
            out.push_str(default);
        }
        out.push('}');
        if let Some(splitter) = &self.splitter {
            out.push_str("||");
            out.push_str(splitter);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_key() {
        let tag = Tag::parse("${uint}").unwrap();
        assert_eq!(tag.key, "uint");
        assert_eq!(tag.default, None);
        assert_eq!(tag.splitter, None);
    }

    #[test]
    fn parses_key_with_default() {
        let tag = Tag::parse("${uint:=3}").unwrap();
        assert_eq!(tag.key, "uint");
        assert_eq!(tag.default.as_deref(), Some("3"));
    }

    #[test]
    fn parses_empty_default() {
        let tag = Tag::parse("${key:=}").unwrap();
        assert_eq!(tag.default.as_deref(), Some(""));
    }

    #[test]
    fn parses_root_binding_with_empty_key() {
        let tag = Tag::parse("${}").unwrap();
        assert_eq!(tag.key, "");
    }

    #[test]
    fn parses_splitter_after_closing_brace() {
        let tag = Tag::parse("${uints:=1,2,3}||pipe").unwrap();
        assert_eq!(tag.key, "uints");
        assert_eq!(tag.default.as_deref(), Some("1,2,3"));
        assert_eq!(tag.splitter.as_deref(), Some("pipe"));
    }

    #[test]
    fn rejects_bare_string_without_braces() {
        assert!(Tag::parse("uint").is_err());
    }

    #[test]
    fn rejects_stray_colon_without_equals() {
        assert!(Tag::parse("${a:b}").is_err());
    }

    #[test]
    fn rejects_malformed_splitter_marker() {
        assert!(Tag::parse("${key}|single").is_err());
    }

    proptest::proptest! {
        #[test]
        fn round_trip(key in "[A-Za-z0-9_.\\[\\]-]{0,12}", default in proptest::option::of("[A-Za-z0-9,_-]{0,12}"), splitter in proptest::option::of("[A-Za-z_]{0,8}")) {
            let tag = Tag { key, default, splitter };
            let serialized = tag.serialize();
            let reparsed = Tag::parse(&serialized).unwrap();
            proptest::prop_assert_eq!(reparsed.serialize(), serialized);
            proptest::prop_assert_eq!(reparsed, tag);
        }
    }
}
