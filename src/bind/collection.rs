//! Sequence (`Vec<T>`) and mapping (`HashMap<String, T>`) binding.
//!
//! A sequence target reads either a single leaf split by its tag's
//! splitter, or a run of `key[0]`, `key[1]`, ... indexed sub-keys, stopping
//! at the first missing index. A mapping target groups the keys under its
//! prefix by their next path segment; for struct-kind element types that
//! segment is the whole remaining sub-path, for scalar-kind elements it's
//! bound directly as a leaf.

use std::collections::{BTreeSet, HashMap};

use crate::error::WeaveError;
use crate::properties::{PropertyStore, Tag};

use super::convert::split_value;
use super::{BindKind, BindParam, Bindable};

fn bind_from_parts<T: Bindable>(parts: &[String], field_path: &str) -> Result<Vec<T>, WeaveError> {
    let mut out = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let mut scratch = PropertyStore::new();
        scratch.set("v", part.clone())?;
        let elem_param = BindParam::new(
            Tag {
                key: "v".to_string(),
                default: None,
                splitter: None,
            },
            format!("{field_path}[{i}]"),
        );
        let value = T::bind(&scratch, &elem_param)
            .map_err(|e| WeaveError::bind_field(format!("{field_path}[{i}]"), e))?;
        out.push(value);
    }
    Ok(out)
}

impl<T: Bindable> Bindable for Vec<T> {
    const KIND: BindKind = BindKind::Sequence;

    fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError> {
        let key = &param.tag.key;

        // A leaf at exactly `key` means a single delimited string, not an
        // indexed sequence.
        if store.keys().binary_search(key).is_ok() {
            let raw = store.get(key);
            if raw.is_empty() {
                return Ok(Vec::new());
            }
            let parts = split_value(&raw, param.tag.splitter.as_deref())?;
            return bind_from_parts(&parts, &param.field_path);
        }

        let mut out = Vec::new();
        let mut i = 0;
        loop {
            let idx_key = format!("{key}[{i}]");
            if !store.has(&idx_key) {
                break;
            }
            let elem_param = BindParam::new(
                Tag {
                    key: idx_key.clone(),
                    default: None,
                    splitter: None,
                },
                format!("{}[{}]", param.field_path, i),
            );
            let value = T::bind(store, &elem_param)
                .map_err(|e| WeaveError::bind_field(format!("{}[{}]", param.field_path, i), e))?;
            out.push(value);
            i += 1;
        }

        if out.is_empty() && !store.has(key) {
            if let Some(default) = &param.tag.default {
                if default.is_empty() {
                    return Ok(Vec::new());
                }
                if T::is_complex() {
                    return Err(WeaveError::bind_leaf(
                        "slices of struct-kind elements cannot take a literal default",
                    ));
                }
                let parts = split_value(default, param.tag.splitter.as_deref())?;
                return bind_from_parts(&parts, &param.field_path);
            }
            return Err(WeaveError::bind_leaf(format!(
                "property \"{key}\": not exist"
            )));
        }

        Ok(out)
    }
}

impl<T: Bindable> Bindable for HashMap<String, T> {
    const KIND: BindKind = BindKind::Mapping;

    fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError> {
        if let Some(default) = &param.tag.default {
            if !default.is_empty() {
                return Err(WeaveError::bind_leaf(
                    "map fields cannot take a non-empty literal default",
                ));
            }
        }

        let prefix = &param.tag.key;
        let dotted_prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}.")
        };

        let mut out = HashMap::new();
        if T::is_complex() {
            let mut groups = BTreeSet::new();
            for k in store.keys() {
                if let Some(remainder) = k.strip_prefix(&dotted_prefix) {
                    if remainder.is_empty() {
                        continue;
                    }
                    let first = remainder.split(['.', '[']).next().unwrap_or(remainder);
                    if !first.is_empty() {
                        groups.insert(first.to_string());
                    }
                }
            }
            for group in groups {
                let child_key = format!("{dotted_prefix}{group}");
                let child_param = BindParam::new(
                    Tag {
                        key: child_key,
                        default: None,
                        splitter: None,
                    },
                    format!("{}.{}", param.field_path, group),
                );
                let value = T::bind(store, &child_param)
                    .map_err(|e| WeaveError::bind_field(format!("{}.{}", param.field_path, group), e))?;
                out.insert(group, value);
            }
        } else {
            for k in store.keys() {
                if let Some(remainder) = k.strip_prefix(&dotted_prefix) {
                    if remainder.is_empty() {
                        continue;
                    }
                    let leaf_param = BindParam::new(
                        Tag {
                            key: k.clone(),
                            default: None,
                            splitter: None,
                        },
                        format!("{}.{}", param.field_path, remainder),
                    );
                    let value = T::bind(store, &leaf_param)?;
                    out.insert(remainder.to_string(), value);
                }
            }
        }
        Ok(out)
    }
}
