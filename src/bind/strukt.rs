//! Helpers for hand-written `Bindable` (`BindKind::Struct`) implementations.
//!
//! There is no derive in the dependency stack to generate these, so a
//! struct's `Bindable::bind` is written by hand, one field at a time, using
//! [`field`] to bind-and-wrap each field's error under the struct's own
//! field path. An anonymous/embedded field inherits the struct's own key
//! prefix instead of appending a segment; use [`embedded`] for those.

use crate::error::WeaveError;
use crate::properties::{PropertyStore, Tag};

use super::{BindParam, Bindable};

/// Struct-kind types never accept a literal default; call this first in a
/// hand-written `bind` impl.
pub fn reject_default(param: &BindParam) -> Result<(), WeaveError> {
    if let Some(default) = &param.tag.default {
        if !default.is_empty() {
            return Err(WeaveError::bind_leaf(
                "struct fields cannot take a non-empty literal default",
            ));
        }
    }
    Ok(())
}

/// Bind one named field of `type_name`, appending `field_name` both to the
/// property key (`prefix.field_name`, unless the field declares its own
/// absolute tag) and to the error-reporting field path.
pub fn field<T: Bindable>(
    store: &PropertyStore,
    param: &BindParam,
    type_name: &str,
    field_name: &str,
    tag: &str,
) -> Result<T, WeaveError> {
    let mut child = resolve_field_tag(param, tag)?;
    child.field_path = format!("{type_name}.{field_name}");
    T::bind(store, &child).map_err(|e| WeaveError::bind_field(format!("{type_name}.{field_name}"), e))
}

/// Like [`field`], but also runs `expr` as a validator against the field's
/// raw property string before the value is converted. Only meaningful for
/// scalar-kind fields, where "the field's current value" is the raw text.
pub fn validated_field<T: Bindable>(
    store: &PropertyStore,
    param: &BindParam,
    type_name: &str,
    field_name: &str,
    tag: &str,
    expr: &str,
) -> Result<T, WeaveError> {
    let child = resolve_field_tag(param, tag)?;
    let raw = if store.has(&child.tag.key) {
        store.get(&child.tag.key)
    } else {
        child.tag.default.clone().unwrap_or_default()
    };
    super::validate::validate(expr, &raw)
        .map_err(|e| WeaveError::bind_field(format!("{type_name}.{field_name}"), e))?;
    field(store, param, type_name, field_name, tag)
}

/// Bind an embedded/anonymous field: its own fields live directly under the
/// parent's key prefix rather than one level deeper.
pub fn embedded<T: Bindable>(store: &PropertyStore, param: &BindParam) -> Result<T, WeaveError> {
    T::bind(store, param)
}

fn resolve_field_tag(parent: &BindParam, tag: &str) -> Result<BindParam, WeaveError> {
    let parsed = Tag::parse(tag)?;
    let key = if parent.tag.key.is_empty() {
        parsed.key
    } else if parsed.key.is_empty() {
        parent.tag.key.clone()
    } else {
        format!("{}.{}", parent.tag.key, parsed.key)
    };
    Ok(BindParam {
        tag: Tag {
            key,
            default: parsed.default,
            splitter: parsed.splitter,
        },
        field_path: parent.field_path.clone(),
        validator: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::BindKind;

    #[derive(Debug, PartialEq)]
    struct Nested {
        int: i64,
    }

    impl Bindable for Nested {
        const KIND: BindKind = BindKind::Struct;

        fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError> {
            reject_default(param)?;
            Ok(Nested {
                int: field(store, param, "Nested", "int", "${int}")?,
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct Outer {
        nested: Nested,
    }

    impl Bindable for Outer {
        const KIND: BindKind = BindKind::Struct;

        fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError> {
            reject_default(param)?;
            Ok(Outer {
                nested: field(store, param, "Outer", "nested", "${nested}")?,
            })
        }
    }

    #[test]
    fn binds_nested_struct() {
        let mut store = PropertyStore::new();
        store.set("root.nested.int", "42").unwrap();
        let param = BindParam::new(
            Tag {
                key: "root".to_string(),
                default: None,
                splitter: None,
            },
            "Outer",
        );
        let outer = Outer::bind(&store, &param).unwrap();
        assert_eq!(outer, Outer { nested: Nested { int: 42 } });
    }

    #[test]
    fn validated_field_rejects_failing_predicate() {
        let mut store = PropertyStore::new();
        store.set("root.int", "1").unwrap();
        let param = BindParam::new(
            Tag {
                key: "root".to_string(),
                default: None,
                splitter: None,
            },
            "Nested",
        );
        let err = validated_field::<i64>(&store, &param, "Nested", "int", "${int}", "$>=3")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "bind Nested.int error: validate failed on \"$>=3\" for value 1"
        );
    }

    #[test]
    fn missing_field_error_composes_hierarchically() {
        let store = PropertyStore::new();
        let param = BindParam::new(
            Tag {
                key: "root".to_string(),
                default: None,
                splitter: None,
            },
            "Outer",
        );
        let err = Outer::bind(&store, &param).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bind Outer.nested error: bind Nested.int error: property \"root.nested.int\": not exist"
        );
    }
}
