//! Reflective binding: filling typed values out of a [`PropertyStore`] using
//! bind tags (`properties::tag`), plus the per-field validator (`validate`).
//!
//! Rust has no runtime reflection, so the "dispatch by kind" design this
//! binder follows is expressed as a trait with an associated [`BindKind`]
//! rather than a type switch over a reflected shape. Built-in scalar,
//! sequence and mapping kinds are provided; struct kinds are implemented by
//! hand per type (see `bind::strukt` for the shared helpers) since there is
//! no derive in the dependency stack to generate them.

pub mod collection;
pub mod convert;
pub mod scalar;
pub mod strukt;
pub mod validate;

use crate::error::WeaveError;
use crate::properties::{PropertyStore, Tag};

/// Which binding strategy a type uses. Mirrors the reflected-kind switch of
/// the runtime this design is modeled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindKind {
    /// A single leaf value converted from one property string.
    Scalar,
    /// A `Vec`-shaped target: either a comma/splitter-joined leaf, or
    /// `key[0]`, `key[1]`, ... indexed sub-keys.
    Sequence,
    /// A `Map`-shaped target, grouped by the first remaining path segment
    /// under the target's key prefix.
    Mapping,
    /// A user type with its own named fields, each bound independently.
    Struct,
}

/// One field's binding instructions: the parsed tag (key/default/splitter)
/// and the dotted path used to compose hierarchical error messages.
#[derive(Debug, Clone)]
pub struct BindParam {
    pub tag: Tag,
    pub field_path: String,
    pub validator: Option<String>,
}

impl BindParam {
    pub fn new(tag: Tag, field_path: impl Into<String>) -> Self {
        Self {
            tag,
            field_path: field_path.into(),
            validator: None,
        }
    }

    /// Parse a raw `${key:=default}||splitter` tag string for `field_path`.
    pub fn parse(tag_str: &str, field_path: impl Into<String>) -> Result<Self, WeaveError> {
        Ok(Self::new(Tag::parse(tag_str)?, field_path))
    }

    pub fn with_validator(mut self, expr: impl Into<String>) -> Self {
        self.validator = Some(expr.into());
        self
    }

    /// Derive the param for a nested field or element: `key_suffix` extends
    /// the property path (e.g. `.name` or `[2]`), `field_suffix` extends the
    /// human-readable path used in error messages.
    pub fn child(&self, key_suffix: &str, field_suffix: &str) -> BindParam {
        let key = format!("{}{}", self.tag.key, key_suffix);
        BindParam {
            tag: Tag {
                key,
                default: None,
                splitter: None,
            },
            field_path: format!("{}.{}", self.field_path, field_suffix),
            validator: None,
        }
    }
}

/// A type that can be produced from a property subtree given a [`BindParam`].
pub trait Bindable: Sized {
    const KIND: BindKind;

    fn bind(store: &PropertyStore, param: &BindParam) -> Result<Self, WeaveError>;

    /// Struct-kind elements can't receive a literal scalar default (a list
    /// of struct values has no sensible comma-joined textual form).
    fn is_complex() -> bool {
        matches!(Self::KIND, BindKind::Struct)
    }
}

/// Bind `param`, then run its validator expression (if any) against the
/// value's string representation.
pub fn bind_and_validate<T: Bindable + ToString>(
    store: &PropertyStore,
    param: &BindParam,
) -> Result<T, WeaveError> {
    let value = T::bind(store, param)?;
    if let Some(expr) = &param.validator {
        validate::validate(expr, &value.to_string())?;
    }
    Ok(value)
}
