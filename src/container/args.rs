//! Binds a constructor or provider bean's arguments: property-tagged
//! leaves via the same bind-tag grammar and [`Bindable`] machinery field
//! binding uses, plus selector arguments, a typed-nil passthrough, and
//! variadic "option provider" collection, all invoked directly against a
//! single argument rather than a struct field.

use std::sync::Arc;

use crate::bind::{BindParam, Bindable};
use crate::error::WeaveError;
use crate::properties::PropertyStore;

use super::core::BeanView;

/// Bind one constructor argument named `arg_name` (used only for the
/// error-reporting path) from `tag` (`${key:=default}`) against `store`.
pub fn bind_arg<T: Bindable>(
    store: &PropertyStore,
    tag: &str,
    arg_name: &str,
) -> Result<T, WeaveError> {
    let param = BindParam::parse(tag, arg_name)?;
    T::bind(store, &param).map_err(|e| WeaveError::bind_field(arg_name.to_string(), e))
}

/// Resolve a `TYPENAME:BEANNAME` selector argument (the bean-name half is
/// optional) against the view's already-wired siblings, the same grammar an
/// `autowire` field tag uses.
pub fn selector_arg<T: Send + Sync + 'static>(
    view: &BeanView,
    selector: &str,
) -> Result<Arc<T>, WeaveError> {
    let name = selector.rsplit(':').next().unwrap_or("").trim();
    if name.is_empty() || name == selector.trim() {
        view.get::<T>()
    } else {
        view.get_named::<T>(name)
    }
}

/// A typed nil passed explicitly for an optional constructor argument (the
/// `Nil()` argument form): always resolves to `None` without touching the
/// container, so a provider function can tell "no bean supplied" apart from
/// "forgot to wire one".
pub fn nil_arg<T: Send + Sync + 'static>() -> Option<Arc<T>> {
    None
}

/// A variadic "option provider" argument: every active bean of type `T`,
/// ascending by `order`, for a constructor parameter that accepts zero or
/// more instances instead of exactly one.
pub fn option_args<T: Send + Sync + 'static>(view: &BeanView) -> Result<Vec<Arc<T>>, WeaveError> {
    view.collect_ordered::<T>(&[])
}
