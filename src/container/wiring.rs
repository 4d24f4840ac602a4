//! Field-wiring helpers: the building blocks a [`Wireable`] impl uses to
//! pull a bean's fields straight out of its [`BeanView`] instead of
//! hand-writing a constructor closure. A struct's hand-written `Wireable`
//! impl plays the role spec.md's tag-driven reflection does in a language
//! that has it: one field per line, one helper call per tag kind.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bind::Bindable;
use crate::error::WeaveError;
use crate::logger::Logger;

use super::bean::LazyBean;
use super::core::BeanView;

/// A bean type built entirely from its own declared fields. An alternative
/// to hand-writing a hand-written `BeanBuilder::new` closure body for a bean
/// whose shape is "pull some fields out of the view and fill in the rest":
/// register it as `BeanBuilder::new(|view| MyType::wire(view))`.
pub trait Wireable: Sized {
    fn wire(view: &BeanView) -> Result<Self, WeaveError>;
}

/// A bean's `logger` field: a [`Logger`] tagged with the bean's own type
/// name, the way every hand-written bean in this crate already names its
/// static logger.
pub fn logger_field<T: 'static>() -> Logger {
    Logger::new(std::any::type_name::<T>())
}

/// A `value:"${...}"`-tagged field, bound straight from the property store
/// under `field_name` for error messages.
pub fn value_field<T: Bindable>(
    view: &BeanView,
    tag: &str,
    field_name: &str,
) -> Result<T, WeaveError> {
    view.bind(tag, field_name)
}

/// The bean-name half of a `TYPENAME:BEANNAME` selector tag; the type half
/// is implied by the field's own declared type at the call site, so only
/// the name (if any) needs parsing out here.
fn selector_name(tag: &str) -> Option<String> {
    let name = tag.rsplit(':').next().unwrap_or("").trim();
    if name.is_empty() || name == tag.trim() {
        None
    } else {
        Some(name.to_string())
    }
}

/// An `autowire:"TYPENAME:BEANNAME"`-tagged field: a required dependency,
/// resolved as the container wires this bean (the container already wired
/// it first, or refresh fails with a circular-dependency error).
pub fn autowire_field<T: Send + Sync + 'static>(
    view: &BeanView,
    tag: &str,
) -> Result<Arc<T>, WeaveError> {
    match selector_name(tag) {
        Some(name) => view.get_named::<T>(&name),
        None => view.get::<T>(),
    }
}

/// A nullable `autowire:"TYPENAME:BEANNAME?"`-tagged field: `None` instead
/// of a resolution error when no matching bean is active.
pub fn autowire_field_optional<T: Send + Sync + 'static>(
    view: &BeanView,
    tag: &str,
) -> Result<Option<Arc<T>>, WeaveError> {
    match autowire_field::<T>(view, tag.trim_end_matches('?')) {
        Ok(value) => Ok(Some(value)),
        Err(_) => Ok(None),
    }
}

/// An `autowire:"TYPENAME:BEANNAME,lazy"`-tagged field: resolved in the
/// container's post-wiring pass, once every eagerly-wired bean this refresh
/// has been constructed, so two beans can each hold a handle to the other
/// without either blocking the other's construction.
pub fn autowire_field_lazy<T: Send + Sync + 'static>(view: &BeanView, tag: &str) -> LazyBean<T> {
    let trimmed = tag.trim_end_matches(",lazy").trim_end_matches("lazy");
    let trimmed = trimmed.trim_end_matches(',');
    match selector_name(trimmed) {
        Some(name) => view.get_lazy_named::<T>(&name),
        None => view.get_lazy::<T>(),
    }
}

/// Every active bean of type `T` for a `Vec`-shaped collection field,
/// ascending by `order` when `names` is empty, or in the exact sequence
/// `names` gives (with a single `*` entry standing for every remaining
/// active bean of that type, unordered among themselves).
pub fn collect_ordered<T: Send + Sync + 'static>(
    view: &BeanView,
    names: &[&str],
) -> Result<Vec<Arc<T>>, WeaveError> {
    view.collect_ordered::<T>(names)
}

/// Every active bean of type `T` for a `Map`-shaped collection field, keyed
/// by its registered name.
pub fn collect_map<T: Send + Sync + 'static>(
    view: &BeanView,
) -> Result<HashMap<String, Arc<T>>, WeaveError> {
    view.collect_map::<T>()
}
