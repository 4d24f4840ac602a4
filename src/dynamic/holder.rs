//! A single refreshable value: the current bound value behind a lock-free
//! publication cell, plus a list of callbacks run after every successful
//! re-bind.
//!
//! Readers take a cheap `Arc` clone with no lock at all; a refresh only
//! does the (re)binding work and then an atomic pointer swap to publish the
//! result, never blocking a concurrent reader.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::RwLock;

use crate::bind::{self, BindParam, Bindable};
use crate::error::WeaveError;
use crate::properties::PropertyStore;

type RefreshHook<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Holds the current value of one bound field, and rebinds it in place when
/// the backing property store changes. A `validator` on `param` (set via
/// `BindParam::with_validator`) is checked on every bind, including the
/// initial one: a value that fails validation never gets published.
pub struct Holder<T: Bindable + ToString + Send + Sync + 'static> {
    param: BindParam,
    value: ArcSwap<T>,
    hooks: RwLock<Vec<RefreshHook<T>>>,
}

impl<T: Bindable + ToString + Send + Sync + 'static> Holder<T> {
    pub fn new(store: &PropertyStore, param: BindParam) -> Result<Self, WeaveError> {
        let initial = bind::bind_and_validate(store, &param)?;
        Ok(Self {
            param,
            value: ArcSwap::from_pointee(initial),
            hooks: RwLock::new(Vec::new()),
        })
    }

    /// A cheap snapshot of the current value.
    pub fn value(&self) -> Arc<T> {
        self.value.load_full()
    }

    /// Re-bind from `store`. On success the new value is published and
    /// every registered hook runs against it; on failure (including a
    /// rejected validator) the previous value is left untouched and no hook
    /// runs.
    pub fn refresh(&self, store: &PropertyStore) -> Result<(), WeaveError> {
        let next = bind::bind_and_validate(store, &self.param).map_err(|e| {
            WeaveError::bind_field(self.param.field_path.clone(), e)
        })?;
        let next = Arc::new(next);
        self.value.store(next.clone());
        for hook in self.hooks.read().iter() {
            hook(&next);
        }
        Ok(())
    }

    /// Register a callback run after every successful `refresh`.
    pub fn on_refresh(&self, hook: impl Fn(&T) + Send + Sync + 'static) {
        self.hooks.write().push(Box::new(hook));
    }

    pub fn key(&self) -> &str {
        &self.param.tag.key
    }
}
