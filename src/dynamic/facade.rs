//! The refreshable-value facade sitting in front of a mutable property
//! store: bind holders against it, then push edits through `set`/`remove`,
//! fanning each edit out to every holder's `refresh`.
//!
//! A refresh failure on one holder does not block the others: every holder
//! is given a chance to refresh, the store edit is kept regardless, and the
//! first failure (if any) is what the caller sees. This is the "aggregate
//! error, partial update accepted" policy.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::bind::{BindParam, Bindable};
use crate::error::WeaveError;
use crate::properties::PropertyStore;

use super::holder::Holder;

trait AnyHolder: Send + Sync {
    fn refresh_dyn(&self, store: &PropertyStore) -> Result<(), WeaveError>;
    fn key(&self) -> &str;
}

impl<T: Bindable + ToString + Send + Sync + 'static> AnyHolder for Holder<T> {
    fn refresh_dyn(&self, store: &PropertyStore) -> Result<(), WeaveError> {
        self.refresh(store)
    }

    fn key(&self) -> &str {
        self.key()
    }
}

/// Owns a property store and every holder bound against it.
pub struct Refreshable {
    store: RwLock<PropertyStore>,
    holders: RwLock<Vec<Arc<dyn AnyHolder>>>,
}

impl Refreshable {
    pub fn new(store: PropertyStore) -> Self {
        Self {
            store: RwLock::new(store),
            holders: RwLock::new(Vec::new()),
        }
    }

    /// Bind a new holder against the current store and register it for
    /// future refreshes. `validator`, if given, is checked on the initial
    /// bind and every refresh; a value that fails it is rejected the same
    /// way a bind error is.
    pub fn bind_value<T: Bindable + ToString + Send + Sync + 'static>(
        &self,
        tag: &str,
        field_path: &str,
        validator: Option<&str>,
    ) -> Result<Arc<Holder<T>>, WeaveError> {
        let mut param = BindParam::parse(tag, field_path)?;
        if let Some(expr) = validator {
            param = param.with_validator(expr);
        }
        let holder = Arc::new(Holder::new(&self.store.read(), param)?);
        self.holders.write().push(holder.clone());
        Ok(holder)
    }

    /// Register an already-built holder (used by the container when it owns
    /// the `BindParam` itself).
    pub fn register_holder<T: Bindable + ToString + Send + Sync + 'static>(
        &self,
        holder: Arc<Holder<T>>,
    ) {
        self.holders.write().push(holder);
    }

    pub fn get(&self, key: &str) -> String {
        self.store.read().get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.read().has(key)
    }

    /// Write `key = value` into the store, then refresh every holder.
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), WeaveError> {
        self.store.write().set(key, value)?;
        self.refresh()
    }

    /// Remove `key` from the store, then refresh every holder.
    pub fn remove(&self, key: &str) -> Result<(), WeaveError> {
        self.store.write().remove(key)?;
        self.refresh()
    }

    /// Swap in a whole new store (e.g. after re-ingesting configuration
    /// sources) and refresh every holder against it.
    pub fn replace_store(&self, store: PropertyStore) -> Result<(), WeaveError> {
        *self.store.write() = store;
        self.refresh()
    }

    /// Re-bind every registered holder. Every holder gets a chance to
    /// refresh even if an earlier one fails; the first failure, if any, is
    /// returned once all have run.
    pub fn refresh(&self) -> Result<(), WeaveError> {
        let snapshot = self.store.read().copy();
        let mut first_error = None;
        for holder in self.holders.read().iter() {
            if let Err(e) = holder.refresh_dyn(&snapshot) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
