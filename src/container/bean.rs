//! Bean definitions: what the container knows about a registered type
//! before it tries to build one.
//!
//! Grounded on the `TypeId`-keyed bean registry pattern (beans identified
//! by type, construction deferred behind a boxed factory closure, resolved
//! once into a read-only context), generalized with an optional name
//! (`Selector::ByName`) and registration-ordered conditions.

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use crate::error::WeaveError;

use super::condition::Condition;
use super::core::BeanView;

/// How a dependency or a lookup picks a target bean.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    ByType(TypeId, &'static str),
    ByName(String),
}

impl Selector {
    pub fn of<T: 'static>() -> Selector {
        Selector::ByType(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    pub fn named(name: impl Into<String>) -> Selector {
        Selector::ByName(name.into())
    }
}

/// Where a bean sits in its own lifecycle this refresh: a condition pass
/// first resolves whether it's active at all (`Resolving` until it settles
/// into `Deleted` or `Resolved`), then the wiring pass builds every active
/// bean (`Creating` while its constructor and eager dependencies run,
/// `Created` once the value exists, `Wired` once its init hook has run).
/// A bean found `Creating` again while its own dependency chain is still
/// being walked means a genuine cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeanStatus {
    Default,
    Resolving,
    Deleted,
    Resolved,
    Creating,
    Created,
    Wired,
}

pub type Constructor =
    Box<dyn Fn(&BeanView) -> Result<Arc<dyn Any + Send + Sync>, WeaveError> + Send + Sync>;
pub type InitHook = Box<dyn Fn(&(dyn Any + Send + Sync)) -> Result<(), WeaveError> + Send + Sync>;
pub type DestroyHook =
    Box<dyn Fn(&(dyn Any + Send + Sync)) -> Result<(), WeaveError> + Send + Sync>;

/// A trait a bean exports: an upcast from the stored `Arc<dyn Any>` (the
/// bean's own concrete type) to an `Arc<dyn Any>` wrapping `Arc<dyn Trait>`,
/// built once at registration time when the concrete type is still known.
/// `Any::downcast` only ever recovers the exact type that was stored, so the
/// trick is storing the *sized* `Arc<dyn Trait + Send + Sync>` value itself
/// as the payload of a fresh outer `Arc<dyn Any>`, then downcasting that
/// outer `Any` back to the literal type `Arc<dyn Trait + Send + Sync>` at
/// lookup time.
pub struct ExportSlot {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub(super) upcast: Box<dyn Fn(Arc<dyn Any + Send + Sync>) -> Arc<dyn Any + Send + Sync> + Send + Sync>,
}

/// A handle to a dependency resolved lazily: filled once, in a post-pass
/// after every eagerly-wired bean this refresh has been constructed. Lets
/// two beans hold a handle to each other without either depending on the
/// other in the eager wiring graph (see `BeanView::get_lazy`).
pub struct LazyBean<T: ?Sized> {
    cell: Arc<OnceLock<Arc<T>>>,
}

impl<T: ?Sized> Clone for LazyBean<T> {
    fn clone(&self) -> Self {
        Self { cell: self.cell.clone() }
    }
}

impl<T: Send + Sync + 'static> LazyBean<T> {
    pub(super) fn new(cell: Arc<OnceLock<Arc<T>>>) -> Self {
        Self { cell }
    }

    /// The resolved dependency. Panics if called before the container has
    /// finished this refresh's lazy-fill pass; every lazy field is filled
    /// before any runner or caller can observe a freshly-wired container, so
    /// this never fires in practice once `refresh` has returned `Ok`.
    pub fn get(&self) -> Arc<T> {
        self.cell
            .get()
            .expect("lazy bean accessed before the container's lazy-fill pass ran")
            .clone()
    }
}

/// Type-erased collaborator the container's lazy-fill pass drives once
/// every eager bean is wired: resolve the recorded selector against the
/// final instance map and publish it into the waiting `LazyBean` cell.
pub(super) trait LazyFill: Send + Sync {
    fn fill(
        &self,
        defs: &[BeanDefinition],
        active: &std::collections::HashSet<usize>,
        instances: &std::collections::HashMap<usize, Arc<dyn Any + Send + Sync>>,
    ) -> Result<(), WeaveError>;
}

pub(super) struct LazyFillImpl<T> {
    pub selector: Selector,
    pub cell: Arc<OnceLock<Arc<T>>>,
}

impl<T: Send + Sync + 'static> LazyFill for LazyFillImpl<T> {
    fn fill(
        &self,
        defs: &[BeanDefinition],
        active: &std::collections::HashSet<usize>,
        instances: &std::collections::HashMap<usize, Arc<dyn Any + Send + Sync>>,
    ) -> Result<(), WeaveError> {
        let idx = super::core::resolve_single(&self.selector, defs, active)?;
        let any = instances.get(&idx).ok_or_else(|| {
            WeaveError::resolution(format!(
                "bean {} requested before it was constructed",
                defs[idx].describe()
            ))
        })?;
        let value = any
            .clone()
            .downcast::<T>()
            .map_err(|_| WeaveError::resolution("bean type mismatch at lookup"))?;
        let _ = self.cell.set(value);
        Ok(())
    }
}

/// One registered bean: its identity, its declared dependencies, the
/// condition gating whether it's active this refresh, and the closures that
/// build/init/destroy it.
pub struct BeanDefinition {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub name: Option<String>,
    pub primary: bool,
    pub order: f64,
    pub depends_on: Vec<Selector>,
    pub exports: Vec<ExportSlot>,
    pub condition: Option<Condition>,
    pub constructor: Constructor,
    pub init: Option<InitHook>,
    pub destroy: Option<DestroyHook>,
}

impl BeanDefinition {
    pub fn selector(&self) -> Selector {
        match &self.name {
            Some(name) => Selector::ByName(name.clone()),
            None => Selector::ByType(self.type_id, self.type_name),
        }
    }

    pub fn describe(&self) -> String {
        match &self.name {
            Some(name) => format!("{}:{}", self.type_name, name),
            None => self.type_name.to_string(),
        }
    }
}

/// Fluent construction of a [`BeanDefinition`] for type `T`.
pub struct BeanBuilder<T> {
    name: Option<String>,
    primary: bool,
    order: f64,
    depends_on: Vec<Selector>,
    exports: Vec<ExportSlot>,
    condition: Option<Condition>,
    constructor: Box<dyn Fn(&BeanView) -> Result<T, WeaveError> + Send + Sync>,
    init: Option<Box<dyn Fn(&T) -> Result<(), WeaveError> + Send + Sync>>,
    destroy: Option<Box<dyn Fn(&T) -> Result<(), WeaveError> + Send + Sync>>,
}

impl<T: Send + Sync + 'static> BeanBuilder<T> {
    pub fn new(constructor: impl Fn(&BeanView) -> Result<T, WeaveError> + Send + Sync + 'static) -> Self {
        Self {
            name: None,
            primary: false,
            order: 0.0,
            depends_on: Vec::new(),
            exports: Vec::new(),
            condition: None,
            constructor: Box::new(constructor),
            init: None,
            destroy: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Ascending sort key used when a `Vec`/`Map` field collects every
    /// active bean of this type (see `container::wiring::collect_ordered`).
    pub fn order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    pub fn depends_on(mut self, selector: Selector) -> Self {
        self.depends_on.push(selector);
        self
    }

    /// Export trait `I` for this bean: `upcast` coerces the bean's own
    /// `Arc<T>` to `Arc<I>` (ordinary unsized coercion, since `T: I` is
    /// exactly what the caller is asserting by registering the export).
    pub fn exports<I: ?Sized + Send + Sync + 'static>(
        mut self,
        upcast: fn(Arc<T>) -> Arc<I>,
    ) -> Self {
        self.exports.push(ExportSlot {
            type_id: TypeId::of::<I>(),
            type_name: std::any::type_name::<I>(),
            upcast: Box::new(move |any: Arc<dyn Any + Send + Sync>| {
                let concrete = any
                    .downcast::<T>()
                    .expect("exports upcast type matches constructor type");
                let trait_object: Arc<I> = upcast(concrete);
                Arc::new(trait_object) as Arc<dyn Any + Send + Sync>
            }),
        });
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn on_init(mut self, hook: impl Fn(&T) -> Result<(), WeaveError> + Send + Sync + 'static) -> Self {
        self.init = Some(Box::new(hook));
        self
    }

    pub fn on_destroy(
        mut self,
        hook: impl Fn(&T) -> Result<(), WeaveError> + Send + Sync + 'static,
    ) -> Self {
        self.destroy = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> BeanDefinition {
        let constructor = self.constructor;
        let init = self.init;
        let destroy = self.destroy;
        BeanDefinition {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: self.name,
            primary: self.primary,
            order: self.order,
            depends_on: self.depends_on,
            exports: self.exports,
            condition: self.condition,
            constructor: Box::new(move |ctx| {
                let value = constructor(ctx)?;
                Ok(Arc::new(value) as Arc<dyn Any + Send + Sync>)
            }),
            init: init.map(|hook| -> InitHook {
                Box::new(move |any| {
                    let value = any
                        .downcast_ref::<T>()
                        .expect("init hook type matches constructor type");
                    hook(value)
                })
            }),
            destroy: destroy.map(|hook| -> DestroyHook {
                Box::new(move |any| {
                    let value = any
                        .downcast_ref::<T>()
                        .expect("destroy hook type matches constructor type");
                    hook(value)
                })
            }),
        }
    }
}
