//! The bean container: registration, conditional activation, dependency
//! resolution, ordered construction and reverse-order teardown.
//!
//! Construction is a recursive wiring pass: active beans are visited in
//! ascending registration order, and each visit first wires (recursively)
//! every bean it eagerly depends on before building itself. A bean visited
//! while it is still `Creating` means a genuine circular eager dependency.
//! A field that only needs a dependency lazily (`BeanView::get_lazy`) never
//! takes part in that recursion at all; it gets an empty handle immediately
//! and the container fills it in a final pass once every eager bean this
//! refresh has been constructed, which is how two beans can hold a handle
//! to each other without either blocking the other's construction.
//!
//! Bean identity everywhere below is the definition's position in
//! `definitions` — never a position in some filtered subset — so the same
//! index means the same bean during condition evaluation, wiring,
//! post-refresh lookup and teardown.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::bind::Bindable;
use crate::error::WeaveError;
use crate::properties::PropertyStore;

use super::args::bind_arg;
use super::bean::{BeanDefinition, BeanStatus, LazyBean, LazyFill, LazyFillImpl, Selector};
use super::condition::ConditionView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Empty,
    Ready,
    Closed,
}

/// The read-only view a bean's constructor sees: already-wired sibling
/// beans, a place to register lazy dependencies, and the property store for
/// its own argument binding.
pub struct BeanView<'a> {
    defs: &'a [BeanDefinition],
    active: &'a HashSet<usize>,
    instances: &'a RefCell<HashMap<usize, Arc<dyn Any + Send + Sync>>>,
    properties: &'a PropertyStore,
    lazy_fills: &'a RefCell<Vec<Box<dyn LazyFill>>>,
}

impl<'a> BeanView<'a> {
    pub fn properties(&self) -> &PropertyStore {
        self.properties
    }

    pub fn bind<T: Bindable>(&self, tag: &str, arg_name: &str) -> Result<T, WeaveError> {
        bind_arg(self.properties, tag, arg_name)
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, WeaveError> {
        self.get_selector(&Selector::of::<T>())
    }

    pub fn get_named<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, WeaveError> {
        self.get_selector(&Selector::named(name))
    }

    /// A handle to a dependency resolved in the post-wiring lazy-fill pass
    /// instead of eagerly: use this for a field tagged `,lazy`, typically to
    /// break a genuine cycle between two beans that each need a handle to
    /// the other.
    pub fn get_lazy<T: Send + Sync + 'static>(&self) -> LazyBean<T> {
        self.get_lazy_selector(Selector::of::<T>())
    }

    pub fn get_lazy_named<T: Send + Sync + 'static>(&self, name: &str) -> LazyBean<T> {
        self.get_lazy_selector(Selector::named(name))
    }

    fn get_lazy_selector<T: Send + Sync + 'static>(&self, selector: Selector) -> LazyBean<T> {
        let cell = Arc::new(OnceLock::new());
        self.lazy_fills
            .borrow_mut()
            .push(Box::new(LazyFillImpl { selector, cell: cell.clone() }));
        LazyBean::new(cell)
    }

    fn get_selector<T: Send + Sync + 'static>(&self, selector: &Selector) -> Result<Arc<T>, WeaveError> {
        let idx = resolve_single(selector, self.defs, self.active)?;
        self.get_index(idx)
    }

    fn get_index<T: Send + Sync + 'static>(&self, idx: usize) -> Result<Arc<T>, WeaveError> {
        let any = self
            .instances
            .borrow()
            .get(&idx)
            .cloned()
            .ok_or_else(|| {
                WeaveError::resolution(format!(
                    "bean {} requested before it was constructed",
                    self.defs[idx].describe()
                ))
            })?;
        any.downcast::<T>()
            .map_err(|_| WeaveError::resolution("bean type mismatch at lookup"))
    }

    /// Every active bean of type `T`, ascending by `order` (registration
    /// order breaks ties), for a `Vec`-shaped collection field with no
    /// explicit ordering tag.
    pub fn collect_ordered<T: Send + Sync + 'static>(
        &self,
        names: &[&str],
    ) -> Result<Vec<Arc<T>>, WeaveError> {
        let mut candidates: Vec<usize> = self
            .active
            .iter()
            .copied()
            .filter(|&i| self.defs[i].type_id == TypeId::of::<T>())
            .collect();
        candidates.sort_by(|&a, &b| {
            self.defs[a]
                .order
                .partial_cmp(&self.defs[b].order)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        if names.is_empty() {
            return candidates.into_iter().map(|idx| self.get_index(idx)).collect();
        }

        let mut used: HashSet<usize> = HashSet::new();
        let mut result = Vec::new();
        for &name in names {
            if name == "*" {
                for idx in candidates.iter().copied().filter(|i| !used.contains(i)) {
                    used.insert(idx);
                    result.push(self.get_index(idx)?);
                }
            } else {
                let idx = candidates
                    .iter()
                    .copied()
                    .find(|&i| self.defs[i].name.as_deref() == Some(name))
                    .ok_or_else(|| WeaveError::resolution(format!("no bean matches {name}")))?;
                used.insert(idx);
                result.push(self.get_index(idx)?);
            }
        }
        Ok(result)
    }

    /// Every active bean of type `T`, keyed by its registered name, for a
    /// `Map`-shaped collection field.
    pub fn collect_map<T: Send + Sync + 'static>(
        &self,
    ) -> Result<HashMap<String, Arc<T>>, WeaveError> {
        let mut out = HashMap::new();
        for &idx in self.active.iter().filter(|&&i| self.defs[i].type_id == TypeId::of::<T>()) {
            let key = self.defs[idx]
                .name
                .clone()
                .unwrap_or_else(|| self.defs[idx].type_name.to_string());
            out.insert(key, self.get_index(idx)?);
        }
        Ok(out)
    }
}

/// Resolve `selector` to exactly one active definition index, applying the
/// `primary` tie-break when more than one candidate matches.
pub(crate) fn resolve_single(
    selector: &Selector,
    defs: &[BeanDefinition],
    active: &HashSet<usize>,
) -> Result<usize, WeaveError> {
    let matches: Vec<usize> = active
        .iter()
        .copied()
        .filter(|&i| match selector {
            Selector::ByType(t, _) => defs[i].type_id == *t,
            Selector::ByName(n) => defs[i].name.as_deref() == Some(n.as_str()),
        })
        .collect();

    match matches.len() {
        0 => Err(WeaveError::resolution(format!(
            "no bean matches {}",
            describe_selector(selector)
        ))),
        1 => Ok(matches[0]),
        _ => {
            let primaries: Vec<usize> = matches.iter().copied().filter(|&i| defs[i].primary).collect();
            match primaries.len() {
                1 => Ok(primaries[0]),
                0 => Err(WeaveError::resolution(format!(
                    "ambiguous candidates for {}: mark exactly one primary",
                    describe_selector(selector)
                ))),
                _ => Err(WeaveError::resolution(format!(
                    "multiple primary candidates for {}",
                    describe_selector(selector)
                ))),
            }
        }
    }
}

fn describe_selector(selector: &Selector) -> String {
    match selector {
        Selector::ByType(_, name) => name.to_string(),
        Selector::ByName(name) => name.clone(),
    }
}

struct ActiveView<'a> {
    properties: &'a PropertyStore,
    profiles: &'a [String],
    seen: Vec<(TypeId, &'static str, Option<String>)>,
}

impl ConditionView for ActiveView<'_> {
    fn has_property(&self, key: &str) -> bool {
        self.properties.has(key)
    }

    fn property(&self, key: &str) -> Option<String> {
        self.properties.has(key).then(|| self.properties.get(key))
    }

    fn has_active_bean(&self, selector: &Selector) -> bool {
        self.seen.iter().any(|(t, _, n)| match selector {
            Selector::ByType(ty, _) => t == ty,
            Selector::ByName(name) => n.as_deref() == Some(name.as_str()),
        })
    }

    fn active_bean_count(&self, selector: &Selector) -> usize {
        self.seen
            .iter()
            .filter(|(t, _, n)| match selector {
                Selector::ByType(ty, _) => t == ty,
                Selector::ByName(name) => n.as_deref() == Some(name.as_str()),
            })
            .count()
    }

    fn active_profile(&self, name: &str) -> bool {
        self.profiles.iter().any(|p| p == name)
    }
}

/// Drives one refresh's wiring pass: recursive construction with real
/// per-bean status transitions, cycle detection, and a lazy-fill pass run
/// once every eager bean is wired. Lives only for the duration of one
/// `refresh` call; its final state is copied into the container's
/// published fields.
struct Wiring<'a> {
    defs: &'a [BeanDefinition],
    active: &'a HashSet<usize>,
    properties: &'a PropertyStore,
    status: RefCell<Vec<BeanStatus>>,
    instances: RefCell<HashMap<usize, Arc<dyn Any + Send + Sync>>>,
    order: RefCell<Vec<usize>>,
    stack: RefCell<Vec<String>>,
    lazy_fills: RefCell<Vec<Box<dyn LazyFill>>>,
}

impl<'a> Wiring<'a> {
    fn new(
        defs: &'a [BeanDefinition],
        active: &'a HashSet<usize>,
        properties: &'a PropertyStore,
        status: Vec<BeanStatus>,
    ) -> Self {
        Self {
            defs,
            active,
            properties,
            status: RefCell::new(status),
            instances: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
            stack: RefCell::new(Vec::new()),
            lazy_fills: RefCell::new(Vec::new()),
        }
    }

    fn wire_bean(&self, idx: usize) -> Result<(), WeaveError> {
        match self.status.borrow()[idx] {
            BeanStatus::Wired => return Ok(()),
            BeanStatus::Creating => {
                return Err(WeaveError::resolution("found circle autowire"));
            }
            _ => {}
        }
        self.status.borrow_mut()[idx] = BeanStatus::Creating;
        self.stack.borrow_mut().push(self.defs[idx].describe());
        let result = self.wire_bean_inner(idx);
        self.stack.borrow_mut().pop();
        result
    }

    fn wire_bean_inner(&self, idx: usize) -> Result<(), WeaveError> {
        let def = &self.defs[idx];
        for dep in &def.depends_on {
            let dep_idx = resolve_single(dep, self.defs, self.active)
                .map_err(|e| WeaveError::refresh_failed(self.stack.borrow().clone(), e))?;
            self.wire_bean(dep_idx)?;
        }

        let view = BeanView {
            defs: self.defs,
            active: self.active,
            instances: &self.instances,
            properties: self.properties,
            lazy_fills: &self.lazy_fills,
        };
        let value = (def.constructor)(&view)
            .map_err(|e| WeaveError::refresh_failed(self.stack.borrow().clone(), e))?;
        self.status.borrow_mut()[idx] = BeanStatus::Created;
        if let Some(init) = &def.init {
            init(value.as_ref()).map_err(|e| WeaveError::refresh_failed(self.stack.borrow().clone(), e))?;
        }
        self.instances.borrow_mut().insert(idx, value);
        self.order.borrow_mut().push(idx);
        self.status.borrow_mut()[idx] = BeanStatus::Wired;
        Ok(())
    }

    fn fill_lazy(&self) -> Result<(), WeaveError> {
        let instances = self.instances.borrow();
        for fill in self.lazy_fills.borrow().iter() {
            fill.fill(self.defs, self.active, &instances)?;
        }
        Ok(())
    }

    fn into_parts(
        self,
    ) -> (
        HashMap<usize, Arc<dyn Any + Send + Sync>>,
        Vec<usize>,
        Vec<BeanStatus>,
    ) {
        (
            self.instances.into_inner(),
            self.order.into_inner(),
            self.status.into_inner(),
        )
    }
}

/// Owns the registered bean definitions and, once refreshed, the
/// constructed instances.
pub struct BeanContainer {
    profile: String,
    definitions: Vec<BeanDefinition>,
    status: RwLock<ContainerStatus>,
    active: RwLock<HashSet<usize>>,
    instances: RwLock<HashMap<usize, Arc<dyn Any + Send + Sync>>>,
    teardown_order: RwLock<Vec<usize>>,
    bean_status: RwLock<Vec<BeanStatus>>,
}

impl BeanContainer {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            definitions: Vec::new(),
            status: RwLock::new(ContainerStatus::Empty),
            active: RwLock::new(HashSet::new()),
            instances: RwLock::new(HashMap::new()),
            teardown_order: RwLock::new(Vec::new()),
            bean_status: RwLock::new(Vec::new()),
        }
    }

    pub fn register(&mut self, definition: BeanDefinition) -> Result<(), WeaveError> {
        if *self.status.read() != ContainerStatus::Empty {
            return Err(WeaveError::registry(
                "cannot register a bean after the container has been refreshed",
            ));
        }
        self.definitions.push(definition);
        Ok(())
    }

    /// Evaluate conditions, then recursively wire every active bean
    /// (construct, run its init hook), then fill every lazy field collected
    /// along the way.
    pub fn refresh(&self, properties: &PropertyStore) -> Result<(), WeaveError> {
        if *self.status.read() == ContainerStatus::Closed {
            return Err(WeaveError::registry("container is closed"));
        }

        let profiles = self.active_profiles(properties);
        let (active, status) = self.evaluate_conditions(properties, &profiles)?;

        let wiring = Wiring::new(&self.definitions, &active, properties, status);
        let mut ascending: Vec<usize> = active.iter().copied().collect();
        ascending.sort_unstable();
        for idx in ascending {
            wiring.wire_bean(idx)?;
        }
        wiring.fill_lazy()?;

        let (instances, order, bean_status) = wiring.into_parts();

        *self.instances.write() = instances;
        *self.teardown_order.write() = order;
        *self.active.write() = active;
        *self.bean_status.write() = bean_status;
        *self.status.write() = ContainerStatus::Ready;
        Ok(())
    }

    /// Active profile name(s) for this refresh: `spring.config.profiles`
    /// (comma-separated) if set, falling back to the profile the container
    /// was constructed with.
    fn active_profiles(&self, properties: &PropertyStore) -> Vec<String> {
        if properties.has("spring.config.profiles") {
            properties
                .get("spring.config.profiles")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            vec![self.profile.clone()]
        }
    }

    fn evaluate_conditions(
        &self,
        properties: &PropertyStore,
        profiles: &[String],
    ) -> Result<(HashSet<usize>, Vec<BeanStatus>), WeaveError> {
        let mut view = ActiveView {
            properties,
            profiles,
            seen: Vec::new(),
        };
        let mut active = HashSet::new();
        let mut status = vec![BeanStatus::Default; self.definitions.len()];
        for (i, def) in self.definitions.iter().enumerate() {
            status[i] = BeanStatus::Resolving;
            let is_active = match &def.condition {
                Some(cond) => cond.evaluate(&view)?,
                None => true,
            };
            if is_active {
                view.seen.push((def.type_id, def.type_name, def.name.clone()));
                active.insert(i);
                status[i] = BeanStatus::Resolved;
            } else {
                status[i] = BeanStatus::Deleted;
            }
        }
        Ok((active, status))
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, WeaveError> {
        self.get_selector(&Selector::of::<T>())
    }

    pub fn get_named<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, WeaveError> {
        self.get_selector(&Selector::named(name))
    }

    fn get_selector<T: Send + Sync + 'static>(&self, selector: &Selector) -> Result<Arc<T>, WeaveError> {
        if *self.status.read() != ContainerStatus::Ready {
            return Err(WeaveError::registry("container has not been refreshed"));
        }
        let active = self.active.read();
        let idx = resolve_single(selector, &self.definitions, &active)?;
        let instances = self.instances.read();
        let any = instances
            .get(&idx)
            .ok_or_else(|| WeaveError::resolution("bean is not active this refresh"))?;
        any.clone()
            .downcast::<T>()
            .map_err(|_| WeaveError::resolution("bean type mismatch at lookup"))
    }

    /// Resolve `I` as a trait a bean exports (`BeanBuilder::exports`),
    /// applying the same primary tie-break `get`/`get_named` use when more
    /// than one active bean exports it.
    pub fn get_export<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, WeaveError> {
        self.get_export_selector::<I>(None)
    }

    pub fn get_export_named<I: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<I>, WeaveError> {
        self.get_export_selector::<I>(Some(name))
    }

    fn get_export_selector<I: ?Sized + Send + Sync + 'static>(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<I>, WeaveError> {
        if *self.status.read() != ContainerStatus::Ready {
            return Err(WeaveError::registry("container has not been refreshed"));
        }
        let target = TypeId::of::<I>();
        let active = self.active.read();
        let matches: Vec<usize> = active
            .iter()
            .copied()
            .filter(|&i| {
                let def = &self.definitions[i];
                let name_matches = match name {
                    Some(n) => def.name.as_deref() == Some(n),
                    None => true,
                };
                name_matches && def.exports.iter().any(|e| e.type_id == target)
            })
            .collect();

        let idx = match matches.len() {
            0 => {
                return Err(WeaveError::resolution(
                    "no bean matches that exported type".to_string(),
                ))
            }
            1 => matches[0],
            _ => {
                let primaries: Vec<usize> =
                    matches.iter().copied().filter(|&i| self.definitions[i].primary).collect();
                match primaries.len() {
                    1 => primaries[0],
                    0 => {
                        return Err(WeaveError::resolution(
                            "ambiguous export candidates: mark exactly one primary",
                        ))
                    }
                    _ => {
                        return Err(WeaveError::resolution(
                            "multiple primary export candidates",
                        ))
                    }
                }
            }
        };

        let instances = self.instances.read();
        let any = instances
            .get(&idx)
            .ok_or_else(|| WeaveError::resolution("bean is not active this refresh"))?;
        let slot = self.definitions[idx]
            .exports
            .iter()
            .find(|e| e.type_id == target)
            .expect("matched by type_id above");
        let upcasted = (slot.upcast)(any.clone());
        upcasted
            .downcast::<Arc<I>>()
            .map(|arc| (*arc).clone())
            .map_err(|_| WeaveError::resolution("export type mismatch"))
    }

    /// The lifecycle status of the bean matching `selector` as of the last
    /// `refresh`, or `None` if no definition matches it at all.
    pub fn status_of(&self, selector: &Selector) -> Option<BeanStatus> {
        let status = self.bean_status.read();
        self.definitions
            .iter()
            .position(|def| match selector {
                Selector::ByType(t, _) => def.type_id == *t,
                Selector::ByName(n) => def.name.as_deref() == Some(n.as_str()),
            })
            .map(|idx| status[idx])
    }

    /// Run every active bean's destroy hook, in the reverse of its
    /// construction order. Failures are never propagated; a caller who
    /// needs to observe them should have the hook log before returning.
    pub fn close(&self) {
        if *self.status.read() != ContainerStatus::Ready {
            return;
        }
        let order = self.teardown_order.read().clone();
        let instances = self.instances.read();
        for &idx in order.iter().rev() {
            let def = &self.definitions[idx];
            let Some(destroy) = &def.destroy else { continue };
            if let Some(value) = instances.get(&idx) {
                if let Err(e) = destroy(value.as_ref()) {
                    tracing::error!(bean = %def.describe(), error = %WeaveError::teardown(e.to_string()), "bean teardown failed");
                }
            }
        }
        *self.status.write() = ContainerStatus::Closed;
    }

    pub fn status(&self) -> ContainerStatus {
        *self.status.read()
    }
}

#[cfg(test)]
mod tests {
    use super::super::bean::BeanBuilder;
    use super::super::condition::Condition;
    use super::*;

    struct Db {
        url: String,
    }

    struct Service {
        label: String,
    }

    #[test]
    fn constructs_in_dependency_order() {
        let mut container = BeanContainer::new("default");
        let mut props = PropertyStore::new();
        props.set("db.url", "postgres://x").unwrap();

        container
            .register(
                BeanBuilder::new(|ctx| {
                    Ok(Db {
                        url: ctx.bind("${db.url}", "url")?,
                    })
                })
                .build(),
            )
            .unwrap();
        container
            .register(
                BeanBuilder::new(|ctx| {
                    let db = ctx.get::<Db>()?;
                    Ok(Service {
                        label: format!("svc over {}", db.url),
                    })
                })
                .depends_on(Selector::of::<Db>())
                .build(),
            )
            .unwrap();

        container.refresh(&props).unwrap();
        let svc = container.get::<Service>().unwrap();
        assert_eq!(svc.label, "svc over postgres://x");
    }

    #[test]
    fn missing_dependency_fails_refresh() {
        let mut container = BeanContainer::new("default");
        container
            .register(
                BeanBuilder::new(|ctx| {
                    let _db = ctx.get::<Db>()?;
                    Ok(Service { label: "x".to_string() })
                })
                .depends_on(Selector::of::<Db>())
                .build(),
            )
            .unwrap();

        let err = container.refresh(&PropertyStore::new()).unwrap_err();
        assert!(err.to_string().contains("no bean matches"));
    }

    #[test]
    fn circular_dependency_fails_refresh() {
        let mut container = BeanContainer::new("default");
        container
            .register(
                BeanBuilder::new(|ctx| {
                    let _ = ctx.get_named::<Service>("b")?;
                    Ok(Db { url: "a".to_string() })
                })
                .named("a")
                .depends_on(Selector::named("b"))
                .build(),
            )
            .unwrap();
        container
            .register(
                BeanBuilder::new(|ctx| {
                    let _ = ctx.get_named::<Db>("a")?;
                    Ok(Service { label: "b".to_string() })
                })
                .named("b")
                .depends_on(Selector::named("a"))
                .build(),
            )
            .unwrap();

        let err = container.refresh(&PropertyStore::new()).unwrap_err();
        assert!(err.to_string().contains("found circle autowire"));
    }

    #[test]
    fn lazy_dependency_breaks_a_true_cycle() {
        // X holds a lazy handle to Y and Y holds a lazy handle to X: a
        // genuine mutual dependency neither `depends_on` edge would survive,
        // resolved by the post-wiring lazy-fill pass instead of tripping
        // "found circle autowire".
        struct X {
            y: LazyBean<Y>,
        }
        struct Y {
            x: LazyBean<X>,
        }

        let mut container = BeanContainer::new("default");
        container
            .register(BeanBuilder::new(|ctx| Ok(X { y: ctx.get_lazy::<Y>() })).build())
            .unwrap();
        container
            .register(BeanBuilder::new(|ctx| Ok(Y { x: ctx.get_lazy::<X>() })).build())
            .unwrap();

        container.refresh(&PropertyStore::new()).unwrap();
        let x = container.get::<X>().unwrap();
        let y = container.get::<Y>().unwrap();
        assert!(Arc::ptr_eq(&x.y.get(), &y));
        assert!(Arc::ptr_eq(&y.x.get(), &x));
    }

    #[test]
    fn condition_gates_registration() {
        let mut container = BeanContainer::new("default");
        let mut props = PropertyStore::new();
        props.set("feature.enabled", "true").unwrap();

        container
            .register(
                BeanBuilder::new(|_| Ok(Service { label: "on".to_string() }))
                    .condition(Condition::OnProperty("feature.enabled".to_string()))
                    .build(),
            )
            .unwrap();

        container.refresh(&props).unwrap();
        assert_eq!(container.get::<Service>().unwrap().label, "on");
    }

    #[test]
    fn inactive_bean_is_not_resolvable() {
        let mut container = BeanContainer::new("default");
        container
            .register(
                BeanBuilder::new(|_| Ok(Service { label: "off".to_string() }))
                    .condition(Condition::OnProperty("feature.enabled".to_string()))
                    .build(),
            )
            .unwrap();

        container.refresh(&PropertyStore::new()).unwrap();
        assert!(container.get::<Service>().is_err());
        assert_eq!(
            container.status_of(&Selector::of::<Service>()),
            Some(BeanStatus::Deleted)
        );
    }

    #[test]
    fn teardown_runs_in_reverse_order() {
        let mut container = BeanContainer::new("default");
        let order = Arc::new(RwLock::new(Vec::new()));
        let order_a = order.clone();
        let order_b = order.clone();

        container
            .register(
                BeanBuilder::new(|_| Ok(Db { url: "a".to_string() }))
                    .on_destroy(move |_| {
                        order_a.write().push("db");
                        Ok(())
                    })
                    .build(),
            )
            .unwrap();
        container
            .register(
                BeanBuilder::new(|ctx| {
                    let _ = ctx.get::<Db>()?;
                    Ok(Service { label: "svc".to_string() })
                })
                .depends_on(Selector::of::<Db>())
                .on_destroy(move |_| {
                    order_b.write().push("service");
                    Ok(())
                })
                .build(),
            )
            .unwrap();

        container.refresh(&PropertyStore::new()).unwrap();
        container.close();
        assert_eq!(*order.read(), vec!["service", "db"]);
    }

    #[test]
    fn spring_config_profiles_property_overrides_constructor_profile() {
        let mut container = BeanContainer::new("default");
        let mut props = PropertyStore::new();
        props.set("spring.config.profiles", "staging,canary").unwrap();

        container
            .register(
                BeanBuilder::new(|_| Ok(Service { label: "staging-bean".to_string() }))
                    .condition(Condition::OnProfile("staging".to_string()))
                    .build(),
            )
            .unwrap();

        container.refresh(&props).unwrap();
        assert_eq!(container.get::<Service>().unwrap().label, "staging-bean");
    }

    #[test]
    fn ambiguous_primary_candidates_fail_resolution() {
        let mut container = BeanContainer::new("default");
        container
            .register(BeanBuilder::new(|_| Ok(Db { url: "a".to_string() })).build())
            .unwrap();
        container
            .register(BeanBuilder::new(|_| Ok(Db { url: "b".to_string() })).build())
            .unwrap();
        container
            .register(
                BeanBuilder::new(|ctx| {
                    let db = ctx.get::<Db>()?;
                    Ok(Service { label: db.url.clone() })
                })
                .depends_on(Selector::of::<Db>())
                .build(),
            )
            .unwrap();

        let err = container.refresh(&PropertyStore::new()).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn collect_ordered_honors_order_field() {
        let mut container = BeanContainer::new("default");
        container
            .register(BeanBuilder::new(|_| Ok(Service { label: "A".to_string() })).named("A").order(2.0).build())
            .unwrap();
        container
            .register(BeanBuilder::new(|_| Ok(Service { label: "B".to_string() })).named("B").order(1.0).build())
            .unwrap();
        container
            .register(
                BeanBuilder::new(|ctx| {
                    let items = ctx.collect_ordered::<Service>(&[])?;
                    Ok(Db {
                        url: items.iter().map(|s| s.label.clone()).collect::<Vec<_>>().join(","),
                    })
                })
                .build(),
            )
            .unwrap();

        container.refresh(&PropertyStore::new()).unwrap();
        assert_eq!(container.get::<Db>().unwrap().url, "B,A");
    }

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    impl Greeter for Service {
        fn greet(&self) -> String {
            format!("hi from {}", self.label)
        }
    }

    #[test]
    fn exported_trait_is_resolvable_by_container() {
        let mut container = BeanContainer::new("default");
        container
            .register(
                BeanBuilder::new(|_| Ok(Service { label: "svc".to_string() }))
                    .exports::<dyn Greeter>(|arc| arc as Arc<dyn Greeter>)
                    .build(),
            )
            .unwrap();

        container.refresh(&PropertyStore::new()).unwrap();
        let greeter = container.get_export::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hi from svc");
    }
}
