//! Root container and the resolution machinery shared with scopes.
//!
//! A [`Container`] owns the registry, the singleton slots (stored on each
//! registry entry) and its own per-scope cache, since the root doubles as the
//! default scope. Every [`Scope`] keeps an `Arc` to the same root state, so
//! registrations made after a scope was created are visible to it.

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::config::ContainerOptions;
use crate::descriptor::{Injectable, TypeDescriptor};
use crate::descriptors::{FactoryKind, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::internal::{DisposeBag, InstanceCache};
use crate::key::ServiceId;
use crate::lifetime::Lifetime;
use crate::registration::{ctor, erase, AnyArc, Ctor, RegistrationHandle, Registry, RegistryEntry};
use crate::traits::ResolverCore;
use crate::validation::{self, ValidationReport};

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub use scope::Scope;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Cache, disposal list and lifecycle flag of one resolution context.
///
/// The root container and every scope each own exactly one.
pub(crate) struct ScopeState {
    id: u64,
    name: String,
    cache: InstanceCache,
    disposers: Mutex<DisposeBag>,
    disposed: AtomicBool,
}

impl ScopeState {
    pub(crate) fn new(kind: &str, label: Option<&str>) -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        let name = match label {
            Some(label) => format!("{label} {kind} #{id}"),
            None => format!("{kind} #{id}"),
        };
        Self {
            id,
            name,
            cache: InstanceCache::default(),
            disposers: Mutex::new(DisposeBag::default()),
            disposed: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_active(&self) -> DiResult<()> {
        if self.is_disposed() {
            return Err(DiError::UseAfterDispose(self.name.clone()));
        }
        Ok(())
    }

    pub(crate) fn cached_instances(&self) -> usize {
        self.cache.len()
    }

    pub(crate) fn pending_disposers(&self) -> usize {
        self.disposers.lock().len()
    }

    /// `true` when dropping now would leak disposable instances.
    pub(crate) fn needs_dispose(&self) -> bool {
        !self.is_disposed() && !self.disposers.lock().is_empty()
    }

    /// Records a freshly built instance for disposal, if its registration
    /// declared the capability.
    ///
    /// Fails when the owner was disposed while the instance was being built;
    /// the instance is then disposed here and must not be cached.
    fn track(&self, entry: &RegistryEntry, instance: &AnyArc) -> DiResult<()> {
        let mut bag = self.disposers.lock();
        if self.is_disposed() {
            drop(bag);
            if let Some(dispose) = entry.disposer {
                dispose(instance);
            }
            debug!(
                service = entry.id.display_name(),
                context = %self.name,
                "discarding instance built during dispose"
            );
            return Err(DiError::UseAfterDispose(self.name.clone()));
        }
        if let Some(dispose) = entry.disposer {
            let instance = instance.clone();
            bag.push(entry.id.display_name(), Box::new(move || dispose(&instance)));
        }
        Ok(())
    }

    /// Transitions to disposed, returning `false` if that already happened.
    pub(crate) fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let mut bag = mem::take(&mut *self.disposers.lock());
        let disposed = bag.run_all_reverse(&self.name);
        let released = self.cache.clear();
        debug!(context = %self.name, disposed, released, "disposed");
        true
    }
}

/// State shared by a root container and all of its scopes.
pub(crate) struct RootInner {
    pub(crate) registry: RwLock<Registry>,
    pub(crate) state: ScopeState,
    pub(crate) options: ContainerOptions,
}

/// One resolution: the root plus the context `resolve` was called on.
#[derive(Clone, Copy)]
pub(crate) struct Frame<'a> {
    root: &'a RootInner,
    state: &'a ScopeState,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(root: &'a RootInner, state: &'a ScopeState) -> Self {
        Self { root, state }
    }

    fn root_frame(self) -> Frame<'a> {
        Frame::new(self.root, &self.root.state)
    }

    pub(crate) fn resolve_any(self, id: &ServiceId) -> DiResult<AnyArc> {
        self.state.ensure_active()?;
        // The read guard is dropped here, before any factory runs.
        let entry = self
            .root
            .registry
            .read()
            .get(id)
            .ok_or(DiError::UnregisteredService(id.display_name()))?;

        trace!(
            service = id.display_name(),
            lifetime = %entry.lifetime,
            context = %self.state.name,
            "resolving"
        );
        match entry.lifetime {
            Lifetime::Transient => self.construct(&entry),
            Lifetime::Singleton => self.root_frame().singleton(&entry),
            Lifetime::PerScope => self.per_scope(&entry),
        }
    }

    fn singleton(self, entry: &RegistryEntry) -> DiResult<AnyArc> {
        self.state.ensure_active()?;
        if let Some(instance) = entry.singleton.get() {
            trace!(service = entry.id.display_name(), "singleton cache hit");
            return Ok(instance.clone());
        }
        let instance = entry.singleton.get_or_try_init(|| -> DiResult<AnyArc> {
            trace!(service = entry.id.display_name(), "singleton cache miss");
            let instance = self.construct(entry)?;
            self.state.track(entry, &instance)?;
            Ok(instance)
        })?;
        // Tracked before dispose began but cached after it finished.
        self.state.ensure_active()?;
        Ok(instance.clone())
    }

    fn per_scope(self, entry: &RegistryEntry) -> DiResult<AnyArc> {
        let slot = self.state.cache.slot(entry.serial);
        if let Some(instance) = slot.get() {
            trace!(service = entry.id.display_name(), context = %self.state.name, "scope cache hit");
            return Ok(instance.clone());
        }
        let instance = slot.get_or_try_init(|| -> DiResult<AnyArc> {
            trace!(service = entry.id.display_name(), context = %self.state.name, "scope cache miss");
            let instance = self.construct(entry)?;
            self.state.track(entry, &instance)?;
            Ok(instance)
        })?;
        self.state.ensure_active()?;
        Ok(instance.clone())
    }

    fn construct(self, entry: &RegistryEntry) -> DiResult<AnyArc> {
        let ctx = ResolverContext::new(self, entry.id);
        (entry.ctor)(&ctx)
    }
}

/// Root dependency injection container.
///
/// Registration takes `&mut self`, so it happens before the container is
/// shared; resolution takes `&self` and is safe from any number of threads.
/// The root also acts as the default scope: per-scope services resolved
/// directly on it are cached on the root.
///
/// # Examples
///
/// ```
/// use scopewire::{Container, Resolver};
/// use std::sync::Arc;
///
/// struct Config {
///     url: String,
/// }
/// struct RequestId(u32);
///
/// let mut container = Container::new();
/// container
///     .register_factory(|_| Config { url: "postgres://localhost".into() })
///     .as_singleton();
/// container.register_factory(|_| RequestId(1)).per_scope();
///
/// let scope = container.create_scope();
/// let config = scope.resolve::<Config>().unwrap();
/// assert!(Arc::ptr_eq(&config, &container.resolve::<Config>().unwrap()));
///
/// let a = scope.resolve::<RequestId>().unwrap();
/// let b = scope.resolve::<RequestId>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert!(!Arc::ptr_eq(&a, &container.resolve::<RequestId>().unwrap()));
/// ```
pub struct Container {
    inner: Arc<RootInner>,
}

impl Container {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates an empty container with the given options.
    pub fn with_options(options: ContainerOptions) -> Self {
        let state = ScopeState::new("container", options.label.as_deref());
        debug!(context = %state.name, "container created");
        Self {
            inner: Arc::new(RootInner {
                registry: RwLock::new(Registry::default()),
                state,
                options,
            }),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Process-unique id of this container.
    pub fn id(&self) -> u64 {
        self.inner.state.id()
    }

    /// Registers concrete type `T` built from a type descriptor.
    ///
    /// The constructor is selected now; a descriptor without any constructor
    /// fails with [`DiError::NoConstructorFound`] and leaves the registry
    /// untouched.
    pub fn register_type<T>(
        &mut self,
        descriptor: TypeDescriptor<T>,
    ) -> DiResult<RegistrationHandle<'_, T>>
    where
        T: Send + Sync + 'static,
    {
        let (factory, kind) = descriptor.into_factory()?;
        Ok(self.insert::<T>(
            ctor(move |ctx| factory(ctx).map(|value| erase(Arc::new(value)))),
            kind,
        ))
    }

    /// Registers concrete type `I` as the implementation of abstract service `S`.
    ///
    /// ```
    /// use scopewire::{Container, Resolver, TypeDescriptor};
    /// use std::sync::Arc;
    ///
    /// trait Store: Send + Sync {
    ///     fn get(&self) -> u32;
    /// }
    /// struct Memory;
    /// impl Store for Memory {
    ///     fn get(&self) -> u32 {
    ///         42
    ///     }
    /// }
    ///
    /// let mut container = Container::new();
    /// container
    ///     .register_type_as::<dyn Store, _>(
    ///         TypeDescriptor::<Memory>::new().public_constructor().build(|_| Ok(Memory)),
    ///         |memory| memory,
    ///     )
    ///     .unwrap()
    ///     .as_singleton();
    ///
    /// assert_eq!(container.resolve::<dyn Store>().unwrap().get(), 42);
    /// ```
    pub fn register_type_as<S, I>(
        &mut self,
        descriptor: TypeDescriptor<I>,
        cast: fn(Arc<I>) -> Arc<S>,
    ) -> DiResult<RegistrationHandle<'_, S>>
    where
        S: ?Sized + Send + Sync + 'static,
        I: Send + Sync + 'static,
    {
        let (factory, kind) = descriptor.into_factory()?;
        Ok(self.insert::<S>(
            ctor(move |ctx| factory(ctx).map(|value| erase(cast(Arc::new(value))))),
            kind,
        ))
    }

    /// Registers `T` using the descriptor it declares through [`Injectable`].
    pub fn register_injectable<T: Injectable>(&mut self) -> DiResult<RegistrationHandle<'_, T>> {
        self.register_type(T::descriptor())
    }

    /// Registers a supplied factory for `T`.
    pub fn register_factory<T, F>(&mut self, factory: F) -> RegistrationHandle<'_, T>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> T + Send + Sync + 'static,
    {
        self.insert::<T>(
            ctor(move |ctx| Ok(erase(Arc::new(factory(ctx))))),
            FactoryKind::Supplied,
        )
    }

    /// Registers a supplied factory for `T` that may fail.
    pub fn try_register_factory<T, F>(&mut self, factory: F) -> RegistrationHandle<'_, T>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.insert::<T>(
            ctor(move |ctx| factory(ctx).map(|value| erase(Arc::new(value)))),
            FactoryKind::Supplied,
        )
    }

    /// Registers a supplied factory producing abstract service `S`,
    /// typically a trait object.
    pub fn register_trait_factory<S, F>(&mut self, factory: F) -> RegistrationHandle<'_, S>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        self.insert::<S>(
            ctor(move |ctx| factory(ctx).map(erase::<S>)),
            FactoryKind::Supplied,
        )
    }

    /// Registers a pre-built value as a singleton.
    ///
    /// The entry stays a singleton: [`RegistrationHandle::per_scope`] on the
    /// returned handle is ignored, so a disposable value is disposed once, by
    /// the root.
    pub fn register_instance<T>(&mut self, value: T) -> RegistrationHandle<'_, T>
    where
        T: Send + Sync + 'static,
    {
        let instance = Arc::new(value);
        self.insert::<T>(
            ctor(move |_| Ok(erase(instance.clone()))),
            FactoryKind::Instance,
        )
        .as_singleton()
    }

    fn insert<T>(&mut self, ctor: Ctor, kind: FactoryKind) -> RegistrationHandle<'_, T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.inner
            .registry
            .write()
            .insert(ServiceId::of::<T>(), ctor, kind);
        RegistrationHandle::new(&self.inner.registry)
    }

    /// Returns `true` if service `T` has a registry entry.
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.contains_service(&ServiceId::of::<T>())
    }

    /// Creates a child scope with its own per-scope cache.
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.inner.clone())
    }

    /// Disposes every cached disposable singleton and per-scope instance
    /// owned by the root.
    ///
    /// Idempotent. Afterwards every resolution on the root, and every
    /// singleton resolution from a scope, fails with
    /// [`DiError::UseAfterDispose`]. Instances are currently released in
    /// reverse creation order; callers must not depend on that.
    pub fn dispose(&self) {
        self.inner.state.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.is_disposed()
    }

    /// Snapshot of every registration, sorted by service id.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        let mut descriptors: Vec<_> = self
            .inner
            .registry
            .read()
            .iter()
            .map(|entry| entry.descriptor())
            .collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    /// Inspects the registration graph without constructing anything.
    pub fn validation_report(&self) -> ValidationReport {
        validation::inspect(&self.inner.registry.read())
    }

    /// Checks that every dependency of every type-based registration is
    /// registered, collecting all misses into [`DiError::Validation`].
    ///
    /// Warnings are logged and do not fail validation.
    pub fn validate(&self) -> DiResult<()> {
        let report = self.validation_report();
        for warning in &report.warnings {
            warn!(context = %self.inner.state.name, %warning, "registration warning");
        }
        report.into_result()
    }

    fn frame(&self) -> Frame<'_> {
        Frame::new(&self.inner, &self.inner.state)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, id: &ServiceId) -> DiResult<AnyArc> {
        self.frame().resolve_any(id)
    }

    fn contains_service(&self, id: &ServiceId) -> bool {
        self.inner.registry.read().contains(id)
    }

    fn context_name(&self) -> &str {
        self.inner.state.name()
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if self.inner.options.dispose_on_drop {
            self.inner.state.dispose();
        } else if self.inner.state.needs_dispose() {
            warn!(
                context = %self.inner.state.name,
                pending = self.inner.state.pending_disposers(),
                "container dropped without dispose"
            );
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.inner.state.name)
            .field("registrations", &self.inner.registry.read().len())
            .field("cached", &self.inner.state.cached_instances())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
