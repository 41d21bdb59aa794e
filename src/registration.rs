//! Service registration types.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::descriptors::{FactoryKind, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::internal::FastMap;
use crate::key::ServiceId;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::traits::Dispose;

// Type-erased storage: always holds an `Arc<T>` for the service type `T`.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

pub(crate) type Ctor = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

pub(crate) type DisposeFn = fn(&AnyArc);

pub(crate) fn ctor<F>(f: F) -> Ctor
where
    F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> AnyArc {
    Arc::new(value)
}

pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(any: &AnyArc) -> DiResult<Arc<T>> {
    any.downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))
}

fn dispose_erased<T: ?Sized + Dispose>(instance: &AnyArc) {
    if let Some(service) = instance.downcast_ref::<Arc<T>>() {
        service.dispose();
    }
}

/// Registry entry: a factory plus its lifetime tag.
///
/// Entries are immutable once published; marking a lifetime replaces the
/// entry with a fresh one carrying a new serial and an empty singleton slot.
pub(crate) struct RegistryEntry {
    pub(crate) id: ServiceId,
    pub(crate) serial: u64,
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Ctor,
    pub(crate) kind: FactoryKind,
    pub(crate) disposer: Option<DisposeFn>,
    /// Singleton slot, owned by the root container through the registry.
    pub(crate) singleton: OnceCell<AnyArc>,
}

impl RegistryEntry {
    fn remarked(&self, serial: u64, lifetime: Lifetime, disposer: Option<DisposeFn>) -> Self {
        Self {
            id: self.id,
            serial,
            lifetime,
            ctor: self.ctor.clone(),
            kind: self.kind.clone(),
            disposer,
            singleton: OnceCell::new(),
        }
    }

    pub(crate) fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor {
            id: self.id,
            lifetime: self.lifetime,
            disposable: self.disposer.is_some(),
            factory: self.kind.clone(),
        }
    }
}

/// Service registry holding all registrations of one root container.
#[derive(Default)]
pub(crate) struct Registry {
    entries: FastMap<ServiceId, Arc<RegistryEntry>>,
    next_serial: u64,
}

impl Registry {
    /// Inserts a transient entry for `id`, replacing any previous one.
    pub(crate) fn insert(&mut self, id: ServiceId, ctor: Ctor, kind: FactoryKind) {
        let serial = self.bump();
        let entry = RegistryEntry {
            id,
            serial,
            lifetime: Lifetime::Transient,
            ctor,
            kind,
            disposer: None,
            singleton: OnceCell::new(),
        };
        if let Some(previous) = self.entries.insert(id, Arc::new(entry)) {
            Self::note_orphan(&previous);
        }
        debug!(service = id.display_name(), serial, "registered service");
    }

    pub(crate) fn get(&self, id: &ServiceId) -> Option<Arc<RegistryEntry>> {
        self.entries.get(id).cloned()
    }

    pub(crate) fn contains(&self, id: &ServiceId) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<RegistryEntry>> {
        self.entries.values()
    }

    /// Replaces the current entry for `id` with one carrying the new
    /// lifetime and disposer.
    ///
    /// Pre-built instances are shared by every resolution, so they stay
    /// singletons whatever lifetime is requested.
    fn remark(&mut self, id: &ServiceId, lifetime: Lifetime, disposer: Option<DisposeFn>) {
        let serial = self.bump();
        if let Some(slot) = self.entries.get_mut(id) {
            let lifetime = match slot.kind {
                FactoryKind::Instance if lifetime != Lifetime::Singleton => {
                    warn!(
                        service = id.display_name(),
                        requested = %lifetime,
                        "pre-built instance kept as singleton"
                    );
                    Lifetime::Singleton
                }
                _ => lifetime,
            };
            Self::note_orphan(slot);
            *slot = Arc::new(slot.remarked(serial, lifetime, disposer));
            debug!(service = id.display_name(), serial, %lifetime, "updated registration");
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_serial += 1;
        self.next_serial
    }

    // Already-cached instances keep living with whoever holds them; they are
    // not invalidated by a newer registration for the same id.
    fn note_orphan(previous: &RegistryEntry) {
        match previous.lifetime {
            _ if previous.singleton.get().is_some() => warn!(
                service = previous.id.display_name(),
                "registration replaced after its singleton was created; the cached instance is orphaned"
            ),
            // Scope caches are not visible from here.
            Lifetime::PerScope => debug!(
                service = previous.id.display_name(),
                serial = previous.serial,
                "per-scope registration replaced; any instances already cached in scopes are orphaned"
            ),
            _ => {}
        }
    }
}

/// Handle returned by every registration, used to set the lifetime of the
/// entry that was just created.
///
/// The handle keeps the container mutably borrowed, so registration stays a
/// single-threaded phase. Each method replaces the entry in place and returns
/// the handle for chaining.
///
/// Replacing an entry never touches instances cached under the old one. A
/// singleton already created keeps living on the root and is still disposed
/// with it; per-scope instances already cached stay with their scopes until
/// those scopes are disposed, while new resolutions use the new entry.
/// Registration is meant to finish before the first resolution.
///
/// # Examples
///
/// ```
/// use scopewire::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Settings;
///
/// let mut container = Container::new();
/// let handle = container.register_factory(|_| Settings).as_singleton();
/// assert_eq!(handle.lifetime(), Lifetime::Singleton);
///
/// let a = container.resolve::<Settings>().unwrap();
/// let b = container.resolve::<Settings>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct RegistrationHandle<'a, T: ?Sized> {
    registry: &'a RwLock<Registry>,
    id: ServiceId,
    _service: PhantomData<fn() -> Arc<T>>,
}

impl<'a, T: ?Sized + Send + Sync + 'static> RegistrationHandle<'a, T> {
    pub(crate) fn new(registry: &'a RwLock<Registry>) -> Self {
        Self {
            registry,
            id: ServiceId::of::<T>(),
            _service: PhantomData,
        }
    }

    /// Marks the entry as a singleton: one instance per root container.
    pub fn as_singleton(self) -> Self {
        self.set_lifetime(Lifetime::Singleton)
    }

    /// Marks the entry as per-scope: one instance per scope instance.
    pub fn per_scope(self) -> Self {
        self.set_lifetime(Lifetime::PerScope)
    }

    /// Declares that cached instances of this service must be disposed
    /// when their owning container or scope is disposed.
    pub fn disposable(self) -> Self
    where
        T: Dispose,
    {
        {
            let mut registry = self.registry.write();
            let lifetime = registry.get(&self.id).map(|e| e.lifetime).unwrap_or_default();
            registry.remark(&self.id, lifetime, Some(dispose_erased::<T> as DisposeFn));
        }
        self
    }

    /// Identifier of the registered service.
    pub fn id(&self) -> ServiceId {
        self.id
    }

    /// Current lifetime of the entry.
    pub fn lifetime(&self) -> Lifetime {
        self.registry
            .read()
            .get(&self.id)
            .map(|e| e.lifetime)
            .unwrap_or_default()
    }

    fn set_lifetime(self, lifetime: Lifetime) -> Self {
        {
            let mut registry = self.registry.write();
            let disposer = registry.get(&self.id).and_then(|e| e.disposer);
            registry.remark(&self.id, lifetime, disposer);
        }
        self
    }
}
