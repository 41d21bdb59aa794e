//! Resolver traits for service resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::ServiceId;
use crate::registration::downcast;

/// Core resolver trait for object-safe service resolution.
///
/// This is the type-erased entry point shared by the root
/// [`Container`](crate::Container), every [`Scope`](crate::Scope) and the
/// [`ResolverContext`](crate::ResolverContext) handed to factories. Most code
/// should use the generic methods on [`Resolver`] instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves a service by identifier, applying its registered lifetime.
    ///
    /// The returned value wraps an `Arc<T>` for the service type `T` named
    /// by `id`.
    fn resolve_any(&self, id: &ServiceId) -> DiResult<Arc<dyn Any + Send + Sync>>;

    /// Returns `true` if `id` has a registry entry visible from this context.
    fn contains_service(&self, id: &ServiceId) -> bool;

    /// Name of the resolution context, as used in logs and
    /// [`DiError::UseAfterDispose`].
    fn context_name(&self) -> &str;
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// Implemented for everything that implements [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use scopewire::{Container, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let mut container = Container::new();
/// container.register_instance(7u16);
/// container.register_trait_factory::<dyn Greeter, _>(|_| Ok(Arc::new(English)));
///
/// assert_eq!(*container.resolve::<u16>().unwrap(), 7);
/// assert_eq!(container.resolve::<dyn Greeter>().unwrap().greet(), "hello");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves service `T`.
    ///
    /// Fails with [`DiError::UnregisteredService`] if `T` was never
    /// registered, or [`DiError::UnresolvedDependency`] if anything `T`
    /// transitively depends on is missing.
    fn resolve<T>(&self) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let any = self.resolve_any(&ServiceId::of::<T>())?;
        downcast::<T>(&any)
    }

    /// Resolves service `T`, panicking if resolution fails.
    ///
    /// Convenient inside supplied factories where a missing dependency is
    /// a configuration bug.
    ///
    /// # Panics
    ///
    /// Panics with the [`DiError`] message when resolution fails.
    fn resolve_required<T>(&self) -> Arc<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.resolve::<T>() {
            Ok(service) => service,
            Err(err) => panic!("failed to resolve {}: {}", std::any::type_name::<T>(), err),
        }
    }

    /// Resolves service `T`, returning `Ok(None)` when `T` itself is not
    /// registered.
    ///
    /// Every other failure, including a missing dependency of `T`, is still
    /// reported as an error.
    fn try_resolve<T>(&self) -> DiResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let id = ServiceId::of::<T>();
        match self.resolve::<T>() {
            Ok(service) => Ok(Some(service)),
            Err(DiError::UnregisteredService(_) | DiError::UnresolvedDependency { .. })
                if !self.contains_service(&id) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
