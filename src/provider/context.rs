//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides
//! the interface for factory functions to resolve dependencies.

use crate::error::{DiError, DiResult};
use crate::key::ServiceId;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

use super::Frame;

/// Context passed to factory functions for resolving dependencies.
///
/// A `ResolverContext` is bound to the scope the outer `resolve` call was made
/// against (or to the root, while a singleton is being built) and remembers
/// which service is being constructed. A dependency that has no registration
/// is therefore reported as [`DiError::UnresolvedDependency`] naming both
/// sides instead of a bare [`DiError::UnregisteredService`].
///
/// # Examples
///
/// ```
/// use scopewire::{Container, DiError, Resolver};
/// use std::sync::Arc;
///
/// struct Database {
///     url: String,
/// }
/// struct UserService {
///     db: Arc<Database>,
/// }
///
/// let mut container = Container::new();
/// container.register_factory(|ctx| UserService {
///     db: ctx.resolve_required::<Database>(),
/// });
/// container.try_register_factory(|ctx| {
///     let url = ctx.resolve::<String>()?;
///     Ok(Database { url: url.to_string() })
/// });
///
/// match container.resolve::<Database>() {
///     Err(DiError::UnresolvedDependency { dependency, required_by }) => {
///         assert_eq!(dependency, "alloc::string::String");
///         assert!(required_by.ends_with("Database"));
///     }
///     _ => unreachable!(),
/// }
///
/// container.register_instance("postgres://localhost".to_string());
/// let users = container.resolve::<UserService>().unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    frame: Frame<'a>,
    requester: ServiceId,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(frame: Frame<'a>, requester: ServiceId) -> Self {
        Self { frame, requester }
    }

    /// The service whose factory is running.
    pub fn requester(&self) -> ServiceId {
        self.requester
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, id: &ServiceId) -> DiResult<AnyArc> {
        self.frame.resolve_any(id).map_err(|err| match err {
            DiError::UnregisteredService(dependency) => DiError::UnresolvedDependency {
                dependency,
                required_by: self.requester.display_name(),
            },
            other => other,
        })
    }

    fn contains_service(&self, id: &ServiceId) -> bool {
        self.frame.root.registry.read().contains(id)
    }

    fn context_name(&self) -> &str {
        self.frame.state.name()
    }
}
