//! Scoped service resolution and lifecycle management.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::DiResult;
use crate::key::ServiceId;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

use super::{Frame, RootInner, ScopeState};

/// Child resolution context with its own per-scope cache.
///
/// A `Scope` shares the registry and the singletons of the container it was
/// created from:
///
/// - **Singleton**: resolved and cached on the root, whichever scope asks
/// - **PerScope**: resolved and cached in this scope
/// - **Transient**: built fresh on every resolution, never tracked
///
/// Scopes do not nest. Dropping a scope disposes it unless the container was
/// built with [`ContainerOptions::dispose_on_drop`](crate::ContainerOptions::dispose_on_drop)
/// set to `false`.
///
/// # Examples
///
/// ```
/// use scopewire::{Container, Resolver};
/// use std::sync::Arc;
///
/// struct Connection(&'static str);
/// struct UserService {
///     db: Arc<Connection>,
/// }
///
/// let mut container = Container::new();
/// container.register_factory(|_| Connection("conn-1")).per_scope();
/// container.register_factory(|ctx| UserService {
///     db: ctx.resolve_required::<Connection>(),
/// });
///
/// let scope = container.create_scope();
/// let first = scope.resolve::<UserService>().unwrap();
/// let second = scope.resolve::<UserService>().unwrap();
/// assert!(Arc::ptr_eq(&first.db, &second.db));
///
/// let other = container.create_scope();
/// assert!(!Arc::ptr_eq(&first.db, &other.resolve::<UserService>().unwrap().db));
/// ```
pub struct Scope {
    root: Arc<RootInner>,
    state: ScopeState,
}

impl Scope {
    pub(crate) fn new(root: Arc<RootInner>) -> Self {
        let state = ScopeState::new("scope", root.options.label.as_deref());
        debug!(context = %state.name(), parent = %root.state.name(), "scope created");
        Self { root, state }
    }

    /// Process-unique id of this scope.
    pub fn id(&self) -> u64 {
        self.state.id()
    }

    /// Disposes every cached disposable per-scope instance of this scope.
    ///
    /// Idempotent; singletons are left to the root. Afterwards every
    /// resolution through this scope fails with
    /// [`DiError::UseAfterDispose`](crate::DiError::UseAfterDispose).
    pub fn dispose(&self) {
        self.state.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn frame(&self) -> Frame<'_> {
        Frame::new(&self.root, &self.state)
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, id: &ServiceId) -> DiResult<AnyArc> {
        self.frame().resolve_any(id)
    }

    fn contains_service(&self, id: &ServiceId) -> bool {
        self.root.registry.read().contains(id)
    }

    fn context_name(&self) -> &str {
        self.state.name()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if self.root.options.dispose_on_drop {
            self.state.dispose();
        } else if self.state.needs_dispose() {
            warn!(
                context = %self.state.name(),
                pending = self.state.pending_disposers(),
                "scope dropped without dispose"
            );
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.state.name())
            .field("parent", &self.root.state.name())
            .field("cached", &self.state.cached_instances())
            .field("disposed", &self.state.is_disposed())
            .finish()
    }
}
