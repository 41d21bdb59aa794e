//! Service lifetime definitions.

use std::fmt;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Service lifetimes controlling instance caching behavior.
///
/// - **Transient**: a new instance on every resolution, never cached
/// - **Singleton**: one instance per root [`Container`](crate::Container),
///   shared by the container and all of its scopes
/// - **PerScope**: one instance per scope instance; the root container acts
///   as its own default scope
///
/// # Examples
///
/// ```rust
/// use scopewire::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Database;
/// struct Request;
/// struct Command;
///
/// let mut container = Container::new();
/// container.register_factory(|_| Database).as_singleton();
/// container.register_factory(|_| Request).per_scope();
/// container.register_factory(|_| Command);
///
/// let scope = container.create_scope();
/// assert!(Arc::ptr_eq(
///     &container.resolve::<Database>().unwrap(),
///     &scope.resolve::<Database>().unwrap(),
/// ));
/// assert!(!Arc::ptr_eq(
///     &container.resolve::<Request>().unwrap(),
///     &scope.resolve::<Request>().unwrap(),
/// ));
/// assert!(!Arc::ptr_eq(
///     &scope.resolve::<Command>().unwrap(),
///     &scope.resolve::<Command>().unwrap(),
/// ));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Lifetime {
    /// New instance per resolution. The default for every registration.
    #[default]
    Transient,
    /// Single instance per root container, created on first request.
    ///
    /// Singletons are always constructed against the root container, even
    /// when the request comes from a child scope.
    Singleton,
    /// Single instance per scope instance, created on first request
    /// within that scope.
    PerScope,
}

impl Lifetime {
    /// Returns `true` if instances of this lifetime are cached.
    #[inline]
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifetime::Transient => "transient",
            Lifetime::Singleton => "singleton",
            Lifetime::PerScope => "per-scope",
        };
        f.write_str(name)
    }
}
