//! Error types for the dependency injection container.

use std::error::Error as StdError;
use std::sync::Arc;

/// Shared, cloneable error produced by a service constructor.
pub type BoxedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Dependency injection errors.
///
/// Every failure surfaces synchronously to the caller of `resolve` or
/// `register_*`; nothing is retried and no partially built object graph is
/// ever returned.
///
/// # Examples
///
/// ```rust
/// use scopewire::{Container, DiError, Resolver};
///
/// let container = Container::new();
/// match container.resolve::<String>() {
///     Err(DiError::UnregisteredService(name)) => {
///         assert_eq!(name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// `resolve` was called for a service with no registry entry.
    #[error("service not registered: {0}")]
    UnregisteredService(&'static str),

    /// A dependency needed while constructing `required_by` has no registry entry.
    #[error("unresolved dependency {dependency} required by {required_by}")]
    UnresolvedDependency {
        dependency: &'static str,
        required_by: &'static str,
    },

    /// A type descriptor exposes neither a public nor a non-public constructor.
    #[error("no constructor found for {0}")]
    NoConstructorFound(&'static str),

    /// Resolution was attempted through a disposed container or scope.
    #[error("{0} used after dispose")]
    UseAfterDispose(String),

    /// A stored instance or constructor argument had an unexpected type.
    #[error("type mismatch for {0}")]
    TypeMismatch(&'static str),

    /// A service constructor reported a failure of its own.
    #[error("failed to construct {service}: {source}")]
    Construction {
        service: &'static str,
        source: BoxedError,
    },

    /// Aggregate of every problem found by [`Container::validate`](crate::Container::validate).
    #[error("invalid registrations: {}", join(.0))]
    Validation(Vec<DiError>),
}

impl DiError {
    /// Wraps an error raised while constructing service `T`.
    ///
    /// ```rust
    /// use scopewire::DiError;
    ///
    /// struct Pool;
    /// let err = DiError::construction::<Pool>("connection refused");
    /// assert!(err.to_string().ends_with("connection refused"));
    /// ```
    pub fn construction<T: ?Sized + 'static>(
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        DiError::Construction {
            service: std::any::type_name::<T>(),
            source: Arc::from(source.into()),
        }
    }

    /// Returns `true` when the error reports a missing registration, either
    /// for the requested service itself or for one of its dependencies.
    pub fn is_missing_registration(&self) -> bool {
        matches!(
            self,
            DiError::UnregisteredService(_) | DiError::UnresolvedDependency { .. }
        )
    }
}

fn join(errors: &[DiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
