//! Service descriptors for introspection and diagnostics.

use crate::key::ServiceId;
use crate::lifetime::Lifetime;

/// How a registration produces its instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryKind {
    /// Built from a [`TypeDescriptor`](crate::TypeDescriptor); carries the
    /// selected constructor's dependencies in parameter order.
    Type {
        implementation: &'static str,
        dependencies: Vec<ServiceId>,
    },
    /// A caller-supplied closure with no declared dependencies.
    Supplied,
    /// A pre-built value shared by every resolution; always a singleton.
    Instance,
}

/// Service descriptor for introspection and diagnostics.
///
/// A snapshot of one registry entry, as returned by
/// [`Container::descriptors`](crate::Container::descriptors).
///
/// # Examples
///
/// ```rust
/// use scopewire::{Container, FactoryKind, Lifetime, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Database;
/// struct Repository {
///     db: Arc<Database>,
/// }
///
/// let mut container = Container::new();
/// container.register_factory(|_| Database).as_singleton();
/// container
///     .register_type(
///         TypeDescriptor::<Repository>::new()
///             .public_constructor()
///             .param::<Database>()
///             .build(|args| Ok(Repository { db: args.next()? })),
///     )
///     .unwrap()
///     .per_scope();
///
/// let descriptors = container.descriptors();
/// let repo = descriptors
///     .iter()
///     .find(|d| d.type_name().contains("Repository"))
///     .unwrap();
/// assert_eq!(repo.lifetime, Lifetime::PerScope);
/// assert_eq!(repo.dependencies().len(), 1);
///
/// let db = descriptors
///     .iter()
///     .find(|d| d.type_name().contains("Database"))
///     .unwrap();
/// assert_eq!(db.factory, FactoryKind::Supplied);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// The service identifier
    pub id: ServiceId,
    /// Service lifetime
    pub lifetime: Lifetime,
    /// Whether cached instances are disposed with their owner
    pub disposable: bool,
    /// Factory shape
    pub factory: FactoryKind,
}

impl ServiceDescriptor {
    /// Type name of the service.
    pub fn type_name(&self) -> &'static str {
        self.id.display_name()
    }

    /// Type name of the concrete implementation, when known.
    pub fn implementation_name(&self) -> Option<&'static str> {
        match &self.factory {
            FactoryKind::Type { implementation, .. } => Some(*implementation),
            FactoryKind::Instance => Some(self.id.display_name()),
            FactoryKind::Supplied => None,
        }
    }

    /// Declared dependencies; empty for supplied factories and instances.
    pub fn dependencies(&self) -> &[ServiceId] {
        match &self.factory {
            FactoryKind::Type { dependencies, .. } => dependencies.as_slice(),
            FactoryKind::Supplied | FactoryKind::Instance => &[],
        }
    }
}
