//! Service identifiers for the dependency injection container.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of an abstract service.
///
/// A `ServiceId` pairs the [`TypeId`] of the service type with its
/// [`std::any::type_name`]. The type id is the identity; the name is only
/// carried for diagnostics and error messages. Any `'static` type can be a
/// service, including unsized trait objects such as `dyn Logger`.
///
/// # Examples
///
/// ```rust
/// use scopewire::ServiceId;
///
/// trait Logger: Send + Sync {}
///
/// let a = ServiceId::of::<String>();
/// let b = ServiceId::of::<String>();
/// let c = ServiceId::of::<dyn Logger>();
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// assert_eq!(a.display_name(), "alloc::string::String");
/// assert_eq!(a.type_id(), std::any::TypeId::of::<String>());
/// ```
#[derive(Clone, Copy)]
pub struct ServiceId {
    type_id: TypeId,
    name: &'static str,
}

impl ServiceId {
    /// Returns the identifier of service type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying type id.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable type name, as reported by `std::any::type_name`.
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceId {}

impl Hash for ServiceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl PartialOrd for ServiceId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServiceId {
    // Name first so that sorted diagnostics read alphabetically.
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.type_id.cmp(&other.type_id))
    }
}

impl fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceId({})", self.name)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
