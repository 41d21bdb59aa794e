//! Type descriptors for type-based registrations.
//!
//! A [`TypeDescriptor`] is an explicit, registration-time declaration of how
//! a concrete type is built: a list of candidate constructors in declaration
//! order, each with an ordered list of dependency identifiers and a function
//! that receives the resolved dependencies. The container picks one
//! constructor deterministically and resolves its parameters recursively
//! through the calling scope.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::descriptors::FactoryKind;
use crate::error::{DiError, DiResult};
use crate::key::ServiceId;
use crate::provider::ResolverContext;
use crate::registration::{downcast, AnyArc};
use crate::traits::ResolverCore;

type Params = SmallVec<[ServiceId; 4]>;
type Invoke<T> = Arc<dyn Fn(&mut Arguments) -> DiResult<T> + Send + Sync>;

/// Visibility of a declared constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Preferred by constructor selection.
    Public,
    /// Used only when no public constructor exists.
    NonPublic,
}

/// One candidate constructor of a concrete type.
pub struct Constructor<T> {
    visibility: Visibility,
    params: Params,
    invoke: Invoke<T>,
}

impl<T> Constructor<T> {
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Dependency identifiers in parameter order.
    pub fn params(&self) -> &[ServiceId] {
        &self.params
    }
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self {
            visibility: self.visibility,
            params: self.params.clone(),
            invoke: self.invoke.clone(),
        }
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .finish()
    }
}

/// Resolved constructor arguments, handed out in parameter order.
pub struct Arguments {
    params: Params,
    values: std::vec::IntoIter<AnyArc>,
    position: usize,
}

impl Arguments {
    fn new(params: Params, values: Vec<AnyArc>) -> Self {
        Self {
            params,
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Takes the next argument, which must have been declared as `D`.
    ///
    /// Returns [`DiError::TypeMismatch`] if the next declared parameter is
    /// not `D` or all arguments were already taken.
    pub fn next<D>(&mut self) -> DiResult<Arc<D>>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        let declared = self.params.get(self.position).copied();
        self.position += 1;
        match (declared, self.values.next()) {
            (Some(id), Some(value)) if id == ServiceId::of::<D>() => downcast::<D>(&value),
            _ => Err(DiError::TypeMismatch(std::any::type_name::<D>())),
        }
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// Declaration of how to construct concrete type `T`.
///
/// # Examples
///
/// ```
/// use scopewire::{Container, Resolver, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Config;
/// struct Server {
///     config: Arc<Config>,
/// }
///
/// let descriptor = TypeDescriptor::<Server>::new()
///     .public_constructor()
///     .param::<Config>()
///     .build(|args| Ok(Server { config: args.next()? }));
///
/// let mut container = Container::new();
/// container.register_instance(Config);
/// container.register_type(descriptor).unwrap();
///
/// let server = container.resolve::<Server>().unwrap();
/// assert!(Arc::ptr_eq(&server.config, &container.resolve::<Config>().unwrap()));
/// ```
pub struct TypeDescriptor<T> {
    constructors: Vec<Constructor<T>>,
}

impl<T: Send + Sync + 'static> TypeDescriptor<T> {
    /// A descriptor with no constructors yet.
    pub fn new() -> Self {
        Self {
            constructors: Vec::new(),
        }
    }

    /// Identifier of the concrete type being described.
    pub fn id(&self) -> ServiceId {
        ServiceId::of::<T>()
    }

    /// Starts declaring a public constructor.
    pub fn public_constructor(self) -> ConstructorBuilder<T> {
        ConstructorBuilder::new(self, Visibility::Public)
    }

    /// Starts declaring a non-public constructor.
    pub fn non_public_constructor(self) -> ConstructorBuilder<T> {
        ConstructorBuilder::new(self, Visibility::NonPublic)
    }

    /// Constructors in declaration order.
    pub fn constructors(&self) -> &[Constructor<T>] {
        &self.constructors
    }

    /// Picks the constructor the container will use.
    ///
    /// The first public constructor in declaration order wins; without one,
    /// the first non-public constructor is used.
    pub fn select(&self) -> DiResult<&Constructor<T>> {
        self.constructors
            .iter()
            .find(|c| c.visibility == Visibility::Public)
            .or_else(|| {
                self.constructors
                    .iter()
                    .find(|c| c.visibility == Visibility::NonPublic)
            })
            .ok_or(DiError::NoConstructorFound(std::any::type_name::<T>()))
    }

    /// Builds the factory for the selected constructor.
    pub(crate) fn into_factory(
        self,
    ) -> DiResult<(
        impl for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
        FactoryKind,
    )> {
        let selected = self.select()?.clone();
        let kind = FactoryKind::Type {
            implementation: std::any::type_name::<T>(),
            dependencies: selected.params.to_vec(),
        };
        let factory = move |ctx: &ResolverContext<'_>| -> DiResult<T> {
            let mut values = Vec::with_capacity(selected.params.len());
            for dependency in &selected.params {
                values.push(ctx.resolve_any(dependency)?);
            }
            let mut args = Arguments::new(selected.params.clone(), values);
            (selected.invoke)(&mut args)
        };
        Ok((factory, kind))
    }
}

impl<T: Send + Sync + 'static> Default for TypeDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &std::any::type_name::<T>())
            .field("constructors", &self.constructors)
            .finish()
    }
}

/// Fluent builder for one constructor of a [`TypeDescriptor`].
pub struct ConstructorBuilder<T> {
    descriptor: TypeDescriptor<T>,
    visibility: Visibility,
    params: Params,
}

impl<T: Send + Sync + 'static> ConstructorBuilder<T> {
    fn new(descriptor: TypeDescriptor<T>, visibility: Visibility) -> Self {
        Self {
            descriptor,
            visibility,
            params: Params::new(),
        }
    }

    /// Appends a parameter resolved as service `D`.
    pub fn param<D: ?Sized + 'static>(mut self) -> Self {
        self.params.push(ServiceId::of::<D>());
        self
    }

    /// Finishes the constructor with the function that builds `T` from the
    /// resolved arguments.
    pub fn build<F>(mut self, invoke: F) -> TypeDescriptor<T>
    where
        F: Fn(&mut Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.descriptor.constructors.push(Constructor {
            visibility: self.visibility,
            params: self.params,
            invoke: Arc::new(invoke),
        });
        self.descriptor
    }
}

/// Types that describe their own construction.
///
/// This is the introspection hook used by
/// [`Container::register_injectable`](crate::Container::register_injectable).
///
/// ```
/// use scopewire::{Container, Injectable, Resolver, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Injectable for Clock {
///     fn descriptor() -> TypeDescriptor<Self> {
///         TypeDescriptor::new().public_constructor().build(|_| Ok(Clock))
///     }
/// }
///
/// struct Scheduler {
///     clock: Arc<Clock>,
/// }
/// impl Injectable for Scheduler {
///     fn descriptor() -> TypeDescriptor<Self> {
///         TypeDescriptor::new()
///             .public_constructor()
///             .param::<Clock>()
///             .build(|args| Ok(Scheduler { clock: args.next()? }))
///     }
/// }
///
/// let mut container = Container::new();
/// container.register_injectable::<Scheduler>().unwrap();
/// container.register_injectable::<Clock>().unwrap().as_singleton();
///
/// let scheduler = container.resolve::<Scheduler>().unwrap();
/// assert!(Arc::ptr_eq(&scheduler.clock, &container.resolve::<Clock>().unwrap()));
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    fn descriptor() -> TypeDescriptor<Self>;
}
