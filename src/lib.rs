//! # scopewire
//!
//! A small, thread-safe dependency injection container with scoped lifetimes.
//!
//! ## Features
//!
//! - **Three lifetimes**: Transient, Singleton and PerScope services
//! - **Type-based wiring**: constructors declared once, dependencies resolved recursively
//! - **Two-level scopes**: a root container plus child scopes with isolated caches
//! - **Thread-safe**: each cached instance is created exactly once, even under contention
//! - **Deterministic disposal**: opt-in release of cached instances when a scope ends
//!
//! ## Quick Start
//!
//! ```rust
//! use scopewire::{Container, Resolver, TypeDescriptor};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut container = Container::new();
//! container.register_instance(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! container
//!     .register_type(
//!         TypeDescriptor::<UserService>::new()
//!             .public_constructor()
//!             .param::<Database>()
//!             .build(|args| Ok(UserService { db: args.next()? })),
//!     )
//!     .unwrap();
//!
//! let user_service = container.resolve::<UserService>().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Transient**: created fresh on every resolution (the default)
//! - **Singleton**: created once per root container, always against the root
//! - **PerScope**: created once per scope; the root acts as the default scope
//!
//! ## Scoped Services
//!
//! ```rust
//! use scopewire::{Container, Resolver};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! struct RequestId(u32);
//!
//! let counter = Arc::new(AtomicU32::new(0));
//! let next = counter.clone();
//!
//! let mut container = Container::new();
//! container
//!     .register_factory(move |_| RequestId(next.fetch_add(1, Ordering::SeqCst)))
//!     .per_scope();
//!
//! let scope1 = container.create_scope();
//! let scope2 = container.create_scope();
//!
//! let req1 = scope1.resolve::<RequestId>().unwrap();
//! let req2 = scope2.resolve::<RequestId>().unwrap();
//! assert_ne!(req1.0, req2.0);
//! assert_eq!(counter.load(Ordering::SeqCst), 2);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (registration, scope lifecycle,
//! resolution, disposal) and never installs a subscriber itself.

pub mod config;
pub mod descriptor;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod traits;
pub mod validation;

mod internal;
mod registration;

pub use config::ContainerOptions;
pub use descriptor::{Arguments, Constructor, ConstructorBuilder, Injectable, TypeDescriptor, Visibility};
pub use descriptors::{FactoryKind, ServiceDescriptor};
pub use error::{BoxedError, DiError, DiResult};
pub use key::ServiceId;
pub use lifetime::Lifetime;
pub use provider::{Container, ResolverContext, Scope};
pub use registration::RegistrationHandle;
pub use traits::{Dispose, Resolver, ResolverCore};
pub use validation::{ValidationReport, ValidationWarning};
