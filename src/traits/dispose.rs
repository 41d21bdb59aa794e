//! Disposal capability for resource cleanup.

/// Capability trait for services that hold resources needing explicit release.
///
/// The container never guesses: a registration opts in with
/// [`RegistrationHandle::disposable`](crate::RegistrationHandle::disposable),
/// and from then on every *cached* instance of that registration is disposed
/// exactly once when its owning cache is torn down. Singletons are disposed
/// with the root [`Container`](crate::Container), per-scope instances with
/// the [`Scope`](crate::Scope) that created them. Transient instances are
/// never tracked; whoever resolved them owns them.
///
/// # Examples
///
/// ```
/// use scopewire::{Container, Dispose, Resolver};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct Connection {
///     closed: AtomicBool,
/// }
///
/// impl Dispose for Connection {
///     fn dispose(&self) {
///         self.closed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let mut container = Container::new();
/// container
///     .register_factory(|_| Connection::default())
///     .per_scope()
///     .disposable();
///
/// let scope = container.create_scope();
/// let conn = scope.resolve::<Connection>().unwrap();
/// assert!(!conn.closed.load(Ordering::SeqCst));
///
/// scope.dispose();
/// assert!(conn.closed.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Release the resources held by this instance.
    fn dispose(&self);
}
