use scopewire::{Container, ContainerOptions, DiError, Dispose, Resolver};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct Connection {
    name: &'static str,
    log: Log,
}

impl Dispose for Connection {
    fn dispose(&self) {
        self.log.push(format!("dispose {}", self.name));
    }
}

struct Pool {
    log: Log,
}

impl Dispose for Pool {
    fn dispose(&self) {
        self.log.push("dispose pool");
    }
}

fn install_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn container_with(log: &Log, options: ContainerOptions) -> Container {
    let mut container = Container::with_options(options);
    let conn_log = log.clone();
    container
        .register_factory(move |_| Connection {
            name: "conn",
            log: conn_log.clone(),
        })
        .per_scope()
        .disposable();
    let pool_log = log.clone();
    container
        .register_factory(move |_| Pool {
            log: pool_log.clone(),
        })
        .as_singleton()
        .disposable();
    container
}

#[test]
fn test_scope_disposes_its_instances_and_not_before() {
    let log = Log::default();
    let container = container_with(&log, ContainerOptions::default());

    let scope = container.create_scope();
    scope.resolve::<Connection>().unwrap();
    scope.resolve::<Connection>().unwrap();
    assert!(log.entries().is_empty());

    scope.dispose();
    assert_eq!(log.entries(), vec!["dispose conn"]);
}

#[test]
fn test_singleton_disposed_with_root_only() {
    let log = Log::default();
    let container = container_with(&log, ContainerOptions::default());

    let scope = container.create_scope();
    scope.resolve::<Pool>().unwrap();
    scope.dispose();
    assert!(log.entries().is_empty());

    container.dispose();
    assert_eq!(log.entries(), vec!["dispose pool"]);
}

#[test]
fn test_root_disposal_ignores_undisposed_scopes() {
    let log = Log::default();
    let container = container_with(&log, ContainerOptions::new().dispose_on_drop(false));

    let scope = container.create_scope();
    scope.resolve::<Connection>().unwrap();
    container.resolve::<Connection>().unwrap();

    container.dispose();
    assert_eq!(log.entries(), vec!["dispose conn"]);
    assert!(!scope.is_disposed());

    scope.dispose();
    assert_eq!(log.entries(), vec!["dispose conn", "dispose conn"]);
}

#[test]
fn test_dispose_is_idempotent() {
    let log = Log::default();
    let container = container_with(&log, ContainerOptions::default());
    let scope = container.create_scope();
    scope.resolve::<Connection>().unwrap();

    scope.dispose();
    scope.dispose();
    drop(scope);
    assert_eq!(log.entries().len(), 1);
}

#[test]
fn test_use_after_dispose_fails() {
    let log = Log::default();
    let container = container_with(&log, ContainerOptions::default());
    let scope = container.create_scope();
    scope.dispose();

    match scope.resolve::<Connection>() {
        Err(DiError::UseAfterDispose(context)) => assert!(context.starts_with("scope #")),
        other => panic!("expected UseAfterDispose, got {:?}", other.err()),
    }

    container.dispose();
    assert!(matches!(
        container.resolve::<Pool>(),
        Err(DiError::UseAfterDispose(_))
    ));
}

#[test]
fn test_scope_cannot_reach_singletons_of_disposed_root() {
    let log = Log::default();
    let container = container_with(&log, ContainerOptions::default());
    let scope = container.create_scope();

    container.dispose();
    assert!(matches!(
        scope.resolve::<Pool>(),
        Err(DiError::UseAfterDispose(context)) if context.starts_with("container #")
    ));
    assert!(scope.resolve::<Connection>().is_ok());
}

#[test]
fn test_transients_are_never_tracked() {
    let log = Log::default();
    let mut container = Container::new();
    let conn_log = log.clone();
    container
        .register_factory(move |_| Connection {
            name: "transient",
            log: conn_log.clone(),
        })
        .disposable();

    let scope = container.create_scope();
    let conn = scope.resolve::<Connection>().unwrap();
    scope.dispose();
    assert!(log.entries().is_empty());

    conn.dispose();
    assert_eq!(log.entries(), vec!["dispose transient"]);
}

#[test]
fn test_undeclared_capability_is_not_disposed() {
    let log = Log::default();
    let mut container = Container::new();
    let conn_log = log.clone();
    container
        .register_factory(move |_| Connection {
            name: "plain",
            log: conn_log.clone(),
        })
        .per_scope();

    let scope = container.create_scope();
    scope.resolve::<Connection>().unwrap();
    scope.dispose();
    assert!(log.entries().is_empty());
}

#[test]
fn test_drop_disposes_scope_and_container() {
    let log = Log::default();
    {
        let container = container_with(&log, ContainerOptions::default());
        container.resolve::<Pool>().unwrap();
        {
            let scope = container.create_scope();
            scope.resolve::<Connection>().unwrap();
        }
        assert_eq!(log.entries(), vec!["dispose conn"]);
    }
    assert_eq!(log.entries(), vec!["dispose conn", "dispose pool"]);
}

#[test]
fn test_drop_without_dispose_leaves_instances() {
    install_tracing();
    let log = Log::default();
    {
        let container = container_with(&log, ContainerOptions::new().dispose_on_drop(false));
        container.resolve::<Pool>().unwrap();
        let scope = container.create_scope();
        scope.resolve::<Connection>().unwrap();
    }
    assert!(log.entries().is_empty());
}

#[test]
fn test_panicking_disposer_does_not_stop_the_rest() {
    install_tracing();

    struct Faulty;
    impl Dispose for Faulty {
        fn dispose(&self) {
            panic!("faulty dispose");
        }
    }

    let log = Log::default();
    let mut container = container_with(&log, ContainerOptions::default());
    container.register_factory(|_| Faulty).per_scope().disposable();

    let scope = container.create_scope();
    scope.resolve::<Connection>().unwrap();
    scope.resolve::<Faulty>().unwrap();

    scope.dispose();
    assert!(scope.is_disposed());
    assert_eq!(log.entries(), vec!["dispose conn"]);
}

#[test]
fn test_every_disposable_instance_released_once() {
    let log = Log::default();
    let mut container = Container::new();
    for name in ["a", "b", "c"] {
        let conn_log = log.clone();
        // Each registration replaces the previous one; only the last is live.
        container
            .register_factory(move |_| Connection {
                name,
                log: conn_log.clone(),
            })
            .per_scope()
            .disposable();
    }
    let pool_log = log.clone();
    container
        .register_factory(move |_| Pool {
            log: pool_log.clone(),
        })
        .per_scope()
        .disposable();

    let scope = container.create_scope();
    scope.resolve::<Connection>().unwrap();
    scope.resolve::<Pool>().unwrap();
    scope.dispose();

    let mut entries = log.entries();
    entries.sort();
    assert_eq!(entries, vec!["dispose c", "dispose pool"]);
}

#[test]
fn test_orphaned_singleton_still_disposed_by_root() {
    let log = Log::default();
    let mut container = Container::new();
    let first_log = log.clone();
    container
        .register_factory(move |_| Connection {
            name: "old",
            log: first_log.clone(),
        })
        .as_singleton()
        .disposable();
    let old = container.resolve::<Connection>().unwrap();

    let second_log = log.clone();
    container
        .register_factory(move |_| Connection {
            name: "new",
            log: second_log.clone(),
        })
        .as_singleton()
        .disposable();
    let new = container.resolve::<Connection>().unwrap();
    assert_eq!((old.name, new.name), ("old", "new"));

    container.dispose();
    let mut entries = log.entries();
    entries.sort();
    assert_eq!(entries, vec!["dispose new", "dispose old"]);
}

#[test]
fn test_shared_instance_stays_singleton_and_disposes_once() {
    let log = Log::default();
    let mut container = Container::new();
    let handle = container
        .register_instance(Connection {
            name: "shared",
            log: log.clone(),
        })
        .per_scope()
        .disposable();
    assert_eq!(handle.lifetime(), scopewire::Lifetime::Singleton);

    let root = container.resolve::<Connection>().unwrap();
    for _ in 0..3 {
        let scope = container.create_scope();
        assert!(Arc::ptr_eq(&root, &scope.resolve::<Connection>().unwrap()));
        scope.dispose();
    }
    assert!(log.entries().is_empty());

    container.dispose();
    assert_eq!(log.entries(), vec!["dispose shared"]);
}
