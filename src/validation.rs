//! Registration-graph validation.
//!
//! Validation walks the declared dependencies of type-based registrations
//! without constructing anything. Supplied factories declare no dependencies
//! and are only checked when they run.
//!
//! # Rules
//!
//! - **Missing dependency**: error. A type-based registration names a
//!   parameter that has no registry entry.
//! - **Singleton → PerScope**: warning. The singleton is built against the
//!   root and keeps the root's per-scope instance for its whole life.

use std::fmt;

use crate::descriptors::FactoryKind;
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;
use crate::registration::Registry;

/// A registration that is legal but probably not what was intended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A singleton depends on a per-scope service.
    SingletonCapturesScoped {
        singleton: &'static str,
        dependency: &'static str,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::SingletonCapturesScoped {
                singleton,
                dependency,
            } => write!(
                f,
                "singleton {singleton} captures the root instance of per-scope {dependency}"
            ),
        }
    }
}

/// Outcome of [`Container::validation_report`](crate::Container::validation_report).
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Problems that make resolution fail.
    pub errors: Vec<DiError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when there are no errors, otherwise [`DiError::Validation`].
    pub fn into_result(self) -> DiResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DiError::Validation(self.errors))
        }
    }
}

pub(crate) fn inspect(registry: &Registry) -> ValidationReport {
    let mut entries: Vec<_> = registry.iter().collect();
    entries.sort_by(|a, b| a.id.cmp(&b.id));

    let mut report = ValidationReport::default();
    for entry in entries {
        let FactoryKind::Type { dependencies, .. } = &entry.kind else {
            continue;
        };
        for dependency in dependencies {
            match registry.get(dependency) {
                None => report.errors.push(DiError::UnresolvedDependency {
                    dependency: dependency.display_name(),
                    required_by: entry.id.display_name(),
                }),
                Some(target)
                    if entry.lifetime == Lifetime::Singleton
                        && target.lifetime == Lifetime::PerScope =>
                {
                    report.warnings.push(ValidationWarning::SingletonCapturesScoped {
                        singleton: entry.id.display_name(),
                        dependency: dependency.display_name(),
                    })
                }
                Some(_) => {}
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Container, TypeDescriptor};
    use std::sync::Arc;

    struct Db;
    struct Repo(#[allow(dead_code)] Arc<Db>);
    struct Cache;
    struct Service(#[allow(dead_code)] Arc<Repo>, #[allow(dead_code)] Arc<Cache>);

    fn repo() -> TypeDescriptor<Repo> {
        TypeDescriptor::new()
            .public_constructor()
            .param::<Db>()
            .build(|args| Ok(Repo(args.next()?)))
    }

    fn service() -> TypeDescriptor<Service> {
        TypeDescriptor::new()
            .public_constructor()
            .param::<Repo>()
            .param::<Cache>()
            .build(|args| Ok(Service(args.next()?, args.next()?)))
    }

    #[test]
    fn collects_every_missing_dependency() {
        let mut container = Container::new();
        container.register_type(repo()).unwrap();
        container.register_type(service()).unwrap();

        let report = container.validation_report();
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
        match container.validate() {
            Err(DiError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn complete_graph_is_valid() {
        let mut container = Container::new();
        container.register_factory(|_| Db).as_singleton();
        container.register_factory(|_| Cache);
        container.register_type(repo()).unwrap();
        container.register_type(service()).unwrap();
        assert!(container.validate().is_ok());
    }

    #[test]
    fn singleton_over_per_scope_warns() {
        let mut container = Container::new();
        container.register_factory(|_| Db).per_scope();
        container.register_type(repo()).unwrap().as_singleton();

        let report = container.validation_report();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].to_string().contains("captures"));
        assert!(container.validate().is_ok());
    }
}
