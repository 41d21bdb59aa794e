//! Internal disposal bag for managing cleanup hooks.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

type Disposer = Box<dyn FnOnce() + Send>;

/// Container for disposal hooks with LIFO execution order.
///
/// One bag belongs to each cache owner (the root container or a scope).
#[derive(Default)]
pub(crate) struct DisposeBag {
    hooks: Vec<(&'static str, Disposer)>,
}

impl DisposeBag {
    /// Add a disposal hook for the named service.
    pub(crate) fn push(&mut self, service: &'static str, f: Disposer) {
        self.hooks.push((service, f));
    }

    /// Execute all hooks in reverse order, returning how many ran.
    ///
    /// A panicking hook is logged and skipped; the remaining hooks still run.
    pub(crate) fn run_all_reverse(&mut self, owner: &str) -> usize {
        let mut ran = 0;
        while let Some((service, f)) = self.hooks.pop() {
            if catch_unwind(AssertUnwindSafe(f)).is_err() {
                error!(owner, service, "dispose panicked");
            }
            ran += 1;
        }
        ran
    }

    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
