//! Per-scope instance cache.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use super::FastMap;
use crate::registration::AnyArc;

/// Instance slots owned by one scope (or by the root acting as default scope).
///
/// Slots are keyed by the registry entry serial, so a re-registered service
/// starts from an empty slot. The map lock is held only long enough to fetch
/// or insert a slot; initialisation happens on the slot itself, which lets
/// different services initialise in parallel while one service initialises
/// at most once.
#[derive(Default)]
pub(crate) struct InstanceCache {
    slots: Mutex<FastMap<u64, Arc<OnceCell<AnyArc>>>>,
}

impl InstanceCache {
    pub(crate) fn slot(&self, serial: u64) -> Arc<OnceCell<AnyArc>> {
        self.slots.lock().entry(serial).or_default().clone()
    }

    /// Drops every cached instance, returning how many were held.
    pub(crate) fn clear(&self) -> usize {
        let mut slots = self.slots.lock();
        let held = slots.values().filter(|slot| slot.get().is_some()).count();
        slots.clear();
        held
    }

    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }
}
