//! Arena of live engine instances
//!
//! C callers never see an engine address. They get a non-zero token that
//! indexes this registry, so a stale or forged handle is looked up and
//! rejected instead of being dereferenced.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::core::backend::RoutingEngine;

/// Token identifying a registered engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(NonZeroU64);

impl HandleId {
    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// `None` for 0, the null handle.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }
}

type Table = HashMap<HandleId, Arc<dyn RoutingEngine>>;

static ENGINES: Lazy<RwLock<Table>> = Lazy::new(|| RwLock::new(HashMap::new()));

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Register `engine` and return its handle. Ids are never reused.
pub fn register(engine: Arc<dyn RoutingEngine>) -> HandleId {
    let raw = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    // Starts at 1 and would take centuries of registrations to wrap
    let id = HandleId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN));

    ENGINES
        .write()
        .unwrap_or_else(|err| err.into_inner())
        .insert(id, engine);
    id
}

/// Shared reference to a live engine.
///
/// The returned `Arc` keeps the engine alive even if the handle is released
/// while the caller is still using it.
pub fn lookup(id: HandleId) -> Option<Arc<dyn RoutingEngine>> {
    ENGINES
        .read()
        .unwrap_or_else(|err| err.into_inner())
        .get(&id)
        .cloned()
}

/// Unregister a handle. Returns `false` if it was unknown or already released.
pub fn release(id: HandleId) -> bool {
    let removed = ENGINES
        .write()
        .unwrap_or_else(|err| err.into_inner())
        .remove(&id);
    // Dropped outside the lock: tearing down a native engine can be slow
    removed.is_some()
}
