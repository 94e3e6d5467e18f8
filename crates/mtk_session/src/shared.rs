//! # Shared Engine
//!
//! For multi-threaded hosts that drive the engine from several threads
//! without a dispatcher. Every operation holds the exclusive lock for its
//! whole duration, so operations never interleave mid-mutation.
//!
//! Callers own event delivery: call [`SharedEngine::drain_events`] after
//! each batch of operations. Undrained events pile up until the engine's
//! buffer is full (`mtk_economy::engine::MAX_PENDING_EVENTS`), after which
//! the oldest are lost.

use std::sync::Arc;
use std::time::Instant;

use mtk_economy::{
    EconomyEvent, EconomyResult, EconomySnapshot, MiningEngine, PurchaseOutcome, UpgradeKind,
};
use parking_lot::Mutex;

/// Cloneable, lock-guarded handle to one engine.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<MiningEngine>>,
}

impl SharedEngine {
    /// Wraps an engine.
    #[must_use]
    pub fn new(engine: MiningEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// See [`MiningEngine::tick`].
    pub fn tick(&self) -> u64 {
        self.inner.lock().tick()
    }

    /// See [`MiningEngine::strike`].
    pub fn strike(&self, spot_index: usize) -> bool {
        self.inner.lock().strike(spot_index)
    }

    /// See [`MiningEngine::purchase`].
    ///
    /// # Errors
    ///
    /// Same as [`MiningEngine::purchase`].
    pub fn purchase(&self, kind: UpgradeKind) -> EconomyResult<PurchaseOutcome> {
        self.inner.lock().purchase(kind)
    }

    /// See [`MiningEngine::claim`].
    ///
    /// # Errors
    ///
    /// Same as [`MiningEngine::claim`].
    pub fn claim(&self) -> EconomyResult<u64> {
        self.inner.lock().claim()
    }

    /// See [`MiningEngine::report_withdrawal`].
    ///
    /// # Errors
    ///
    /// Same as [`MiningEngine::report_withdrawal`].
    pub fn report_withdrawal(&self, amount: u64) -> EconomyResult<()> {
        self.inner.lock().report_withdrawal(amount)
    }

    /// See [`MiningEngine::process_respawns`].
    pub fn process_respawns(&self, now: Instant) -> usize {
        self.inner.lock().process_respawns(now)
    }

    /// See [`MiningEngine::snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> EconomySnapshot {
        self.inner.lock().snapshot()
    }

    /// See [`MiningEngine::drain_events`]. Must be called regularly.
    #[must_use]
    pub fn drain_events(&self) -> Vec<EconomyEvent> {
        self.inner.lock().drain_events()
    }

    /// Runs `f` with read access to the engine under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&MiningEngine) -> R) -> R {
        f(&self.inner.lock())
    }
}
