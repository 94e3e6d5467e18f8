//! # Activity Log
//!
//! The "recent activity" feed: newest first, bounded.
//!
//! Only player actions are logged. Auto-mining ticks and respawns would bury
//! everything else.

use std::collections::VecDeque;
use std::time::SystemTime;

use mtk_economy::{EconomyEvent, UpgradeKind};
use serde::Serialize;

/// Default number of entries kept.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 10;

/// One feed line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    /// Short heading, e.g. "Claimed".
    pub title: String,
    /// Detail, e.g. "120 MTK".
    pub detail: String,
    /// Wall-clock time of the action.
    pub at: SystemTime,
}

/// Bounded, newest-first activity feed.
#[derive(Clone, Debug)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl ActivityLog {
    /// Creates a log keeping at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds an entry at the front, evicting the oldest past capacity.
    pub fn record(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(ActivityEntry {
            title: title.into(),
            detail: detail.into(),
            at: SystemTime::now(),
        });
        self.entries.truncate(self.capacity);
    }

    /// Logs an engine event if it is a player action.
    pub fn record_event(&mut self, event: &EconomyEvent) {
        match *event {
            EconomyEvent::CoinsEarned {
                amount,
                auto: false,
                ..
            } => self.record("Mined Coins", format!("+{amount} MTK")),
            EconomyEvent::UpgradePurchased { kind, .. } => match kind {
                UpgradeKind::Power => self.record("Upgraded", "Mining Power +1"),
                UpgradeKind::Miner => self.record("Purchased", "New Miner"),
                UpgradeKind::Speed => self.record("Upgraded", "Mining Speed"),
            },
            EconomyEvent::TokensClaimed { amount } => {
                self.record("Claimed", format!("{amount} MTK"));
            }
            EconomyEvent::CoinsEarned { auto: true, .. } | EconomyEvent::SpotRespawned { .. } => {}
        }
    }

    /// Logs a confirmed withdrawal.
    pub fn record_withdrawal(&mut self, amount: u64) {
        self.record("Withdrawn", format!("{amount} tokens"));
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAPACITY)
    }
}
