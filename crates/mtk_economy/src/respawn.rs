//! # Respawn Queue
//!
//! Delayed respawns keyed by spot index, ordered by deadline.
//!
//! The queue never sleeps or spawns threads. The host asks for
//! [`RespawnQueue::next_deadline`], arms whatever timer it owns, and hands the
//! current instant back to
//! [`MiningEngine::process_respawns`](crate::MiningEngine::process_respawns) on
//! the same serialized path as every other command.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

/// A scheduled respawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PendingRespawn {
    /// When the spot comes back.
    pub due: Instant,
    /// Which spot comes back.
    pub spot_index: usize,
}

/// Min-heap of pending respawns.
#[derive(Clone, Debug, Default)]
pub struct RespawnQueue {
    heap: BinaryHeap<Reverse<PendingRespawn>>,
}

impl RespawnQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `spot_index` to respawn at `due`.
    pub fn schedule(&mut self, spot_index: usize, due: Instant) {
        self.heap.push(Reverse(PendingRespawn { due, spot_index }));
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(p)| p.due)
    }

    /// Pops the earliest respawn if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<PendingRespawn> {
        match self.heap.peek() {
            Some(Reverse(p)) if p.due <= now => self.heap.pop().map(|Reverse(p)| p),
            _ => None,
        }
    }

    /// Number of pending respawns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every pending respawn.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_pops_in_deadline_order() {
        let now = Instant::now();
        let mut queue = RespawnQueue::new();
        queue.schedule(2, now + Duration::from_millis(300));
        queue.schedule(0, now + Duration::from_millis(100));
        queue.schedule(1, now + Duration::from_millis(200));

        assert_eq!(queue.next_deadline(), Some(now + Duration::from_millis(100)));

        let later = now + Duration::from_secs(1);
        let order: Vec<usize> = std::iter::from_fn(|| queue.pop_due(later))
            .map(|p| p.spot_index)
            .collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_not_due_stays_queued() {
        let now = Instant::now();
        let mut queue = RespawnQueue::new();
        queue.schedule(4, now + Duration::from_millis(50));

        assert!(queue.pop_due(now).is_none());
        assert_eq!(queue.next_deadline(), Some(now + Duration::from_millis(50)));
        assert_eq!(queue.len(), 1);

        let popped = queue.pop_due(now + Duration::from_millis(50)).unwrap();
        assert_eq!(popped.spot_index, 4);
    }

    #[test]
    fn test_clear_cancels_everything() {
        let now = Instant::now();
        let mut queue = RespawnQueue::new();
        queue.schedule(0, now);
        queue.schedule(1, now);
        queue.clear();
        assert!(queue.next_deadline().is_none());
        assert!(queue.pop_due(now).is_none());
    }
}
