//! # Session Event Bus
//!
//! Lock-free fan-out from the dispatcher to whoever renders the game.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │ Dispatcher  │─────>│   Event     │─────>│  Renderer   │
//! │ (engine)    │      │   Channel   │      │  / tests    │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! [`ChannelPresenter`] is a [`PresentationPort`] that forwards everything
//! onto the bus, so a consumer on another thread can drain at its own pace.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use mtk_economy::{EconomyEvent, EconomySnapshot};

use crate::ports::{Notice, PresentationPort};

/// Everything the presentation side receives.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// An engine event.
    Economy(EconomyEvent),
    /// A toast.
    Notice(Notice),
    /// A full state snapshot.
    Snapshot(EconomySnapshot),
}

/// Creates the channel a [`ChannelPresenter`] publishes on.
///
/// At most `capacity` events wait undelivered; past that the presenter drops
/// new ones rather than stall the dispatcher.
#[must_use]
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (sender, receiver) = bounded(capacity);
    (EventSender { sender }, EventReceiver { receiver })
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<SessionEvent>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` if the event was dropped because the bus is full or
    /// every receiver is gone.
    #[inline]
    pub fn send(&self, event: SessionEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("session event bus full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<SessionEvent>,
}

impl EventReceiver {
    /// Takes every pending event without blocking.
    #[inline]
    pub fn drain(&self) -> Vec<SessionEvent> {
        self.receiver.try_iter().collect()
    }

    /// Waits up to `timeout` for the first event matching `pred`, discarding
    /// everything before it.
    pub fn wait_for(
        &self,
        timeout: Duration,
        mut pred: impl FnMut(&SessionEvent) -> bool,
    ) -> Option<SessionEvent> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(event) if pred(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

/// Presentation port that forwards onto an [`event_channel`].
#[derive(Clone)]
pub struct ChannelPresenter {
    sender: EventSender,
    snapshots: bool,
}

impl ChannelPresenter {
    /// Forwards events, notices and snapshots.
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        Self {
            sender,
            snapshots: true,
        }
    }

    /// Forwards events and notices only.
    #[must_use]
    pub fn without_snapshots(sender: EventSender) -> Self {
        Self {
            sender,
            snapshots: false,
        }
    }
}

impl PresentationPort for ChannelPresenter {
    fn on_event(&mut self, event: &EconomyEvent) {
        self.sender.send(SessionEvent::Economy(*event));
    }

    fn on_notice(&mut self, notice: &Notice) {
        self.sender.send(SessionEvent::Notice(notice.clone()));
    }

    fn on_snapshot(&mut self, snapshot: &EconomySnapshot) {
        if self.snapshots {
            self.sender.send(SessionEvent::Snapshot(*snapshot));
        }
    }
}
