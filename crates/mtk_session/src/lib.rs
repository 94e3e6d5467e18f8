//! # MTK Session Host
//!
//! Runs one [`MiningEngine`](mtk_economy::MiningEngine) behind a serialized
//! dispatcher and connects it to the outside world through ports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐                ┌──────────────────────────┐
//! │ Presentation│──strike/buy──> │        Dispatcher        │
//! │   (input)   │                │  select! over:           │
//! └─────────────┘                │   - command queue        │
//! ┌─────────────┐                │   - tick timer (re-armed)│
//! │   Wallet    │──withdrawal──> │   - respawn deadline     │
//! └─────────────┘                └────────────┬─────────────┘
//!        ▲                                    │ events, notices, snapshots
//!        └────────── WalletPort ◄─────────────┼──────────► PresentationPort
//! ```
//!
//! Every trigger funnels through one thread, so no two engine operations ever
//! interleave. Hosts that already own a thread pool can use
//! [`SharedEngine`] instead, which serializes through an exclusive lock.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod activity;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod format;
pub mod ports;
pub mod shared;
pub mod withdrawal;

pub use activity::{ActivityEntry, ActivityLog};
pub use dispatcher::{DispatchStats, Session, SessionClient, SessionHandle};
pub use error::{SessionError, SessionResult, WithdrawalError};
pub use events::{event_channel, ChannelPresenter, EventReceiver, EventSender, SessionEvent};
pub use ports::{Notice, NoticeLevel, NullWallet, PresentationPort, Viewport, WalletPort};
pub use shared::SharedEngine;
pub use withdrawal::{TransactionHistory, TransferReceipt, TransferStatus, WithdrawalRequest};
