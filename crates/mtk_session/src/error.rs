//! # Session Error Types

use mtk_economy::EconomyError;
use thiserror::Error;

/// Client-side withdrawal validation failures.
///
/// These are caught before a transfer is ever submitted, so no gas is spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    /// Amount is zero.
    #[error("enter a valid amount")]
    InvalidAmount,

    /// Recipient is not a `0x`-prefixed 40 hex digit address.
    #[error("enter a valid address: {0:?}")]
    InvalidRecipient(String),

    /// Amount exceeds the tracked wallet balance.
    #[error("insufficient balance: requested {requested}, you have {available} tokens")]
    InsufficientBalance {
        /// Amount asked for.
        requested: u64,
        /// Wallet token balance.
        available: u64,
    },
}

/// Errors returned by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The dispatcher thread is gone.
    #[error("session dispatcher has shut down")]
    Disconnected,

    /// The engine rejected the command.
    #[error(transparent)]
    Economy(#[from] EconomyError),

    /// Withdrawal validation failed.
    #[error(transparent)]
    Withdrawal(#[from] WithdrawalError),

    /// The dispatcher thread could not be started.
    #[error("failed to spawn dispatcher: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
