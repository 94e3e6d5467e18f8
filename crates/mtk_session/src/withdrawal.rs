//! # Withdrawals
//!
//! Wallet-side checks that run before a transfer is submitted, and the
//! history of transfers that came back.
//!
//! ## Flow
//!
//! ```text
//! 1. WithdrawalRequest::validate()   - amount, recipient, balance (no gas spent)
//! 2. wallet submits transfer          - outside this crate
//! 3. TransferReceipt recorded         - Confirmed receipts debit the ledger
//! ```

use std::collections::VecDeque;
use std::time::SystemTime;

use alloy_primitives::Address;
use mtk_economy::EconomySnapshot;
use serde::Serialize;

use crate::error::WithdrawalError;

/// Default number of transfers kept in the history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// A validated withdrawal, ready to submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawalRequest {
    /// Tokens to transfer.
    pub amount: u64,
    /// Destination.
    pub recipient: Address,
}

impl WithdrawalRequest {
    /// Validates a withdrawal against the current ledger.
    ///
    /// # Errors
    ///
    /// - [`WithdrawalError::InvalidAmount`] for zero
    /// - [`WithdrawalError::InvalidRecipient`] unless the recipient is
    ///   `0x` followed by exactly 40 hex digits
    /// - [`WithdrawalError::InsufficientBalance`] if the amount exceeds the
    ///   wallet token balance
    pub fn validate(
        amount: u64,
        recipient: &str,
        ledger: &EconomySnapshot,
    ) -> Result<Self, WithdrawalError> {
        if amount == 0 {
            return Err(WithdrawalError::InvalidAmount);
        }

        let recipient = parse_recipient(recipient)?;

        let available = ledger.wallet_token_balance;
        if amount > available {
            return Err(WithdrawalError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        Ok(Self { amount, recipient })
    }
}

fn parse_recipient(raw: &str) -> Result<Address, WithdrawalError> {
    let trimmed = raw.trim();
    let invalid = || WithdrawalError::InvalidRecipient(raw.to_owned());

    let digits = trimmed.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    trimmed.parse::<Address>().map_err(|_| invalid())
}

/// How a submitted transfer ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Mined with a success status.
    Confirmed,
    /// Reverted or dropped.
    Failed,
}

/// Outcome of a submitted transfer, as reported by the wallet layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    /// Transaction hash.
    pub tx_hash: String,
    /// Tokens transferred.
    pub amount: u64,
    /// Destination.
    pub recipient: Address,
    /// Final status.
    pub status: TransferStatus,
    /// When the outcome was recorded.
    pub recorded_at: SystemTime,
}

impl TransferReceipt {
    /// Builds a receipt for a request that has just resolved.
    #[must_use]
    pub fn new(
        request: &WithdrawalRequest,
        tx_hash: impl Into<String>,
        status: TransferStatus,
    ) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            amount: request.amount,
            recipient: request.recipient,
            status,
            recorded_at: SystemTime::now(),
        }
    }

    /// True if the transfer went through.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == TransferStatus::Confirmed
    }
}

/// Bounded, newest-first transfer history.
#[derive(Clone, Debug)]
pub struct TransactionHistory {
    entries: VecDeque<TransferReceipt>,
    capacity: usize,
}

impl TransactionHistory {
    /// Creates a history keeping at most `capacity` receipts.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds a receipt at the front, evicting the oldest past capacity.
    pub fn record(&mut self, receipt: TransferReceipt) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(receipt);
        self.entries.truncate(self.capacity);
    }

    /// Receipts, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &TransferReceipt> {
        self.entries.iter()
    }

    /// Number of receipts held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransactionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtk_economy::{EngineConfig, MiningEngine};

    const RECIPIENT: &str = "0x779877A7B0D9E8603169DdbD7836e478b4624789";

    fn ledger_with_balance(strikes: usize) -> EconomySnapshot {
        let mut engine = MiningEngine::new(EngineConfig {
            auto_mine_chance: 0.0,
            seed: Some(1),
            ..EngineConfig::default()
        })
        .unwrap();
        for index in 0..strikes {
            assert!(engine.strike(index));
        }
        if strikes > 0 {
            engine.claim().unwrap();
        }
        engine.snapshot()
    }

    #[test]
    fn test_valid_request() {
        let ledger = ledger_with_balance(3);
        let request = WithdrawalRequest::validate(30, RECIPIENT, &ledger).unwrap();
        assert_eq!(request.amount, 30);
        assert_eq!(request.recipient, RECIPIENT.parse::<Address>().unwrap());
    }

    #[test]
    fn test_zero_amount() {
        let ledger = ledger_with_balance(1);
        assert_eq!(
            WithdrawalRequest::validate(0, RECIPIENT, &ledger),
            Err(WithdrawalError::InvalidAmount)
        );
    }

    #[test]
    fn test_bad_recipients() {
        let ledger = ledger_with_balance(1);
        for bad in [
            "",
            "779877A7B0D9E8603169DdbD7836e478b4624789",
            "0x779877A7B0D9E8603169DdbD7836e478b462478",
            "0x779877A7B0D9E8603169DdbD7836e478b46247890",
            "0xZZ9877A7B0D9E8603169DdbD7836e478b4624789",
        ] {
            assert!(
                matches!(
                    WithdrawalRequest::validate(1, bad, &ledger),
                    Err(WithdrawalError::InvalidRecipient(_))
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_insufficient_balance_checked_locally() {
        let ledger = ledger_with_balance(2);
        assert_eq!(
            WithdrawalRequest::validate(21, RECIPIENT, &ledger),
            Err(WithdrawalError::InsufficientBalance {
                requested: 21,
                available: 20
            })
        );
    }

    #[test]
    fn test_history_bounded_newest_first() {
        let ledger = ledger_with_balance(1);
        let request = WithdrawalRequest::validate(1, RECIPIENT, &ledger).unwrap();
        let mut history = TransactionHistory::default();
        for i in 0..12 {
            let status = if i % 2 == 0 {
                TransferStatus::Confirmed
            } else {
                TransferStatus::Failed
            };
            history.record(TransferReceipt::new(&request, format!("0x{i:064x}"), status));
        }

        assert_eq!(history.len(), 10);
        let newest = history.entries().next().unwrap();
        assert_eq!(newest.tx_hash, format!("0x{:064x}", 11));
        assert!(!newest.is_confirmed());
    }
}
