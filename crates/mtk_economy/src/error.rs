//! # Economy Error Types
//!
//! All errors that can occur in the economy engine.
//!
//! A strike on an empty or out-of-range spot is deliberately absent: a missed
//! click is not an error.

use thiserror::Error;

use crate::upgrades::UpgradeKind;

/// Errors that can occur in the economy engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// Attempted to buy an upgrade without enough score.
    #[error("insufficient funds for {kind} upgrade: need {required} MTK, have {available}")]
    InsufficientFunds {
        /// The upgrade that was rejected.
        kind: UpgradeKind,
        /// The upgrade cost.
        required: u64,
        /// The score at call time.
        available: u64,
    },

    /// Claim requested with an empty claimable balance.
    #[error("no tokens to claim")]
    NothingToClaim,

    /// Upgrade name did not match any known kind.
    #[error("invalid upgrade kind: {0:?}")]
    InvalidUpgradeKind(String),

    /// Reported withdrawal is larger than the tracked wallet balance.
    #[error("withdrawal of {requested} exceeds wallet balance of {available}")]
    WithdrawalExceedsBalance {
        /// Amount reported as withdrawn.
        requested: u64,
        /// Wallet token balance at call time.
        available: u64,
    },

    /// Amount must be greater than zero.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Invalid configuration value or file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    ConfigIo(String),
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message() {
        let err = EconomyError::InsufficientFunds {
            kind: UpgradeKind::Miner,
            required: 500,
            available: 0,
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds for miner upgrade: need 500 MTK, have 0"
        );
    }

    #[test]
    fn test_invalid_kind_quotes_input() {
        let err = EconomyError::InvalidUpgradeKind("turbo".into());
        assert_eq!(err.to_string(), "invalid upgrade kind: \"turbo\"");
    }
}
