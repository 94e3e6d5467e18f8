//! # Economy Events
//!
//! Discrete notifications emitted by the engine after a state change.
//!
//! Consumers:
//! - Presentation: floating "+N MTK" labels, redraws, activity log
//! - Wallet: reconciles the claimed balance against the chain

use serde::Serialize;

use crate::spots::Point;
use crate::upgrades::UpgradeKind;

/// Events emitted by [`MiningEngine`](crate::MiningEngine).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EconomyEvent {
    /// Coins were mined from a spot.
    CoinsEarned {
        /// Coins awarded.
        amount: u64,
        /// Spot that produced them.
        spot_index: usize,
        /// `true` for a tick hit, `false` for a strike.
        auto: bool,
    },
    /// An upgrade was bought.
    UpgradePurchased {
        /// Upgrade kind.
        kind: UpgradeKind,
        /// Level after the purchase.
        new_level: u32,
    },
    /// Claimable balance moved into the wallet balance.
    TokensClaimed {
        /// Amount moved.
        amount: u64,
    },
    /// A struck spot came back.
    SpotRespawned {
        /// Spot index.
        spot_index: usize,
        /// New centre.
        position: Point,
    },
}

impl EconomyEvent {
    /// Coins awarded by this event, if it is a mining event.
    #[must_use]
    pub const fn mined_amount(&self) -> Option<u64> {
        match self {
            Self::CoinsEarned { amount, .. } => Some(*amount),
            _ => None,
        }
    }
}
