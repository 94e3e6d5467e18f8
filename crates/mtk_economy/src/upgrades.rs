//! # Upgrades
//!
//! The three purchasable upgrades and their price list.
//!
//! | Kind  | Default cost | Effect                      |
//! |-------|--------------|-----------------------------|
//! | Power | 100 MTK      | `mining_power += 1`         |
//! | Miner | 500 MTK      | `miner_count += 1`          |
//! | Speed | 250 MTK      | `mining_speed += 0.5`       |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EconomyError;

/// A purchasable upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Adds one to mining power (scales both clicks and auto-mining).
    Power,
    /// Hires one more miner (scales auto-mining).
    Miner,
    /// Adds 0.5 to the speed multiplier (shortens the tick interval).
    Speed,
}

impl UpgradeKind {
    /// Every kind, in shop order.
    pub const ALL: [Self; 3] = [Self::Power, Self::Miner, Self::Speed];

    /// Stable lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Miner => "miner",
            Self::Speed => "speed",
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UpgradeKind {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "power" | "mining_power" => Ok(Self::Power),
            "miner" | "miners" => Ok(Self::Miner),
            "speed" | "mining_speed" => Ok(Self::Speed),
            _ => Err(EconomyError::InvalidUpgradeKind(s.to_owned())),
        }
    }
}

/// Fixed upgrade prices, in MTK.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpgradeCosts {
    /// Price of a Power upgrade.
    pub power: u64,
    /// Price of a Miner purchase.
    pub miner: u64,
    /// Price of a Speed upgrade.
    pub speed: u64,
}

impl UpgradeCosts {
    /// Returns the price of `kind`.
    #[inline]
    #[must_use]
    pub const fn cost(&self, kind: UpgradeKind) -> u64 {
        match kind {
            UpgradeKind::Power => self.power,
            UpgradeKind::Miner => self.miner,
            UpgradeKind::Speed => self.speed,
        }
    }
}

impl Default for UpgradeCosts {
    fn default() -> Self {
        Self {
            power: 100,
            miner: 500,
            speed: 250,
        }
    }
}
