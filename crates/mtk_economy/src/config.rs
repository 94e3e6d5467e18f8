//! # Engine Configuration
//!
//! Tuning knobs for one mining session, loaded once at startup.
//!
//! Every field is optional in TOML; missing fields fall back to the values
//! the game shipped with:
//!
//! ```toml
//! spot_count = 5
//! base_tick_interval_ms = 1000
//! auto_mine_chance = 0.3
//! click_yield = 10
//! respawn_delay_ms = 1000
//!
//! [upgrade_costs]
//! power = 100
//! miner = 500
//! speed = 250
//!
//! [field]
//! width = 800.0
//! height = 400.0
//! margin = 40.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, EconomyResult};
use crate::upgrades::UpgradeCosts;

/// Geometry of the field the spots are scattered over.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    /// Field width in field units.
    pub width: f32,
    /// Field height in field units.
    pub height: f32,
    /// Minimum distance between a spot centre and the field edge.
    pub margin: f32,
    /// Smallest spot radius.
    pub min_radius: f32,
    /// Largest spot radius (exclusive unless equal to `min_radius`).
    pub max_radius: f32,
    /// Extra distance around a spot that still counts as a hit.
    pub hit_slop: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            margin: 40.0,
            min_radius: 10.0,
            max_radius: 20.0,
            hit_slop: 10.0,
        }
    }
}

/// Configuration for a [`MiningEngine`](crate::MiningEngine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of mine spots on the field.
    pub spot_count: usize,
    /// Tick interval at speed multiplier 1.0.
    pub base_tick_interval_ms: u64,
    /// Upgrade price list.
    pub upgrade_costs: UpgradeCosts,
    /// Chance per active spot per tick of an auto-mining hit, in `[0, 1]`.
    pub auto_mine_chance: f64,
    /// Click multiplier: a strike yields `mining_power * click_yield`.
    pub click_yield: u64,
    /// Delay between a strike and the spot coming back.
    pub respawn_delay_ms: u64,
    /// Field geometry.
    pub field: FieldConfig,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            spot_count: 5,
            base_tick_interval_ms: 1000,
            upgrade_costs: UpgradeCosts::default(),
            auto_mine_chance: 0.3,
            click_yield: 10,
            respawn_delay_ms: 1000,
            field: FieldConfig::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] on a parse failure or when a
    /// value is out of range.
    pub fn from_toml_str(text: &str) -> EconomyResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ConfigIo`] if the file cannot be read, or any
    /// error of [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> EconomyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EconomyError::ConfigIo(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> EconomyResult<()> {
        fn invalid(msg: &str) -> EconomyResult<()> {
            Err(EconomyError::InvalidConfig(msg.to_owned()))
        }

        if self.spot_count == 0 {
            return invalid("spot_count must be at least 1");
        }
        if self.base_tick_interval_ms == 0 {
            return invalid("base_tick_interval_ms must be positive");
        }
        if !(0.0..=1.0).contains(&self.auto_mine_chance) {
            return invalid("auto_mine_chance must be within [0, 1]");
        }
        if self.click_yield == 0 {
            return invalid("click_yield must be positive");
        }

        let field = &self.field;
        let finite = [
            field.width,
            field.height,
            field.margin,
            field.min_radius,
            field.max_radius,
            field.hit_slop,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return invalid("field values must be finite");
        }
        if field.margin < 0.0 || field.hit_slop < 0.0 {
            return invalid("field margin and hit_slop must be non-negative");
        }
        if field.width <= field.margin * 2.0 || field.height <= field.margin * 2.0 {
            return invalid("field must be larger than twice its margin");
        }
        if field.min_radius <= 0.0 || field.max_radius < field.min_radius {
            return invalid("field radii must satisfy 0 < min_radius <= max_radius");
        }
        Ok(())
    }

    /// Tick interval at speed multiplier 1.0.
    #[inline]
    #[must_use]
    pub const fn base_tick_interval(&self) -> Duration {
        Duration::from_millis(self.base_tick_interval_ms)
    }

    /// Delay between a strike and the spot's respawn.
    #[inline]
    #[must_use]
    pub const fn respawn_delay(&self) -> Duration {
        Duration::from_millis(self.respawn_delay_ms)
    }
}
