//! # MTK Economy Engine
//!
//! The economy state machine behind the MTK mining mini-game.
//!
//! ## Design Principles
//!
//! 1. **Single owner** - One [`MiningEngine`] owns one [`EconomyState`]; all
//!    mutation goes through its methods
//! 2. **No clocks, no threads** - The engine never arms a timer. The host
//!    calls [`MiningEngine::tick`] on its own schedule and drains respawns via
//!    [`MiningEngine::process_respawns`]
//! 3. **Events out** - Every successful mutation emits an [`EconomyEvent`]
//!    that the presentation and wallet layers consume
//! 4. **External configuration** - All tuning lives in [`EngineConfig`],
//!    loadable from TOML
//!
//! ## Thread Safety
//!
//! `MiningEngine` is `Send` but not internally synchronized. Hosts must
//! serialize every call, either through a single dispatcher or an exclusive
//! lock held for the whole operation.
//!
//! ## Example
//!
//! ```rust
//! use mtk_economy::{EngineConfig, MiningEngine, UpgradeKind};
//!
//! let mut engine = MiningEngine::new(EngineConfig::default()).unwrap();
//!
//! // A miss is not an error.
//! assert!(!engine.strike(99));
//!
//! // Nothing mined yet, so the purchase is rejected.
//! assert!(engine.purchase(UpgradeKind::Power).is_err());
//!
//! if engine.strike(0) {
//!     assert_eq!(engine.state().score(), 10);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod respawn;
pub mod spots;
pub mod state;
pub mod upgrades;

pub use config::{EngineConfig, FieldConfig};
pub use engine::{MiningEngine, PurchaseOutcome};
pub use error::{EconomyError, EconomyResult};
pub use events::EconomyEvent;
pub use respawn::{PendingRespawn, RespawnQueue};
pub use spots::{MineSpot, Point, SpotField};
pub use state::{EconomySnapshot, EconomyState, SpeedMultiplier};
pub use upgrades::{UpgradeCosts, UpgradeKind};
