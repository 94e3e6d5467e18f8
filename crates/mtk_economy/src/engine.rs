//! # Mining Engine
//!
//! Owns the [`EconomyState`] and the spot field, and applies every rule of
//! the mining game.
//!
//! ## Command Pipeline
//!
//! ```text
//! timer ───> tick()               ─┐
//! click ───> strike(index)         │
//! shop  ───> purchase(kind)        ├──> EconomyState ──> events ──> drain_events()
//! claim ───> claim()               │
//! chain ───> report_withdrawal()  ─┘
//! ```
//!
//! Every operation runs to completion synchronously. Failed operations leave
//! the state untouched and are never retried here.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;
use crate::error::{EconomyError, EconomyResult};
use crate::events::EconomyEvent;
use crate::respawn::RespawnQueue;
use crate::spots::{MineSpot, Point, SpotField};
use crate::state::{EconomySnapshot, EconomyState};
use crate::upgrades::UpgradeKind;

/// Events buffered between drains. Past this the oldest are dropped.
pub const MAX_PENDING_EVENTS: usize = 4096;

/// Result of a successful purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurchaseOutcome {
    /// Upgrade bought.
    pub kind: UpgradeKind,
    /// Score debited.
    pub cost: u64,
    /// Level after the purchase.
    pub new_level: u32,
    /// New tick interval if the host must re-arm its timer.
    pub rearm_tick: Option<Duration>,
}

/// Bounded FIFO of undrained events.
#[derive(Debug, Default)]
struct EventBuffer(VecDeque<EconomyEvent>);

impl EventBuffer {
    fn push(&mut self, event: EconomyEvent) {
        if self.0.len() == MAX_PENDING_EVENTS {
            self.0.pop_front();
            tracing::trace!("event buffer full, dropping oldest");
        }
        self.0.push_back(event);
    }
}

/// The mining economy engine.
///
/// One instance per game session. Not internally synchronized.
#[derive(Debug)]
pub struct MiningEngine {
    config: EngineConfig,
    state: EconomyState,
    field: SpotField,
    respawns: RespawnQueue,
    rng: ChaCha8Rng,
    events: EventBuffer,
}

impl MiningEngine {
    /// Creates an engine whose session starts now.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if the config fails validation.
    pub fn new(config: EngineConfig) -> EconomyResult<Self> {
        Self::with_session_start(config, Instant::now())
    }

    /// Creates an engine with an explicit session start.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if the config fails validation.
    pub fn with_session_start(config: EngineConfig, session_start: Instant) -> EconomyResult<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let field = SpotField::scatter(config.field, config.spot_count, &mut rng);

        tracing::info!(
            spots = config.spot_count,
            tick_ms = config.base_tick_interval_ms,
            seeded = config.seed.is_some(),
            "mining engine started"
        );

        Ok(Self {
            state: EconomyState::new(session_start),
            field,
            respawns: RespawnQueue::new(),
            rng,
            events: EventBuffer::default(),
            config,
        })
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Runs one auto-mining round.
    ///
    /// Each active spot independently hits with probability
    /// `auto_mine_chance`, paying `mining_power * miner_count`. Spots stay
    /// active. Returns the total mined this tick.
    pub fn tick(&mut self) -> u64 {
        let now = Instant::now();
        let amount = u64::from(self.state.mining_power) * u64::from(self.state.miner_count);
        let chance = self.config.auto_mine_chance;
        let mut mined = 0u64;

        for (spot_index, spot) in self.field.spots().iter().enumerate() {
            if !spot.active || !self.rng.gen_bool(chance) {
                continue;
            }
            self.state.credit_mined(amount, now);
            self.events.push(EconomyEvent::CoinsEarned {
                amount,
                spot_index,
                auto: true,
            });
            mined = mined.saturating_add(amount);
        }

        if mined > 0 {
            tracing::trace!(mined, score = self.state.score, "auto-mining tick");
        }
        mined
    }

    /// Strikes a spot.
    ///
    /// Out-of-range or inactive spots are a missed click: nothing changes and
    /// `false` is returned. A hit pays `mining_power * click_yield`,
    /// deactivates the spot and schedules its respawn.
    pub fn strike(&mut self, spot_index: usize) -> bool {
        if !self.field.deactivate(spot_index) {
            tracing::trace!(spot_index, "strike missed");
            return false;
        }

        let now = Instant::now();
        let amount = u64::from(self.state.mining_power).saturating_mul(self.config.click_yield);
        self.state.credit_mined(amount, now);
        self.state.record_best();
        self.respawns.schedule(spot_index, now + self.config.respawn_delay());
        self.events.push(EconomyEvent::CoinsEarned {
            amount,
            spot_index,
            auto: false,
        });

        tracing::debug!(spot_index, amount, score = self.state.score, "spot struck");
        true
    }

    /// Strikes whichever active spot is under `point`.
    ///
    /// Where spots overlap only the lowest-indexed one is struck, not every
    /// spot under the point. Returns the struck index, or `None` on a miss.
    pub fn strike_at(&mut self, point: Point) -> Option<usize> {
        let index = self.field.hit_test(point)?;
        self.strike(index).then_some(index)
    }

    /// Buys an upgrade.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientFunds`] if `score` is below the
    /// cost. The state is unchanged in that case.
    pub fn purchase(&mut self, kind: UpgradeKind) -> EconomyResult<PurchaseOutcome> {
        let cost = self.config.upgrade_costs.cost(kind);
        let available = self.state.score;
        if available < cost {
            tracing::debug!(%kind, cost, available, "purchase rejected");
            return Err(EconomyError::InsufficientFunds {
                kind,
                required: cost,
                available,
            });
        }

        self.state.score = available - cost;
        let (new_level, rearm_tick) = match kind {
            UpgradeKind::Power => {
                self.state.mining_power = self.state.mining_power.saturating_add(1);
                (self.state.mining_power, None)
            }
            UpgradeKind::Miner => {
                self.state.miner_count = self.state.miner_count.saturating_add(1);
                (self.state.miner_count, None)
            }
            UpgradeKind::Speed => {
                self.state.mining_speed = self.state.mining_speed.bumped();
                (self.state.mining_speed.level(), Some(self.tick_interval()))
            }
        };

        self.events.push(EconomyEvent::UpgradePurchased { kind, new_level });
        tracing::info!(%kind, new_level, cost, score = self.state.score, "upgrade purchased");

        Ok(PurchaseOutcome {
            kind,
            cost,
            new_level,
            rearm_tick,
        })
    }

    /// Buys an upgrade by name (`"power"`, `"miner"`, `"speed"`).
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidUpgradeKind`] for an unknown name, or
    /// any error of [`MiningEngine::purchase`].
    pub fn purchase_named(&mut self, name: &str) -> EconomyResult<PurchaseOutcome> {
        let kind = name.parse::<UpgradeKind>()?;
        self.purchase(kind)
    }

    /// Moves the claimable balance into the wallet balance.
    ///
    /// Also zeroes `score`: cashing out ends the spendable run.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::NothingToClaim`] if nothing is claimable.
    pub fn claim(&mut self) -> EconomyResult<u64> {
        let amount = self.state.claimable_balance;
        if amount == 0 {
            return Err(EconomyError::NothingToClaim);
        }

        self.state.wallet_token_balance = self.state.wallet_token_balance.saturating_add(amount);
        self.state.total_claimed = self.state.total_claimed.saturating_add(amount);
        self.state.claimable_balance = 0;
        self.state.score = 0;
        self.events.push(EconomyEvent::TokensClaimed { amount });

        tracing::info!(amount, wallet = self.state.wallet_token_balance, "tokens claimed");
        Ok(amount)
    }

    /// Records a withdrawal the wallet layer has confirmed on-chain.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidAmount`] for zero, or
    /// [`EconomyError::WithdrawalExceedsBalance`] if `amount` is larger than
    /// the tracked wallet balance. The state is unchanged in both cases.
    pub fn report_withdrawal(&mut self, amount: u64) -> EconomyResult<()> {
        if amount == 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let available = self.state.wallet_token_balance;
        if amount > available {
            tracing::warn!(amount, available, "withdrawal report exceeds wallet balance");
            return Err(EconomyError::WithdrawalExceedsBalance {
                requested: amount,
                available,
            });
        }

        self.state.wallet_token_balance = available - amount;
        self.state.total_withdrawn = self.state.total_withdrawn.saturating_add(amount);
        tracing::info!(amount, wallet = self.state.wallet_token_balance, "withdrawal recorded");
        Ok(())
    }

    /// Reactivates every spot whose respawn is due at `now`.
    ///
    /// Returns how many spots came back.
    pub fn process_respawns(&mut self, now: Instant) -> usize {
        let mut respawned = 0;
        while let Some(pending) = self.respawns.pop_due(now) {
            if let Some(spot) = self.field.respawn(pending.spot_index, &mut self.rng) {
                self.events.push(EconomyEvent::SpotRespawned {
                    spot_index: pending.spot_index,
                    position: spot.position,
                });
                respawned += 1;
            }
        }
        respawned
    }

    /// Drops every pending respawn. Used on shutdown.
    pub fn cancel_respawns(&mut self) {
        self.respawns.clear();
    }

    /// Takes every event emitted since the last drain, oldest first.
    ///
    /// At most [`MAX_PENDING_EVENTS`] are kept; hosts that never drain lose
    /// the oldest ones.
    pub fn drain_events(&mut self) -> Vec<EconomyEvent> {
        self.events.0.drain(..).collect()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Read-only view of the state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &EconomyState {
        &self.state
    }

    /// Copy of the state plus derived values.
    #[must_use]
    pub fn snapshot(&self) -> EconomySnapshot {
        let s = &self.state;
        EconomySnapshot {
            score: s.score,
            mining_power: s.mining_power,
            miner_count: s.miner_count,
            mining_speed: s.mining_speed,
            total_mined: s.total_mined,
            total_claimed: s.total_claimed,
            total_withdrawn: s.total_withdrawn,
            claimable_balance: s.claimable_balance,
            wallet_token_balance: s.wallet_token_balance,
            best_session_score: s.best_session_score,
            coins_per_second: s.coins_per_second,
            session_elapsed: s.session_start.elapsed(),
            tick_interval: self.tick_interval(),
            active_spots: self.field.active_count(),
        }
    }

    /// All spots, in index order.
    #[inline]
    #[must_use]
    pub fn spots(&self) -> &[MineSpot] {
        self.field.spots()
    }

    /// The spot field.
    #[inline]
    #[must_use]
    pub const fn field(&self) -> &SpotField {
        &self.field
    }

    /// Index of the first active spot under `point`.
    #[inline]
    #[must_use]
    pub fn spot_at(&self, point: Point) -> Option<usize> {
        self.field.hit_test(point)
    }

    /// Current tick period: `base_tick_interval / mining_speed`.
    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.state
            .mining_speed
            .interval(self.config.base_tick_interval())
    }

    /// Earliest pending respawn.
    #[inline]
    #[must_use]
    pub fn next_respawn_deadline(&self) -> Option<Instant> {
        self.respawns.next_deadline()
    }

    /// Number of spots waiting to respawn.
    #[inline]
    #[must_use]
    pub fn pending_respawns(&self) -> usize {
        self.respawns.len()
    }

    /// `(total_mined, total_claimed, total_withdrawn)`.
    #[inline]
    #[must_use]
    pub const fn distribution(&self) -> (u64, u64, u64) {
        (
            self.state.total_mined,
            self.state.total_claimed,
            self.state.total_withdrawn,
        )
    }

    /// The configuration this engine runs with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}
