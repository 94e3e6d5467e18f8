//! # Economy State
//!
//! The single mutable aggregate behind a mining session.
//!
//! Fields are private: only [`MiningEngine`](crate::MiningEngine) mutates
//! them, everyone else reads through getters or an [`EconomySnapshot`].

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Mining speed multiplier, stored exactly in half steps.
///
/// `1.0` is two half steps; every Speed upgrade adds one. Keeping it integral
/// lets the tick interval be computed without rounding drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SpeedMultiplier {
    half_steps: u32,
}

impl SpeedMultiplier {
    /// The starting multiplier, `1.0`.
    pub const BASE: Self = Self { half_steps: 2 };

    /// Returns the multiplier after one more Speed upgrade (`+0.5`).
    #[inline]
    #[must_use]
    pub const fn bumped(self) -> Self {
        Self {
            half_steps: self.half_steps.saturating_add(1),
        }
    }

    /// Upgrade level: 1 at base, +1 per Speed upgrade.
    #[inline]
    #[must_use]
    pub const fn level(self) -> u32 {
        self.half_steps - 1
    }

    /// The multiplier as a float, for display.
    #[inline]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.half_steps) / 2.0
    }

    /// Scales a base tick interval: `base / multiplier`.
    #[inline]
    #[must_use]
    pub fn interval(self, base: Duration) -> Duration {
        base * 2 / self.half_steps
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self::BASE
    }
}

impl fmt::Display for SpeedMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f64())
    }
}

/// All numeric game state for one session.
#[derive(Clone, Debug)]
pub struct EconomyState {
    pub(crate) score: u64,
    pub(crate) mining_power: u32,
    pub(crate) miner_count: u32,
    pub(crate) mining_speed: SpeedMultiplier,
    pub(crate) total_mined: u64,
    pub(crate) total_claimed: u64,
    pub(crate) total_withdrawn: u64,
    pub(crate) claimable_balance: u64,
    pub(crate) wallet_token_balance: u64,
    pub(crate) best_session_score: u64,
    pub(crate) coins_per_second: f64,
    pub(crate) session_start: Instant,
}

impl EconomyState {
    /// Fresh state: level-1 upgrades, everything else zero.
    #[must_use]
    pub fn new(session_start: Instant) -> Self {
        Self {
            score: 0,
            mining_power: 1,
            miner_count: 1,
            mining_speed: SpeedMultiplier::BASE,
            total_mined: 0,
            total_claimed: 0,
            total_withdrawn: 0,
            claimable_balance: 0,
            wallet_token_balance: 0,
            best_session_score: 0,
            coins_per_second: 0.0,
            session_start,
        }
    }

    /// Credits a mining award to score, lifetime total and claimable balance.
    pub(crate) fn credit_mined(&mut self, amount: u64, now: Instant) {
        self.score = self.score.saturating_add(amount);
        self.total_mined = self.total_mined.saturating_add(amount);
        self.claimable_balance = self.claimable_balance.saturating_add(amount);
        self.recompute_rate(now);
    }

    /// Mining efficiency: lifetime mined over session age.
    ///
    /// A zero-length session reports `0.0` rather than dividing by zero.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn recompute_rate(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.session_start).as_secs_f64();
        self.coins_per_second = if elapsed > 0.0 {
            self.total_mined as f64 / elapsed
        } else {
            0.0
        };
    }

    /// Raises the high-water mark if the current score beats it.
    pub(crate) fn record_best(&mut self) {
        self.best_session_score = self.best_session_score.max(self.score);
    }

    /// Spendable in-session balance.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Coins per auto-mining hit per miner.
    #[must_use]
    pub const fn mining_power(&self) -> u32 {
        self.mining_power
    }

    /// Number of miners.
    #[must_use]
    pub const fn miner_count(&self) -> u32 {
        self.miner_count
    }

    /// Current speed multiplier.
    #[must_use]
    pub const fn mining_speed(&self) -> SpeedMultiplier {
        self.mining_speed
    }

    /// Everything ever mined this session.
    #[must_use]
    pub const fn total_mined(&self) -> u64 {
        self.total_mined
    }

    /// Everything ever claimed into the wallet balance.
    #[must_use]
    pub const fn total_claimed(&self) -> u64 {
        self.total_claimed
    }

    /// Everything confirmed as withdrawn on-chain.
    #[must_use]
    pub const fn total_withdrawn(&self) -> u64 {
        self.total_withdrawn
    }

    /// Mined output not yet claimed.
    #[must_use]
    pub const fn claimable_balance(&self) -> u64 {
        self.claimable_balance
    }

    /// Off-chain shadow of the withdrawable token balance.
    #[must_use]
    pub const fn wallet_token_balance(&self) -> u64 {
        self.wallet_token_balance
    }

    /// Highest score seen after a strike.
    #[must_use]
    pub const fn best_session_score(&self) -> u64 {
        self.best_session_score
    }

    /// Mining efficiency as of the last mining event.
    #[must_use]
    pub const fn coins_per_second(&self) -> f64 {
        self.coins_per_second
    }

    /// When the session began.
    #[must_use]
    pub const fn session_start(&self) -> Instant {
        self.session_start
    }
}

/// Read-only copy of the state, for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EconomySnapshot {
    /// Spendable in-session balance.
    pub score: u64,
    /// Mining power level.
    pub mining_power: u32,
    /// Number of miners.
    pub miner_count: u32,
    /// Speed multiplier.
    pub mining_speed: SpeedMultiplier,
    /// Lifetime mined.
    pub total_mined: u64,
    /// Lifetime claimed.
    pub total_claimed: u64,
    /// Lifetime withdrawn.
    pub total_withdrawn: u64,
    /// Mined but not yet claimed.
    pub claimable_balance: u64,
    /// Withdrawable wallet balance.
    pub wallet_token_balance: u64,
    /// Best score this session.
    pub best_session_score: u64,
    /// Mining efficiency.
    pub coins_per_second: f64,
    /// Session age when the snapshot was taken.
    pub session_elapsed: Duration,
    /// Current tick interval.
    pub tick_interval: Duration,
    /// Spots currently accepting strikes.
    pub active_spots: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_multiplier_steps() {
        let speed = SpeedMultiplier::BASE;
        assert_eq!(speed.level(), 1);
        assert_eq!(speed.to_string(), "1.0");

        let faster = speed.bumped();
        assert_eq!(faster.level(), 2);
        assert_eq!(faster.to_string(), "1.5");
        assert_eq!(faster.bumped().to_string(), "2.0");
    }

    #[test]
    fn test_interval_scales_with_multiplier() {
        let base = Duration::from_millis(1000);
        let speed = SpeedMultiplier::BASE;
        assert_eq!(speed.interval(base), Duration::from_millis(1000));
        assert_eq!(speed.bumped().bumped().interval(base), Duration::from_millis(500));
        assert_eq!(
            speed.bumped().interval(base),
            Duration::from_nanos(666_666_666)
        );
    }

    #[test]
    fn test_credit_updates_all_three_balances() {
        let start = Instant::now();
        let mut state = EconomyState::new(start);
        state.credit_mined(20, start + Duration::from_secs(4));

        assert_eq!(state.score(), 20);
        assert_eq!(state.total_mined(), 20);
        assert_eq!(state.claimable_balance(), 20);
        assert!((state.coins_per_second() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_elapsed_rate_is_zero() {
        let start = Instant::now();
        let mut state = EconomyState::new(start);
        state.credit_mined(10, start);
        assert!(state.coins_per_second().abs() < f64::EPSILON);
    }
}
