//! # Ports
//!
//! The seams between the session and its collaborators.
//!
//! - [`PresentationPort`]: draws the field, shows toasts, captures clicks
//! - [`WalletPort`]: reconciles claimed tokens with the chain
//! - [`Viewport`]: maps pointer coordinates into field coordinates

use mtk_economy::{EconomyError, EconomyEvent, EconomySnapshot, Point, UpgradeKind};
use serde::Serialize;

/// Toast severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Something worked.
    Success,
    /// Something was rejected.
    Error,
    /// Worth the player's attention.
    Warning,
    /// Plain information.
    Info,
}

/// A toast for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable text.
    pub message: String,
}

impl Notice {
    /// Creates a notice.
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// The toast shown for a rejected engine command.
    #[must_use]
    pub fn from_error(err: &EconomyError) -> Self {
        let message = match err {
            EconomyError::InsufficientFunds { .. } => "Not enough MTK!".to_owned(),
            EconomyError::NothingToClaim => "No tokens to claim!".to_owned(),
            other => other.to_string(),
        };
        Self::new(NoticeLevel::Error, message)
    }

    /// The toast shown for an engine event, if it warrants one.
    ///
    /// Mining and respawns are too frequent for toasts.
    #[must_use]
    pub fn for_event(event: &EconomyEvent) -> Option<Self> {
        let message = match event {
            EconomyEvent::UpgradePurchased { kind, .. } => match kind {
                UpgradeKind::Power => "Mining power upgraded!".to_owned(),
                UpgradeKind::Miner => "New miner purchased!".to_owned(),
                UpgradeKind::Speed => "Mining speed increased!".to_owned(),
            },
            EconomyEvent::TokensClaimed { amount } => format!("Claimed {amount} MTK to wallet!"),
            EconomyEvent::CoinsEarned { .. } | EconomyEvent::SpotRespawned { .. } => return None,
        };
        Some(Self::new(NoticeLevel::Success, message))
    }
}

/// Receives everything the player should see.
///
/// Called on the dispatcher thread; implementations must not block for long.
pub trait PresentationPort: Send {
    /// An engine event happened.
    fn on_event(&mut self, event: &EconomyEvent);

    /// A toast should be shown.
    fn on_notice(&mut self, notice: &Notice);

    /// Fresh full state, pushed after every tick and successful command.
    fn on_snapshot(&mut self, _snapshot: &EconomySnapshot) {}
}

/// Receives what the wallet layer must reconcile.
pub trait WalletPort: Send {
    /// Tokens moved from claimable into the wallet balance.
    fn on_tokens_claimed(&mut self, amount: u64);

    /// A confirmed withdrawal was applied to the ledger.
    fn on_withdrawal_recorded(&mut self, _amount: u64) {}
}

/// Wallet port that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullWallet;

impl WalletPort for NullWallet {
    fn on_tokens_claimed(&mut self, _amount: u64) {}
}

/// Maps pointer coordinates on a scaled surface into field coordinates.
///
/// The drawn surface may be stretched by layout; `rect_*` describe where and
/// how large it appears on screen, `field_*` its logical size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Screen position of the surface's top-left corner.
    pub rect_origin: Point,
    /// On-screen width.
    pub rect_width: f32,
    /// On-screen height.
    pub rect_height: f32,
    /// Logical field width.
    pub field_width: f32,
    /// Logical field height.
    pub field_height: f32,
}

impl Viewport {
    /// Converts a pointer position into field coordinates.
    ///
    /// Returns `None` while the surface has no on-screen area.
    #[must_use]
    pub fn to_field(&self, client: Point) -> Option<Point> {
        if self.rect_width <= 0.0 || self.rect_height <= 0.0 {
            return None;
        }
        let scale_x = self.field_width / self.rect_width;
        let scale_y = self.field_height / self.rect_height;
        Some(Point::new(
            (client.x - self.rect_origin.x) * scale_x,
            (client.y - self.rect_origin.y) * scale_y,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_scales_and_offsets() {
        let viewport = Viewport {
            rect_origin: Point::new(100.0, 50.0),
            rect_width: 400.0,
            rect_height: 200.0,
            field_width: 800.0,
            field_height: 400.0,
        };
        assert_eq!(
            viewport.to_field(Point::new(300.0, 150.0)),
            Some(Point::new(400.0, 200.0))
        );
    }

    #[test]
    fn test_collapsed_viewport_maps_nothing() {
        let viewport = Viewport {
            rect_origin: Point::default(),
            rect_width: 0.0,
            rect_height: 200.0,
            field_width: 800.0,
            field_height: 400.0,
        };
        assert_eq!(viewport.to_field(Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_error_notices() {
        let funds = EconomyError::InsufficientFunds {
            kind: UpgradeKind::Power,
            required: 100,
            available: 3,
        };
        assert_eq!(Notice::from_error(&funds).message, "Not enough MTK!");
        assert_eq!(
            Notice::from_error(&EconomyError::NothingToClaim),
            Notice::new(NoticeLevel::Error, "No tokens to claim!")
        );
    }

    #[test]
    fn test_event_notices() {
        let claim = EconomyEvent::TokensClaimed { amount: 120 };
        assert_eq!(
            Notice::for_event(&claim),
            Some(Notice::new(NoticeLevel::Success, "Claimed 120 MTK to wallet!"))
        );

        let mined = EconomyEvent::CoinsEarned {
            amount: 10,
            spot_index: 0,
            auto: false,
        };
        assert_eq!(Notice::for_event(&mined), None);
    }
}
