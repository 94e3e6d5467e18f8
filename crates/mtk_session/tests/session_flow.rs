//! # Session Flow Tests
//!
//! End-to-end runs through the dispatcher thread: timers, respawn
//! deadlines, notices and the withdrawal path.
//!
//! Run with: cargo test -p mtk_session --test session_flow

use std::sync::Arc;
use std::time::Duration;

use mtk_economy::{EconomyError, EconomyEvent, EngineConfig, Point, UpgradeCosts, UpgradeKind};
use mtk_session::{
    event_channel, ChannelPresenter, EventReceiver, Notice, NoticeLevel, Session, SessionError,
    SessionEvent, SessionHandle, TransferReceipt, TransferStatus, Viewport, WalletPort,
    WithdrawalError,
};
use parking_lot::Mutex;

const RECIPIENT: &str = "0x779877A7B0D9E8603169DdbD7836e478b4624789";
const WAIT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct RecordingWallet {
    claims: Arc<Mutex<Vec<u64>>>,
    withdrawals: Arc<Mutex<Vec<u64>>>,
}

impl WalletPort for RecordingWallet {
    fn on_tokens_claimed(&mut self, amount: u64) {
        self.claims.lock().push(amount);
    }

    fn on_withdrawal_recorded(&mut self, amount: u64) {
        self.withdrawals.lock().push(amount);
    }
}

/// Manual-only config: long ticks, no auto-mining, slow respawns.
fn quiet_config() -> EngineConfig {
    EngineConfig {
        auto_mine_chance: 0.0,
        respawn_delay_ms: 60_000,
        seed: Some(11),
        ..EngineConfig::default()
    }
}

fn start(config: EngineConfig) -> (SessionHandle, EventReceiver, RecordingWallet) {
    let (tx, rx) = event_channel(4096);
    let wallet = RecordingWallet::default();
    let presenter = ChannelPresenter::without_snapshots(tx);
    let session = Session::start(config, presenter, wallet.clone()).unwrap();
    (session, rx, wallet)
}

fn wait_notice(rx: &EventReceiver, message: &str) -> Option<Notice> {
    match rx.wait_for(WAIT, |e| matches!(e, SessionEvent::Notice(n) if n.message == message)) {
        Some(SessionEvent::Notice(notice)) => Some(notice),
        _ => None,
    }
}

#[test]
fn test_timer_auto_mines() {
    let (session, rx, _) = start(EngineConfig {
        base_tick_interval_ms: 10,
        auto_mine_chance: 1.0,
        seed: Some(2),
        ..EngineConfig::default()
    });

    let event = rx.wait_for(WAIT, |e| {
        matches!(e, SessionEvent::Economy(EconomyEvent::CoinsEarned { auto: true, .. }))
    });
    assert!(event.is_some(), "no auto-mining within {WAIT:?}");

    let client = session.client();
    assert!(client.stats().unwrap().ticks >= 1);
    assert!(client.snapshot().unwrap().total_mined >= 1);
    // Auto-mining never shows up in the feed.
    assert!(client.activity().unwrap().is_empty());
}

#[test]
fn test_speed_purchase_rearms_timer() {
    let (session, _rx, _) = start(EngineConfig {
        upgrade_costs: UpgradeCosts {
            speed: 10,
            ..UpgradeCosts::default()
        },
        ..quiet_config()
    });
    let client = session.client();

    let before = client.stats().unwrap();
    assert_eq!(before.tick_interval, Duration::from_millis(1000));
    assert_eq!(before.timer_rearms, 0);

    assert!(client.strike(0).unwrap());
    let outcome = client.purchase(UpgradeKind::Speed).unwrap();
    assert_eq!(outcome.rearm_tick, Some(Duration::from_nanos(666_666_666)));

    let after = client.stats().unwrap();
    assert_eq!(after.timer_rearms, 1);
    assert_eq!(after.tick_interval, Duration::from_nanos(666_666_666));
    assert_eq!(client.snapshot().unwrap().tick_interval, after.tick_interval);
}

#[test]
fn test_rearmed_timer_ticks_at_new_rate() {
    let (session, _rx, _) = start(EngineConfig {
        base_tick_interval_ms: 100,
        click_yield: 100,
        upgrade_costs: UpgradeCosts {
            speed: 1,
            ..UpgradeCosts::default()
        },
        ..quiet_config()
    });
    let client = session.client();

    // 2 + 18 half steps: 100ms * 2 / 20 = 10ms.
    assert!(client.strike(0).unwrap());
    for _ in 0..18 {
        client.purchase(UpgradeKind::Speed).unwrap();
    }
    let rearmed = client.stats().unwrap();
    assert_eq!(rearmed.tick_interval, Duration::from_millis(10));

    std::thread::sleep(Duration::from_millis(500));
    let ticks = client.stats().unwrap().ticks - rearmed.ticks;
    // The 100ms timer would manage 5 in this window.
    assert!(ticks >= 20, "only {ticks} ticks in 500ms at a 10ms interval");
}

#[test]
fn test_struck_spot_respawns_after_delay() {
    let (session, rx, _) = start(EngineConfig {
        respawn_delay_ms: 30,
        ..quiet_config()
    });
    let client = session.client();

    assert!(client.strike(0).unwrap());
    assert!(!client.spots().unwrap()[0].active);
    // Second strike on the same spot is a miss until it comes back.
    assert!(!client.strike(0).unwrap());

    let event = rx.wait_for(WAIT, |e| {
        matches!(
            e,
            SessionEvent::Economy(EconomyEvent::SpotRespawned { spot_index: 0, .. })
        )
    });
    assert!(event.is_some(), "spot 0 never respawned");

    assert!(client.spots().unwrap()[0].active);
    assert_eq!(client.stats().unwrap().respawns, 1);
    assert_eq!(client.snapshot().unwrap().active_spots, 5);
}

#[test]
fn test_strike_at_position() {
    let (session, _rx, _) = start(quiet_config());
    let client = session.client();

    // Surface drawn at half size, offset on screen.
    let viewport = Viewport {
        rect_origin: Point::new(10.0, 20.0),
        rect_width: 400.0,
        rect_height: 200.0,
        field_width: 800.0,
        field_height: 400.0,
    };
    let target = client.spots().unwrap()[2].position;
    let pointer = Point::new(10.0 + target.x / 2.0, 20.0 + target.y / 2.0);
    let hit = client.strike_at(viewport.to_field(pointer).unwrap()).unwrap();
    assert!(hit.is_some());
    assert_eq!(client.snapshot().unwrap().score, 10);

    let entry = client.activity().unwrap().remove(0);
    assert_eq!(entry.title, "Mined Coins");
    assert_eq!(entry.detail, "+10 MTK");
}

#[test]
fn test_rejections_publish_notices() {
    let (session, rx, _) = start(quiet_config());
    let client = session.client();

    assert!(matches!(
        client.purchase(UpgradeKind::Power),
        Err(SessionError::Economy(EconomyError::InsufficientFunds {
            required: 100,
            available: 0,
            ..
        }))
    ));
    let notice = wait_notice(&rx, "Not enough MTK!").unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);

    assert!(matches!(
        client.claim(),
        Err(SessionError::Economy(EconomyError::NothingToClaim))
    ));
    assert!(wait_notice(&rx, "No tokens to claim!").is_some());

    assert!(matches!(
        client.purchase_named("turbo"),
        Err(SessionError::Economy(EconomyError::InvalidUpgradeKind(_)))
    ));

    // Nothing changed.
    let snap = client.snapshot().unwrap();
    assert_eq!(snap.score, 0);
    assert_eq!(snap.mining_power, 1);
}

#[test]
fn test_claim_and_withdraw() {
    let (session, rx, wallet) = start(quiet_config());
    let client = session.client();

    for index in 0..3 {
        assert!(client.strike(index).unwrap());
    }
    assert_eq!(client.claim().unwrap(), 30);
    assert!(wait_notice(&rx, "Claimed 30 MTK to wallet!").is_some());
    assert_eq!(*wallet.claims.lock(), vec![30]);

    let snap = client.snapshot().unwrap();
    assert_eq!(snap.score, 0);
    assert_eq!(snap.wallet_token_balance, 30);

    // Checked locally before anything is submitted.
    assert!(matches!(
        client.prepare_withdrawal(31, RECIPIENT),
        Err(SessionError::Withdrawal(WithdrawalError::InsufficientBalance {
            requested: 31,
            available: 30
        }))
    ));
    assert!(matches!(
        client.prepare_withdrawal(5, "0x1234"),
        Err(SessionError::Withdrawal(WithdrawalError::InvalidRecipient(_)))
    ));

    assert!(matches!(
        client.report_withdrawal(0),
        Err(SessionError::Economy(EconomyError::InvalidAmount))
    ));

    let request = client.prepare_withdrawal(20, RECIPIENT).unwrap();
    client
        .record_transfer(TransferReceipt::new(&request, "0xfeed", TransferStatus::Confirmed))
        .unwrap();
    assert!(wait_notice(&rx, "Successfully withdrew 20 tokens!").is_some());
    assert_eq!(*wallet.withdrawals.lock(), vec![20]);

    let snap = client.snapshot().unwrap();
    assert_eq!(snap.wallet_token_balance, 10);
    assert_eq!(snap.total_withdrawn, 20);
    assert_eq!(snap.total_claimed, 30);

    let entry = client.activity().unwrap().remove(0);
    assert_eq!(entry.title, "Withdrawn");
    assert_eq!(entry.detail, "20 tokens");

    // A failed transfer is recorded but leaves the ledger alone.
    client
        .record_transfer(TransferReceipt::new(&request, "0xdead", TransferStatus::Failed))
        .unwrap();
    assert_eq!(client.snapshot().unwrap().wallet_token_balance, 10);

    let history = client.transactions().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].tx_hash, "0xdead");
    assert!(history[1].is_confirmed());
}

#[test]
fn test_rejected_confirmation_is_recorded_as_failed() {
    let (session, _rx, wallet) = start(quiet_config());
    let client = session.client();

    assert!(client.strike(0).unwrap());
    assert_eq!(client.claim().unwrap(), 10);
    let request = client.prepare_withdrawal(10, RECIPIENT).unwrap();

    client
        .record_transfer(TransferReceipt::new(&request, "0x1", TransferStatus::Confirmed))
        .unwrap();
    // Same withdrawal reported again: the ledger has nothing left to debit.
    assert!(matches!(
        client.record_transfer(TransferReceipt::new(&request, "0x2", TransferStatus::Confirmed)),
        Err(SessionError::Economy(EconomyError::WithdrawalExceedsBalance {
            requested: 10,
            available: 0
        }))
    ));

    let history: Vec<_> = client
        .transactions()
        .unwrap()
        .into_iter()
        .map(|r| (r.tx_hash, r.status))
        .collect();
    assert_eq!(
        history,
        vec![
            ("0x2".to_owned(), TransferStatus::Failed),
            ("0x1".to_owned(), TransferStatus::Confirmed),
        ]
    );

    let snap = client.snapshot().unwrap();
    assert_eq!(snap.total_withdrawn, 10);
    assert_eq!(snap.wallet_token_balance, 0);
    assert_eq!(*wallet.withdrawals.lock(), vec![10]);
}

#[test]
fn test_invalid_config_fails_to_start() {
    let config = EngineConfig {
        spot_count: 0,
        ..quiet_config()
    };
    let (tx, _rx) = event_channel(8);
    let result = Session::start(config, ChannelPresenter::new(tx), RecordingWallet::default());
    assert!(matches!(
        result,
        Err(SessionError::Economy(EconomyError::InvalidConfig(_)))
    ));
}

#[test]
fn test_client_disconnects_after_shutdown() {
    let (session, _rx, _) = start(quiet_config());
    let client = session.client().clone();
    assert!(client.snapshot().is_ok());

    session.shutdown();
    assert!(matches!(client.snapshot(), Err(SessionError::Disconnected)));
    assert!(matches!(client.strike(0), Err(SessionError::Disconnected)));
}

#[test]
fn test_clients_on_many_threads_serialize() {
    let (session, _rx, _) = start(EngineConfig {
        respawn_delay_ms: 1,
        ..quiet_config()
    });

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let client = session.client().clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    let _ = client.strike((t + i) % 5);
                    if i % 10 == 0 {
                        let _ = client.claim();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snap = session.client().snapshot().unwrap();
    assert_eq!(snap.total_mined, snap.total_claimed + snap.claimable_balance);
    assert_eq!(snap.total_mined % 10, 0);
}
