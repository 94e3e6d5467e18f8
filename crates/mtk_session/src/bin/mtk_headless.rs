//! # MTK Headless Session
//!
//! Runs one mining session with no UI: a scripted player strikes spots,
//! buys upgrades, claims and withdraws while auto-mining ticks in the
//! background. Useful for soak runs and for eyeballing the event stream.
//!
//! ```bash
//! # Default config
//! RUST_LOG=info ./mtk_headless
//!
//! # Custom config
//! RUST_LOG=mtk_session=debug ./mtk_headless economy.toml
//! ```

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use mtk_economy::{EconomyEvent, EconomySnapshot, EngineConfig, MiningEngine, UpgradeKind};
use mtk_session::format::{format_address, format_amount, format_rate};
use mtk_session::{
    Notice, NoticeLevel, PresentationPort, Session, SessionResult, TransferReceipt, TransferStatus,
    WalletPort,
};
use tracing_subscriber::EnvFilter;

/// Recipient used for the scripted withdrawal.
const DEMO_RECIPIENT: &str = "0x779877A7B0D9E8603169DdbD7836e478b4624789";

/// Writes everything to the log.
struct LogPresenter;

impl PresentationPort for LogPresenter {
    fn on_event(&mut self, event: &EconomyEvent) {
        match event {
            EconomyEvent::CoinsEarned { auto: true, .. } => tracing::debug!(?event, "auto mine"),
            _ => tracing::info!(?event, "economy event"),
        }
    }

    fn on_notice(&mut self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Error | NoticeLevel::Warning => tracing::warn!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => tracing::info!("{}", notice.message),
        }
    }
}

/// Stands in for the token contract.
struct SimulatedWallet;

impl WalletPort for SimulatedWallet {
    fn on_tokens_claimed(&mut self, amount: u64) {
        tracing::info!(amount, "mint requested");
    }

    fn on_withdrawal_recorded(&mut self, amount: u64) {
        tracing::info!(amount, "withdrawal settled");
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    MTK MINING SESSION (HEADLESS)");
    println!("═══════════════════════════════════════════════════════════════════");

    match run() {
        Ok(snapshot) => {
            print_summary(&snapshot);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "session failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> SessionResult<EconomySnapshot> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig {
            base_tick_interval_ms: 250,
            respawn_delay_ms: 200,
            ..EngineConfig::default()
        },
    };
    let engine = MiningEngine::new(config)?;
    let session = Session::spawn(engine, LogPresenter, SimulatedWallet)?;
    let client = session.client().clone();

    // Mine until the first miner is affordable.
    while client.snapshot()?.score < 500 {
        let spots = client.spots()?;
        match spots.iter().position(|spot| spot.active) {
            Some(index) => {
                client.strike(index)?;
            }
            None => thread::sleep(Duration::from_millis(50)),
        }
    }

    for kind in [UpgradeKind::Miner, UpgradeKind::Speed, UpgradeKind::Power] {
        if let Err(err) = client.purchase(kind) {
            tracing::warn!(%kind, %err, "purchase rejected");
        }
    }

    thread::sleep(Duration::from_secs(2));
    let claimed = client.claim()?;
    tracing::info!(claimed, "claimed");

    let request = client.prepare_withdrawal(claimed / 2 + 1, DEMO_RECIPIENT)?;
    let tx_hash = format!("0x{:064x}", request.amount);
    client.record_transfer(TransferReceipt::new(&request, tx_hash, TransferStatus::Confirmed))?;
    tracing::info!(
        to = %format_address(DEMO_RECIPIENT, 6, 4),
        amount = request.amount,
        "withdrawal recorded"
    );

    let stats = client.stats()?;
    tracing::info!(?stats, "dispatcher stats");
    let snapshot = client.snapshot()?;
    session.shutdown();
    Ok(snapshot)
}

fn print_summary(snapshot: &EconomySnapshot) {
    println!();
    println!("  Mined:      {} MTK", format_amount(snapshot.total_mined as f64, 2));
    println!("  Claimed:    {} MTK", format_amount(snapshot.total_claimed as f64, 2));
    println!("  Withdrawn:  {} MTK", format_amount(snapshot.total_withdrawn as f64, 2));
    println!("  Wallet:     {} MTK", format_amount(snapshot.wallet_token_balance as f64, 2));
    println!("  Efficiency: {}", format_rate(snapshot.coins_per_second));
    println!(
        "  Rig:        power {} / miners {} / speed {}x",
        snapshot.mining_power, snapshot.miner_count, snapshot.mining_speed
    );
    println!("═══════════════════════════════════════════════════════════════════");
}
