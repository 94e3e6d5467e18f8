//! # Session Dispatcher
//!
//! One thread owns the engine and serializes every trigger through a single
//! `select!` loop.
//!
//! ## Design
//!
//! The loop must:
//! - Apply commands in arrival order, one at a time
//! - Tick at `base_interval / speed`, replacing the timer on every Speed
//!   purchase so a stale timer never fires again
//! - Fire respawns at their deadline, on the same thread as strikes
//! - Drop pending respawns on shutdown so nothing acts on a disposed engine

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use mtk_economy::{
    EconomyError, EconomyEvent, EconomyResult, EconomySnapshot, EngineConfig, MineSpot,
    MiningEngine, Point, PurchaseOutcome, UpgradeKind,
};

use crate::activity::{ActivityEntry, ActivityLog};
use crate::error::{SessionError, SessionResult};
use crate::ports::{Notice, NoticeLevel, PresentationPort, WalletPort};
use crate::withdrawal::{TransactionHistory, TransferReceipt, TransferStatus, WithdrawalRequest};

/// Dispatcher counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Timer ticks run.
    pub ticks: u64,
    /// Commands applied.
    pub commands: u64,
    /// Spots respawned.
    pub respawns: u64,
    /// Times the tick timer was replaced.
    pub timer_rearms: u32,
    /// Period of the live tick timer.
    pub tick_interval: Duration,
}

/// Everything the dispatcher accepts.
enum Command {
    Strike {
        spot_index: usize,
        reply: Sender<bool>,
    },
    StrikeAt {
        point: Point,
        reply: Sender<Option<usize>>,
    },
    Purchase {
        kind: UpgradeKind,
        reply: Sender<EconomyResult<PurchaseOutcome>>,
    },
    Claim {
        reply: Sender<EconomyResult<u64>>,
    },
    ReportWithdrawal {
        amount: u64,
        reply: Sender<EconomyResult<()>>,
    },
    RecordTransfer {
        receipt: TransferReceipt,
        reply: Sender<EconomyResult<()>>,
    },
    Snapshot {
        reply: Sender<EconomySnapshot>,
    },
    Spots {
        reply: Sender<Vec<MineSpot>>,
    },
    Activity {
        reply: Sender<Vec<ActivityEntry>>,
    },
    Transactions {
        reply: Sender<Vec<TransferReceipt>>,
    },
    Stats {
        reply: Sender<DispatchStats>,
    },
    Shutdown,
}

/// Entry point for starting sessions.
pub struct Session;

impl Session {
    /// Builds an engine from `config` and starts a dispatcher for it.
    ///
    /// # Errors
    ///
    /// [`SessionError::Economy`] if the config is invalid, otherwise as
    /// [`Session::spawn`].
    pub fn start<P, W>(
        config: EngineConfig,
        presentation: P,
        wallet: W,
    ) -> SessionResult<SessionHandle>
    where
        P: PresentationPort + 'static,
        W: WalletPort + 'static,
    {
        let engine = MiningEngine::new(config)?;
        Self::spawn(engine, presentation, wallet)
    }

    /// Starts a dispatcher thread owning `engine`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Spawn`] if the thread cannot be created.
    pub fn spawn<P, W>(
        engine: MiningEngine,
        presentation: P,
        wallet: W,
    ) -> SessionResult<SessionHandle>
    where
        P: PresentationPort + 'static,
        W: WalletPort + 'static,
    {
        let (commands_tx, commands_rx) = unbounded();
        let dispatcher = Dispatcher {
            engine,
            commands: commands_rx,
            presentation: Box::new(presentation),
            wallet: Box::new(wallet),
            activity: ActivityLog::default(),
            history: TransactionHistory::default(),
            stats: DispatchStats::default(),
        };

        let thread = std::thread::Builder::new()
            .name("mtk-dispatcher".into())
            .spawn(move || dispatcher.run())?;

        Ok(SessionHandle {
            client: SessionClient {
                commands: commands_tx,
            },
            thread: Some(thread),
        })
    }
}

/// Owns the dispatcher thread. Shuts it down on drop.
pub struct SessionHandle {
    client: SessionClient,
    thread: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// The command client. Clone it to submit from other threads.
    #[must_use]
    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    /// Stops the dispatcher and waits for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.client.commands.send(Command::Shutdown);
            if thread.join().is_err() {
                tracing::error!("mtk dispatcher panicked");
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Cloneable command submitter.
///
/// Every call is a round trip to the dispatcher; once the session is shut
/// down every call returns [`SessionError::Disconnected`].
#[derive(Clone)]
pub struct SessionClient {
    commands: Sender<Command>,
}

impl SessionClient {
    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> SessionResult<T> {
        let (reply, response) = bounded(1);
        self.commands
            .send(make(reply))
            .map_err(|_| SessionError::Disconnected)?;
        response.recv().map_err(|_| SessionError::Disconnected)
    }

    /// Strikes a spot. `Ok(false)` is a miss.
    ///
    /// # Errors
    ///
    /// [`SessionError::Disconnected`] after shutdown.
    pub fn strike(&self, spot_index: usize) -> SessionResult<bool> {
        self.request(|reply| Command::Strike { spot_index, reply })
    }

    /// Strikes whatever active spot is under `point` (field coordinates).
    ///
    /// # Errors
    ///
    /// [`SessionError::Disconnected`] after shutdown.
    pub fn strike_at(&self, point: Point) -> SessionResult<Option<usize>> {
        self.request(|reply| Command::StrikeAt { point, reply })
    }

    /// Buys an upgrade.
    ///
    /// # Errors
    ///
    /// [`SessionError::Economy`] if the engine rejects it, or
    /// [`SessionError::Disconnected`].
    pub fn purchase(&self, kind: UpgradeKind) -> SessionResult<PurchaseOutcome> {
        Ok(self.request(|reply| Command::Purchase { kind, reply })??)
    }

    /// Buys an upgrade by name.
    ///
    /// # Errors
    ///
    /// [`EconomyError::InvalidUpgradeKind`] for an unknown name, otherwise as
    /// [`SessionClient::purchase`].
    pub fn purchase_named(&self, name: &str) -> SessionResult<PurchaseOutcome> {
        let kind = name.parse::<UpgradeKind>()?;
        self.purchase(kind)
    }

    /// Claims the claimable balance.
    ///
    /// # Errors
    ///
    /// [`SessionError::Economy`] with `NothingToClaim`, or
    /// [`SessionError::Disconnected`].
    pub fn claim(&self) -> SessionResult<u64> {
        Ok(self.request(|reply| Command::Claim { reply })??)
    }

    /// Applies a confirmed on-chain withdrawal to the ledger.
    ///
    /// # Errors
    ///
    /// [`SessionError::Economy`] if the amount is zero or exceeds the wallet
    /// balance, or [`SessionError::Disconnected`].
    pub fn report_withdrawal(&self, amount: u64) -> SessionResult<()> {
        Ok(self.request(|reply| Command::ReportWithdrawal { amount, reply })??)
    }

    /// Validates a withdrawal against the current ledger.
    ///
    /// # Errors
    ///
    /// [`SessionError::Withdrawal`] if validation fails, or
    /// [`SessionError::Disconnected`].
    pub fn prepare_withdrawal(
        &self,
        amount: u64,
        recipient: &str,
    ) -> SessionResult<WithdrawalRequest> {
        let ledger = self.snapshot()?;
        Ok(WithdrawalRequest::validate(amount, recipient, &ledger)?)
    }

    /// Records a transfer outcome. Confirmed transfers are applied to the
    /// ledger; failed ones only land in the history. A confirmed receipt the
    /// ledger rejects is kept as [`TransferStatus::Failed`].
    ///
    /// # Errors
    ///
    /// As [`SessionClient::report_withdrawal`] for confirmed receipts.
    pub fn record_transfer(&self, receipt: TransferReceipt) -> SessionResult<()> {
        Ok(self.request(|reply| Command::RecordTransfer { receipt, reply })??)
    }

    /// Current state.
    ///
    /// # Errors
    ///
    /// [`SessionError::Disconnected`] after shutdown.
    pub fn snapshot(&self) -> SessionResult<EconomySnapshot> {
        self.request(|reply| Command::Snapshot { reply })
    }

    /// Current spots.
    ///
    /// # Errors
    ///
    /// [`SessionError::Disconnected`] after shutdown.
    pub fn spots(&self) -> SessionResult<Vec<MineSpot>> {
        self.request(|reply| Command::Spots { reply })
    }

    /// Activity feed, newest first.
    ///
    /// # Errors
    ///
    /// [`SessionError::Disconnected`] after shutdown.
    pub fn activity(&self) -> SessionResult<Vec<ActivityEntry>> {
        self.request(|reply| Command::Activity { reply })
    }

    /// Transfer history, newest first.
    ///
    /// # Errors
    ///
    /// [`SessionError::Disconnected`] after shutdown.
    pub fn transactions(&self) -> SessionResult<Vec<TransferReceipt>> {
        self.request(|reply| Command::Transactions { reply })
    }

    /// Dispatcher counters.
    ///
    /// # Errors
    ///
    /// [`SessionError::Disconnected`] after shutdown.
    pub fn stats(&self) -> SessionResult<DispatchStats> {
        self.request(|reply| Command::Stats { reply })
    }
}

/// What woke the dispatcher.
enum Wake {
    Command(Option<Command>),
    Tick,
    Respawn,
}

struct Dispatcher {
    engine: MiningEngine,
    commands: Receiver<Command>,
    presentation: Box<dyn PresentationPort>,
    wallet: Box<dyn WalletPort>,
    activity: ActivityLog,
    history: TransactionHistory,
    stats: DispatchStats,
}

impl Dispatcher {
    fn run(mut self) {
        self.stats.tick_interval = self.engine.tick_interval();
        let mut ticker = crossbeam_channel::tick(self.stats.tick_interval);
        let commands = self.commands.clone();
        tracing::info!(interval = ?self.stats.tick_interval, "mtk dispatcher running");
        self.publish_snapshot();

        loop {
            let respawn_timer = match self.engine.next_respawn_deadline() {
                Some(due) => crossbeam_channel::at(due),
                None => crossbeam_channel::never(),
            };

            let wake = select! {
                recv(commands) -> msg => Wake::Command(msg.ok()),
                recv(ticker) -> _ => Wake::Tick,
                recv(respawn_timer) -> _ => Wake::Respawn,
            };

            match wake {
                Wake::Command(None | Some(Command::Shutdown)) => break,
                Wake::Command(Some(command)) => {
                    self.stats.commands += 1;
                    if let Some(interval) = self.apply(command) {
                        ticker = crossbeam_channel::tick(interval);
                        self.stats.tick_interval = interval;
                        self.stats.timer_rearms += 1;
                        tracing::debug!(?interval, "tick timer re-armed");
                    }
                }
                Wake::Tick => {
                    self.engine.tick();
                    self.stats.ticks += 1;
                    self.flush_events();
                    self.publish_snapshot();
                }
                Wake::Respawn => {
                    let respawned = self.engine.process_respawns(Instant::now());
                    self.stats.respawns += respawned as u64;
                    self.settle(respawned > 0);
                }
            }
        }

        self.engine.cancel_respawns();
        tracing::info!(
            ticks = self.stats.ticks,
            commands = self.stats.commands,
            "mtk dispatcher stopped"
        );
    }

    /// Applies one command. Returns a new tick interval if the timer must be
    /// replaced.
    ///
    /// Replies go out after the command's events and snapshot, so a caller
    /// never observes a reply ahead of its side effects.
    fn apply(&mut self, command: Command) -> Option<Duration> {
        match command {
            Command::Strike { spot_index, reply } => {
                let hit = self.engine.strike(spot_index);
                self.settle(hit);
                let _ = reply.send(hit);
            }
            Command::StrikeAt { point, reply } => {
                let hit = self.engine.strike_at(point);
                self.settle(hit.is_some());
                let _ = reply.send(hit);
            }
            Command::Purchase { kind, reply } => {
                let result = self.engine.purchase(kind);
                let ok = self.report(result.as_ref().map(|_| ()));
                self.settle(ok);
                let rearm = result.as_ref().ok().and_then(|outcome| outcome.rearm_tick);
                let _ = reply.send(result);
                return rearm;
            }
            Command::Claim { reply } => {
                let result = self.engine.claim();
                let ok = self.report(result.as_ref().map(|_| ()));
                self.settle(ok);
                let _ = reply.send(result);
            }
            Command::ReportWithdrawal { amount, reply } => {
                let result = self.apply_withdrawal(amount);
                self.settle(result.is_ok());
                let _ = reply.send(result);
            }
            Command::RecordTransfer { mut receipt, reply } => {
                let result = if receipt.is_confirmed() {
                    self.apply_withdrawal(receipt.amount)
                } else {
                    self.presentation.on_notice(&Notice::new(
                        NoticeLevel::Error,
                        "Transaction failed on-chain",
                    ));
                    Ok(())
                };
                // History only shows withdrawals the ledger applied.
                if result.is_err() {
                    receipt.status = TransferStatus::Failed;
                }
                self.history.record(receipt);
                self.settle(result.is_ok());
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Spots { reply } => {
                let _ = reply.send(self.engine.spots().to_vec());
            }
            Command::Activity { reply } => {
                let _ = reply.send(self.activity.entries().cloned().collect());
            }
            Command::Transactions { reply } => {
                let _ = reply.send(self.history.entries().cloned().collect());
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.stats);
            }
            Command::Shutdown => {}
        }
        None
    }

    /// Publishes events and a fresh snapshot if the command changed state.
    fn settle(&mut self, changed: bool) {
        if changed {
            self.flush_events();
            self.publish_snapshot();
        }
    }

    fn apply_withdrawal(&mut self, amount: u64) -> EconomyResult<()> {
        let result = self.engine.report_withdrawal(amount);
        if result.is_ok() {
            self.activity.record_withdrawal(amount);
            self.wallet.on_withdrawal_recorded(amount);
            self.presentation.on_notice(&Notice::new(
                NoticeLevel::Success,
                format!("Successfully withdrew {amount} tokens!"),
            ));
        }
        self.report(result.as_ref().map(|_| ()));
        result
    }

    /// Publishes a rejection toast. Returns whether the result was `Ok`.
    fn report(&mut self, result: Result<(), &EconomyError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                self.presentation.on_notice(&Notice::from_error(err));
                false
            }
        }
    }

    fn flush_events(&mut self) {
        for event in self.engine.drain_events() {
            self.activity.record_event(&event);
            self.presentation.on_event(&event);
            if let Some(notice) = Notice::for_event(&event) {
                self.presentation.on_notice(&notice);
            }
            if let EconomyEvent::TokensClaimed { amount } = event {
                self.wallet.on_tokens_claimed(amount);
            }
        }
    }

    fn publish_snapshot(&mut self) {
        let snapshot = self.engine.snapshot();
        self.presentation.on_snapshot(&snapshot);
    }
}
