use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ergoswap_core::{Balance, FeePolicy};
use ergoswap_sources::{AssetCatalog, BalanceSource, MemoryMarket, PoolSource};
use ergoswap_sync::{
    check, evaluate, submit, ActionState, Command, ConfirmationRequest, FieldValue, FormEvent,
    FormSnapshot, FormValues, GateReason, QueryKey, Side, SwapStrategy, Synchronizer,
};
use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::confirmation::{ConfirmationOutcome, ConfirmationStep};
use crate::error::SessionError;

/// Data feeds a session reads from
#[derive(Clone)]
pub struct Sources {
    pub pools: Arc<dyn PoolSource>,
    pub balances: Arc<dyn BalanceSource>,
    pub catalog: Arc<dyn AssetCatalog>,
}

impl Sources {
    pub fn from_market(market: Arc<MemoryMarket>) -> Self {
        Sources {
            pools: market.clone(),
            balances: market.clone(),
            catalog: market,
        }
    }
}

/// What observers of a session see after every processed message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub form: FormSnapshot,
    /// First failing gate, or the action caption
    pub action: ActionState,
    /// Every failing gate, in report order
    pub gate: Vec<GateReason>,
    /// No lookup is waiting for its first result
    pub settled: bool,
    /// Edits applied so far
    pub edits: u64,
}

impl SessionState {
    fn capture(sync: &Synchronizer, strategy: &SwapStrategy, settled: bool, edits: u64) -> Self {
        let model = sync.model();
        SessionState {
            form: model.snapshot(),
            action: evaluate(strategy, model),
            gate: check(strategy, model),
            settled,
            edits,
        }
    }
}

/// A confirmed or cancelled hand-off
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub request: ConfirmationRequest,
    pub outcome: ConfirmationOutcome,
}

enum Message {
    Edit(FormValues),
    EditField(Side, FieldValue),
    Event(FormEvent),
    Wallet(Balance),
    Submit(oneshot::Sender<Result<ConfirmationRequest, SessionError>>),
    Shutdown,
}

/// Event loop owning the swap form.
///
/// Edits and lookup results are queued on one channel and applied strictly
/// in arrival order. Each lookup runs as its own task; issuing a new lookup
/// for the same query aborts the old task.
pub struct SwapSession {
    sync: Synchronizer,
    strategy: SwapStrategy,
    sources: Sources,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    tasks: HashMap<QueryKey, JoinHandle<()>>,
    /// Generation of each lookup still waiting for its first result
    awaiting: HashMap<QueryKey, u64>,
    edits: u64,
    state_tx: watch::Sender<SessionState>,
}

impl SwapSession {
    /// Start a session on the current tokio runtime
    pub fn spawn(
        sources: Sources,
        initial: FormValues,
        fees: FeePolicy,
        confirmation: Arc<dyn ConfirmationStep>,
    ) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let sync = Synchronizer::new(initial);
        let strategy = SwapStrategy::new(Balance::new(), fees);
        let (state_tx, state_rx) =
            watch::channel(SessionState::capture(&sync, &strategy, false, 0));

        let session = SwapSession {
            sync,
            strategy,
            sources,
            tx: tx.clone(),
            rx,
            tasks: HashMap::new(),
            awaiting: HashMap::new(),
            edits: 0,
            state_tx,
        };
        let task = tokio::spawn(session.run());

        SessionHandle {
            tx,
            state: state_rx,
            confirmation,
            edits_sent: AtomicU64::new(0),
            task: Some(task),
        }
    }

    async fn run(mut self) {
        info!("Swap session started");
        self.watch_wallet();
        let commands = self.sync.start();
        self.execute(commands);
        self.publish();

        while let Some(message) = self.rx.recv().await {
            match message {
                Message::Edit(values) => self.apply_edit(values),
                Message::EditField(side, field) => {
                    let mut values = self.sync.model().values();
                    match side {
                        Side::From => values.from = field,
                        Side::To => values.to = field,
                    }
                    self.apply_edit(values);
                }
                Message::Event(event) => {
                    self.settle(&event);
                    let commands = self.sync.reduce(event);
                    self.execute(commands);
                }
                Message::Wallet(balance) => {
                    debug!("Wallet balance updated ({} assets)", balance.len());
                    self.awaiting.remove(&QueryKey::Balance);
                    self.strategy.set_balance(balance);
                }
                Message::Submit(reply) => {
                    let result = submit(&self.strategy, self.sync.model()).map_err(SessionError::from);
                    // Caller may have stopped waiting
                    let _ = reply.send(result);
                }
                Message::Shutdown => break,
            }
            self.publish();
        }

        for (_, task) in self.tasks.drain() {
            task.abort();
        }
        info!("Swap session stopped");
    }

    fn apply_edit(&mut self, values: FormValues) {
        self.edits += 1;
        let commands = self.sync.reduce(FormEvent::ValuesChanged(values));
        self.execute(commands);
    }

    /// Mark a lookup as answered once its current generation reports back
    fn settle(&mut self, event: &FormEvent) {
        let ticket = match event {
            FormEvent::ValuesChanged(_) => return,
            FormEvent::PoolsResolved { ticket, .. }
            | FormEvent::PoolsFailed { ticket, .. }
            | FormEvent::PairedAssetsResolved { ticket, .. } => *ticket,
        };
        if self.awaiting.get(&ticket.key) == Some(&ticket.generation) {
            self.awaiting.remove(&ticket.key);
        }
    }

    fn watch_wallet(&mut self) {
        let mut stream = self.sources.balances.wallet_balance();
        let tx = self.tx.clone();
        self.awaiting.insert(QueryKey::Balance, 0);
        let task = tokio::spawn(async move {
            while let Some(balance) = stream.next().await {
                if tx.send(Message::Wallet(balance)).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(QueryKey::Balance, task);
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            let ticket = command.ticket();
            if let Some(previous) = self.tasks.remove(&ticket.key) {
                debug!("Aborting superseded {:?} lookup", ticket.key);
                previous.abort();
            }
            self.awaiting.insert(ticket.key, ticket.generation);

            let tx = self.tx.clone();
            let task = match command {
                Command::LookupPools { ticket, base, quote } => {
                    debug!("Pool lookup gen {} for {}", ticket.generation, base);
                    let mut stream = self.sources.pools.lookup_pools(base, quote);
                    tokio::spawn(async move {
                        while let Some(result) = stream.next().await {
                            let (event, last) = match result {
                                Ok(pools) => (FormEvent::PoolsResolved { ticket, pools }, false),
                                Err(e) => (
                                    FormEvent::PoolsFailed {
                                        ticket,
                                        reason: e.to_string(),
                                    },
                                    true,
                                ),
                            };
                            if tx.send(Message::Event(event)).is_err() || last {
                                break;
                            }
                        }
                    })
                }
                Command::LookupPairedAssets {
                    ticket,
                    paired_with,
                } => {
                    let lookup = match paired_with {
                        Some(asset) => self.sources.catalog.list_paired_assets(asset),
                        None => self.sources.catalog.list_assets(),
                    };
                    tokio::spawn(async move {
                        let assets = lookup.await.unwrap_or_else(|e| {
                            warn!("Asset lookup failed: {}", e);
                            Vec::new()
                        });
                        let _ = tx.send(Message::Event(FormEvent::PairedAssetsResolved {
                            ticket,
                            assets,
                        }));
                    })
                }
            };
            self.tasks.insert(ticket.key, task);
        }
    }

    fn publish(&self) {
        let next = SessionState::capture(
            &self.sync,
            &self.strategy,
            self.awaiting.is_empty(),
            self.edits,
        );
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}

/// Caller side of a running session. Dropping it stops the session.
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<SessionState>,
    confirmation: Arc<dyn ConfirmationStep>,
    edits_sent: AtomicU64,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Replace both fields at once
    pub fn edit(&self, values: FormValues) -> Result<(), SessionError> {
        self.send(Message::Edit(values))?;
        self.edits_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Replace one field, keeping the other as the session currently has it
    pub fn edit_field(&self, side: Side, field: FieldValue) -> Result<(), SessionError> {
        self.send(Message::EditField(side, field))?;
        self.edits_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Wait for the next published state
    pub async fn changed(&mut self) -> Result<SessionState, SessionError> {
        self.state
            .changed()
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(self.state.borrow_and_update().clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionState) -> bool,
    ) -> Result<SessionState, SessionError> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(predicate)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(state.clone())
    }

    /// Wait until every edit sent so far is applied and no lookup is pending
    pub async fn settled(&self) -> Result<SessionState, SessionError> {
        let sent = self.edits_sent.load(Ordering::SeqCst);
        self.wait_for(|s| s.settled && s.edits >= sent).await
    }

    /// Gate the current form and, if it passes, run the confirmation step
    pub async fn submit(&self) -> Result<Submission, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Message::Submit(reply_tx))?;
        let request = reply_rx.await.map_err(|_| SessionError::Closed)??;

        let (done_tx, done_rx) = oneshot::channel();
        self.confirmation.open(request.clone(), done_tx);
        let outcome = done_rx
            .await
            .map_err(|_| SessionError::ConfirmationDropped)?;
        info!("Swap {:?}", outcome);

        Ok(Submission { request, outcome })
    }

    /// Stop the session and wait for its task to finish
    pub async fn shutdown(mut self) -> Result<(), SessionError> {
        let _ = self.tx.send(Message::Shutdown);
        if let Some(task) = self.task.take() {
            task.await.map_err(|e| SessionError::Task(e.to_string()))?;
        }
        Ok(())
    }

    fn send(&self, message: Message) -> Result<(), SessionError> {
        self.tx.send(message).map_err(|_| SessionError::Closed)
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.tx.send(Message::Shutdown);
        }
    }
}
