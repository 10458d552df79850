//! The task that owns a checkout and publishes its totals

use std::sync::{Arc, Mutex};

use pledge_calculator::PledgeCalculator;
use pledge_types::{AddOn, Amount, PledgeError, PledgeResult, Reward, ShippingRule};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    CheckoutContext, CheckoutEvent, CheckoutInput, CheckoutSnapshot, CheckoutState, Effect,
    ShippingRuleProvider,
};

/// Capacity of the inbound event queue
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the published totals stream
const TOTALS_CHANNEL_CAPACITY: usize = 1024;

/// Entry point for running a checkout.
pub struct CheckoutSession;

impl CheckoutSession {
    /// Spawn a session with the default calculator.
    ///
    /// The session is started before this returns: the first snapshot
    /// already shows shipping loading or, for a reward that does not ship,
    /// its total.
    pub fn spawn(
        context: CheckoutContext,
        input: CheckoutInput,
        provider: Arc<dyn ShippingRuleProvider>,
    ) -> CheckoutHandle {
        Self::spawn_with_calculator(context, input, provider, PledgeCalculator::new())
    }

    pub fn spawn_with_calculator(
        context: CheckoutContext,
        input: CheckoutInput,
        provider: Arc<dyn ShippingRuleProvider>,
        calculator: PledgeCalculator,
    ) -> CheckoutHandle {
        let mut state = CheckoutState::new(context, input, calculator);
        // Nothing is published before the session has started
        let effects = state.reduce(CheckoutEvent::Started);
        let snapshot = state.snapshot();

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (totals_tx, first_totals) = broadcast::channel(TOTALS_CHANNEL_CAPACITY);
        if let Some(total) = snapshot.total {
            let _ = totals_tx.send(total);
        }
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot);
        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);

        info!(
            project = %state.project().id,
            reward = %state.reward().id,
            reason = ?state.reason(),
            shipping = ?state.shipping().phase(),
            "Checkout session started"
        );

        let worker = SessionWorker {
            state,
            provider,
            events: event_tx.downgrade(),
            snapshots: snapshot_tx,
            totals: totals_tx.clone(),
            fetch: None,
        };
        let task = tokio::spawn(worker.run(effects, event_rx, stop_rx));

        CheckoutHandle {
            events: event_tx,
            snapshots: snapshot_rx,
            totals: totals_tx,
            first_totals: Mutex::new(Some(first_totals)),
            stop: stop_tx,
            task,
        }
    }
}

/// State and outputs owned by the session task
struct SessionWorker {
    state: CheckoutState,
    provider: Arc<dyn ShippingRuleProvider>,
    /// Fetch tasks report back through this without keeping the session alive
    events: mpsc::WeakSender<CheckoutEvent>,
    snapshots: watch::Sender<CheckoutSnapshot>,
    totals: broadcast::Sender<Amount>,
    fetch: Option<JoinHandle<()>>,
}

impl SessionWorker {
    async fn run(
        mut self,
        startup: Vec<Effect>,
        mut event_rx: mpsc::Receiver<CheckoutEvent>,
        mut stop_rx: mpsc::Receiver<()>,
    ) {
        for effect in startup {
            self.run_effect(effect);
        }

        loop {
            // Queued events are applied before a stop request
            tokio::select! {
                biased;
                event = event_rx.recv() => {
                    match event {
                        Some(event) => self.handle(event),
                        None => {
                            debug!("all checkout handles dropped");
                            break;
                        }
                    }
                }
                _ = stop_rx.recv() => {
                    debug!("checkout session stopped");
                    break;
                }
            }
        }

        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        info!(
            project = %self.state.project().id,
            revision = self.state.revision(),
            "Checkout session closed"
        );
    }

    fn handle(&mut self, event: CheckoutEvent) {
        let revision = self.state.revision();
        let effects = self.state.reduce(event);
        for effect in effects {
            self.run_effect(effect);
        }
        if self.state.revision() == revision {
            return;
        }

        let snapshot = self.state.snapshot();
        if let Some(total) = snapshot.total {
            // No subscribers is fine
            let _ = self.totals.send(total);
        }
        self.snapshots.send_replace(snapshot);
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchShippingRules {
                generation,
                project_id,
                reward_id,
            } => {
                if let Some(previous) = self.fetch.take() {
                    previous.abort();
                }
                debug!(generation, reward = %reward_id, "Fetching shipping rules");

                let provider = self.provider.clone();
                let events = self.events.clone();
                self.fetch = Some(tokio::spawn(async move {
                    let event = match provider.fetch_shipping_rules(&project_id, &reward_id).await {
                        Ok(rules) => CheckoutEvent::ShippingRulesLoaded { generation, rules },
                        Err(e) => CheckoutEvent::ShippingRulesFailed {
                            generation,
                            reason: e.to_string(),
                        },
                    };
                    if let Some(events) = events.upgrade() {
                        let _ = events.send(event).await;
                    }
                }));
            }
        }
    }
}

/// Handle to a running checkout session.
pub struct CheckoutHandle {
    events: mpsc::Sender<CheckoutEvent>,
    snapshots: watch::Receiver<CheckoutSnapshot>,
    totals: broadcast::Sender<Amount>,
    /// Subscribed before the session started; handed to the first caller
    first_totals: Mutex<Option<broadcast::Receiver<Amount>>>,
    stop: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CheckoutHandle {
    /// Queue an event for the session.
    pub async fn send(&self, event: CheckoutEvent) -> PledgeResult<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| PledgeError::SessionClosed)
    }

    pub async fn select_shipping_rule(&self, rule: ShippingRule) -> PledgeResult<()> {
        self.send(CheckoutEvent::ShippingRuleSelected(rule)).await
    }

    pub async fn bonus_input(&self, raw: impl Into<String>) -> PledgeResult<()> {
        self.send(CheckoutEvent::BonusInput(raw.into())).await
    }

    pub async fn increase_bonus(&self) -> PledgeResult<()> {
        self.send(CheckoutEvent::IncreaseBonus).await
    }

    pub async fn decrease_bonus(&self) -> PledgeResult<()> {
        self.send(CheckoutEvent::DecreaseBonus).await
    }

    pub async fn update_add_ons(&self, add_ons: Vec<AddOn>) -> PledgeResult<()> {
        self.send(CheckoutEvent::AddOnsUpdated(add_ons)).await
    }

    pub async fn change_reward(&self, reward: Reward) -> PledgeResult<()> {
        self.send(CheckoutEvent::RewardChanged(reward)).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> CheckoutSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Follow snapshots as they are published
    pub fn subscribe(&self) -> watch::Receiver<CheckoutSnapshot> {
        self.snapshots.clone()
    }

    /// Every computed total, one per recomputation.
    ///
    /// The first subscriber sees every total since the session started;
    /// later ones see totals published after they subscribe.
    pub fn subscribe_totals(&self) -> broadcast::Receiver<Amount> {
        self.first_totals
            .lock()
            .ok()
            .and_then(|mut first| first.take())
            .unwrap_or_else(|| self.totals.subscribe())
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&CheckoutSnapshot) -> bool,
    ) -> PledgeResult<CheckoutSnapshot> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(predicate)
            .await
            .map_err(|_| PledgeError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    /// Stop the session and wait for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(()).await;
        let _ = self.task.await;
    }
}
