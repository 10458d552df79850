//! Checkout state, the events that change it and the snapshot derived from it

use pledge_calculator::{
    convert, suggested_no_reward_amount, BonusInput, PledgeBreakdown, PledgeCalculator,
    PledgeLimits, QuoteRequest,
};
use pledge_types::{
    AddOn, Amount, Currency, LocationId, Money, PledgeReason, Project, ProjectId, Reward,
    RewardId, ShippingRule,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::CheckoutContext;

/// What a checkout session starts from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckoutInput {
    pub project: Project,
    pub reward: Reward,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
    #[serde(default)]
    pub reason: PledgeReason,
    /// Destination chosen on an earlier screen, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_rule: Option<ShippingRule>,
}

impl CheckoutInput {
    pub fn new(project: Project, reward: Reward) -> Self {
        Self {
            project,
            reward,
            add_ons: Vec::new(),
            reason: PledgeReason::Pledge,
            initial_rule: None,
        }
    }

    pub fn with_add_ons(mut self, add_ons: Vec<AddOn>) -> Self {
        self.add_ons = add_ons;
        self
    }

    pub fn with_reason(mut self, reason: PledgeReason) -> Self {
        self.reason = reason;
        self
    }

    pub fn with_initial_rule(mut self, rule: ShippingRule) -> Self {
        self.initial_rule = Some(rule);
        self
    }
}

/// Where the shipping rules of the selected reward stand
#[derive(Clone, Debug, PartialEq)]
pub enum ShippingStatus {
    /// The reward does not ship
    NotNeeded,
    /// A fetch tagged with `generation` is in flight
    Loading { generation: u64 },
    Loaded(Vec<ShippingRule>),
    Failed,
}

impl ShippingStatus {
    pub fn phase(&self) -> ShippingPhase {
        match self {
            ShippingStatus::NotNeeded => ShippingPhase::NotNeeded,
            ShippingStatus::Loading { .. } => ShippingPhase::Loading,
            ShippingStatus::Loaded(_) => ShippingPhase::Loaded,
            ShippingStatus::Failed => ShippingPhase::Failed,
        }
    }

    /// Shipping is known, so a total can be computed
    pub fn is_settled(&self) -> bool {
        matches!(self, ShippingStatus::NotNeeded | ShippingStatus::Loaded(_))
    }
}

/// [`ShippingStatus`] without its payload, for publishing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingPhase {
    NotNeeded,
    Loading,
    Loaded,
    Failed,
}

/// One input to a checkout session
#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutEvent {
    Started,
    ShippingRulesLoaded {
        generation: u64,
        rules: Vec<ShippingRule>,
    },
    ShippingRulesFailed {
        generation: u64,
        reason: String,
    },
    ShippingRuleSelected(ShippingRule),
    /// Raw text typed in the bonus field
    BonusInput(String),
    IncreaseBonus,
    DecreaseBonus,
    AddOnsUpdated(Vec<AddOn>),
    RewardChanged(Reward),
}

/// Work the session must perform after an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    FetchShippingRules {
        generation: u64,
        project_id: ProjectId,
        reward_id: RewardId,
    },
}

/// Everything the checkout shows, derived from the state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSnapshot {
    /// Number of events applied so far
    pub revision: u64,
    pub reason: PledgeReason,
    pub reward_id: RewardId,
    pub currency: Currency,
    pub shipping: ShippingPhase,
    /// None until shipping is known; stays None when the fetch failed
    pub breakdown: Option<PledgeBreakdown>,
    pub total: Option<Amount>,
    /// Total in the currency the user prefers, when it differs
    pub converted_total: Option<Money>,
    pub selected_rule: Option<ShippingRule>,
    pub shipping_rules: Vec<ShippingRule>,
    pub bonus: Amount,
    pub limits: PledgeLimits,
    pub max_pledge_exceeded: bool,
    pub can_increase_bonus: bool,
    pub can_decrease_bonus: bool,
    pub shipping_selectable: bool,
    pub bonus_editable: bool,
    pub submit_enabled: bool,
}

/// State of one checkout session.
///
/// Owned by a single task. [`CheckoutState::reduce`] is the only way it
/// changes, and [`CheckoutState::snapshot`] recomputes every derived
/// value from scratch.
#[derive(Clone, Debug)]
pub struct CheckoutState {
    context: CheckoutContext,
    calculator: PledgeCalculator,
    project: Project,
    reward: Reward,
    add_ons: Vec<AddOn>,
    reason: PledgeReason,
    initial_rule: Option<ShippingRule>,
    selected_rule: Option<ShippingRule>,
    shipping: ShippingStatus,
    bonus: Amount,
    generation: u64,
    revision: u64,
}

impl CheckoutState {
    pub fn new(context: CheckoutContext, input: CheckoutInput, calculator: PledgeCalculator) -> Self {
        let mut state = Self {
            context,
            calculator,
            project: input.project,
            reward: input.reward,
            add_ons: input.add_ons,
            reason: input.reason,
            initial_rule: input.initial_rule,
            selected_rule: None,
            shipping: ShippingStatus::NotNeeded,
            bonus: Amount::zero(),
            generation: 0,
            revision: 0,
        };
        state.normalize_reward();
        state
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn reward(&self) -> &Reward {
        &self.reward
    }

    pub fn add_ons(&self) -> &[AddOn] {
        &self.add_ons
    }

    pub fn reason(&self) -> PledgeReason {
        self.reason
    }

    pub fn shipping(&self) -> &ShippingStatus {
        &self.shipping
    }

    pub fn selected_rule(&self) -> Option<&ShippingRule> {
        self.selected_rule.as_ref()
    }

    pub fn bonus(&self) -> Amount {
        self.bonus
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an event and return the effects it requires.
    ///
    /// Events that change nothing (stale fetch results, bonus edits in a
    /// flow that fixes the amount) leave the revision untouched.
    pub fn reduce(&mut self, event: CheckoutEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        let applied = match event {
            CheckoutEvent::Started => {
                self.bonus = self.initial_bonus();
                effects.extend(self.refresh_shipping());
                true
            }
            CheckoutEvent::ShippingRulesLoaded { generation, rules } => {
                if self.is_current_fetch(generation) {
                    self.reward.shipping_rules = rules.clone();
                    self.selected_rule = self.default_rule(&rules);
                    debug!(
                        generation,
                        rules = rules.len(),
                        selected = self.selected_rule.as_ref().map(|r| r.destination().0.as_str()),
                        "Shipping rules loaded"
                    );
                    self.shipping = ShippingStatus::Loaded(rules);
                    true
                } else {
                    debug!(generation, current = self.generation, "Ignoring stale shipping rules");
                    false
                }
            }
            CheckoutEvent::ShippingRulesFailed { generation, reason } => {
                if self.is_current_fetch(generation) {
                    warn!(generation, reward = %self.reward.id, reason = %reason, "Shipping rules fetch failed");
                    self.shipping = ShippingStatus::Failed;
                    true
                } else {
                    debug!(generation, current = self.generation, "Ignoring stale shipping failure");
                    false
                }
            }
            CheckoutEvent::ShippingRuleSelected(rule) => {
                self.selected_rule = Some(rule);
                true
            }
            CheckoutEvent::BonusInput(raw) => {
                if self.bonus_editable() {
                    let input = BonusInput::parse(self.project.currency, &raw);
                    if let BonusInput::Rejected(e) = &input {
                        warn!(input = %raw, error = %e, "Bonus input rejected");
                    }
                    self.bonus = input.resolve(self.bonus);
                }
                self.bonus_editable()
            }
            CheckoutEvent::IncreaseBonus => {
                if self.bonus_editable() {
                    let limits = self.limits();
                    self.bonus = self.stepper_increase(&limits);
                }
                self.bonus_editable()
            }
            CheckoutEvent::DecreaseBonus => {
                if self.bonus_editable() {
                    self.bonus = self.calculator.stepper(self.project.currency).decrease(self.bonus);
                }
                self.bonus_editable()
            }
            CheckoutEvent::AddOnsUpdated(add_ons) => {
                self.add_ons = add_ons;
                true
            }
            CheckoutEvent::RewardChanged(reward) => {
                self.reward = reward;
                self.normalize_reward();
                effects.extend(self.refresh_shipping());
                true
            }
        };

        if applied {
            self.revision += 1;
        }
        effects
    }

    /// Derive everything shown to the user from the current state.
    pub fn snapshot(&self) -> CheckoutSnapshot {
        let currency = self.project.currency;
        let bonus_editable = self.bonus_editable();
        let stepper = self.calculator.stepper(currency);

        let (breakdown, limits) = if self.shipping.is_settled() {
            let quote = self.calculator.quote(&QuoteRequest {
                country: self.project.country,
                currency,
                reward: &self.reward,
                add_ons: &self.add_ons,
                rule: self.selected_rule.as_ref(),
                bonus: self.bonus,
            });
            (Some(quote.breakdown), quote.limits)
        } else {
            (None, self.limits())
        };

        let total = breakdown.as_ref().map(|b| b.total);
        let max_pledge_exceeded = breakdown
            .as_ref()
            .is_some_and(|b| limits.is_exceeded_by(b));
        let converted_total = total
            .filter(|_| self.project.needs_conversion())
            .map(|total| {
                let to = self.project.current_currency;
                Money::new(convert(total, currency, to, self.project.fx_rate), to)
            });
        let shipping_rules = match &self.shipping {
            ShippingStatus::Loaded(rules) => rules.clone(),
            _ => Vec::new(),
        };

        CheckoutSnapshot {
            revision: self.revision,
            reason: self.reason,
            reward_id: self.reward.id.clone(),
            currency,
            shipping: self.shipping.phase(),
            converted_total,
            selected_rule: self.selected_rule.clone(),
            shipping_rules,
            bonus: self.bonus,
            max_pledge_exceeded,
            can_increase_bonus: bonus_editable && stepper.can_increase(self.bonus, &limits),
            can_decrease_bonus: bonus_editable && stepper.can_decrease(self.bonus),
            shipping_selectable: self.shipping_selectable(),
            bonus_editable,
            submit_enabled: self.submit_enabled(total, max_pledge_exceeded),
            breakdown,
            total,
            limits,
        }
    }

    fn limits(&self) -> PledgeLimits {
        self.calculator
            .limits(self.project.country, &self.reward, &self.add_ons)
    }

    fn stepper_increase(&self, limits: &PledgeLimits) -> Amount {
        self.calculator
            .stepper(self.project.currency)
            .increase(self.bonus, limits)
    }

    fn bonus_editable(&self) -> bool {
        self.reason.is_editing_amounts()
    }

    /// The destination picker is shown for a shippable reward on its own;
    /// with add-ons the destination was fixed on the add-ons screen.
    fn shipping_selectable(&self) -> bool {
        self.reward.is_shippable() && self.add_ons.is_empty() && self.reason.is_editing_amounts()
    }

    fn submit_enabled(&self, total: Option<Amount>, max_pledge_exceeded: bool) -> bool {
        let Some(total) = total else {
            return false;
        };
        if max_pledge_exceeded {
            return false;
        }
        match (self.reason, &self.project.backing) {
            (PledgeReason::UpdatePledge, Some(backing)) => {
                let destination = self.selected_rule.as_ref().map(|r| r.destination());
                destination != backing.location_id.as_ref() || total != backing.amount
            }
            _ => true,
        }
    }

    fn is_current_fetch(&self, generation: u64) -> bool {
        self.shipping == ShippingStatus::Loading { generation }
    }

    /// The no-reward placeholder never asks for less than the country floor.
    fn normalize_reward(&mut self) {
        if self.reward.is_no_reward() {
            let floor = self.project.country.min_pledge();
            self.reward.minimum = self.reward.minimum.max(floor);
        }
    }

    /// Bonus a session opens with.
    ///
    /// Flows that start from a backing recover the bonus as whatever the
    /// backing pledged beyond shipping and item minimums. A new no-reward
    /// pledge starts at the suggested amount for the experiment arm.
    fn initial_bonus(&self) -> Amount {
        if self.reason.has_backing() {
            let Some(backing) = &self.project.backing else {
                return Amount::zero();
            };
            let add_on_minimums: Amount = self
                .add_ons
                .iter()
                .map(|a| {
                    a.reward
                        .minimum
                        .checked_mul(a.quantity.as_non_zero())
                        .unwrap_or(Amount(u64::MAX))
                })
                .sum();
            return backing
                .pledge_amount()
                .saturating_sub(self.reward.minimum)
                .saturating_sub(add_on_minimums);
        }
        if self.reward.is_no_reward() {
            let suggested = suggested_no_reward_amount(
                self.context.config.no_reward_variant,
                self.project.currency,
                self.reward.minimum,
            );
            return suggested.saturating_sub(self.reward.minimum);
        }
        Amount::zero()
    }

    /// Start a new shipping fetch for the current reward, superseding any
    /// fetch in flight.
    fn refresh_shipping(&mut self) -> Option<Effect> {
        self.generation += 1;
        if !self.reward.is_shippable() {
            self.shipping = ShippingStatus::NotNeeded;
            self.selected_rule = if self.reward.is_no_reward() {
                None
            } else {
                self.initial_rule.clone()
            };
            return None;
        }
        self.shipping = ShippingStatus::Loading {
            generation: self.generation,
        };
        Some(Effect::FetchShippingRules {
            generation: self.generation,
            project_id: self.project.id.clone(),
            reward_id: self.reward.id.clone(),
        })
    }

    /// Preselected destination, in order: the one already selected, the
    /// backing's, the one chosen on an earlier screen, the user's country,
    /// then the first rule.
    fn default_rule(&self, rules: &[ShippingRule]) -> Option<ShippingRule> {
        let by_destination =
            |id: &LocationId| rules.iter().find(|rule| rule.destination() == id);

        let current = self
            .selected_rule
            .as_ref()
            .and_then(|r| by_destination(r.destination()));
        let backing = self
            .project
            .backing
            .as_ref()
            .and_then(|b| b.location_id.as_ref())
            .and_then(by_destination);
        let initial = self
            .initial_rule
            .as_ref()
            .and_then(|r| by_destination(r.destination()));
        let country = self.context.country();
        let local = rules
            .iter()
            .find(|rule| rule.location.country == Some(country));

        current
            .or(backing)
            .or(initial)
            .or(local)
            .or_else(|| rules.first())
            .cloned()
    }
}
