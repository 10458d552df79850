//! Total computation and the line-item breakdown behind it

use pledge_types::{AddOn, Amount, Reward, RewardId, ShippingRule};
use serde::{Deserialize, Serialize};

/// Shipping cost of one unit of `item` to the destination of `rule`.
///
/// Zero when no rule is selected, the item is the no-reward placeholder,
/// the item declares no shipping rules, or none of its rules ships to
/// that destination.
pub fn shipping_cost(item: &Reward, rule: Option<&ShippingRule>) -> Amount {
    let Some(rule) = rule else {
        return Amount::zero();
    };
    if item.is_no_reward() {
        return Amount::zero();
    }
    item.shipping_rules
        .iter()
        .find(|candidate| candidate.destination() == rule.destination())
        .map(|candidate| candidate.cost)
        .unwrap_or_default()
}

/// Price of a single add-on line: `(minimum + shipping) × quantity`
fn add_on_total(add_on: &AddOn, rule: Option<&ShippingRule>) -> Amount {
    add_on
        .reward
        .minimum
        .saturating_add(shipping_cost(&add_on.reward, rule))
        .checked_mul(add_on.quantity.as_non_zero())
        .unwrap_or(Amount(u64::MAX))
}

/// Total amount charged for a pledge, in minor units of the project
/// currency.
///
/// Amounts are integral minor units, so the sum is already at currency
/// precision and needs no further rounding.
pub fn compute_total(
    reward: &Reward,
    add_ons: &[AddOn],
    rule: Option<&ShippingRule>,
    bonus: Amount,
) -> Amount {
    let baseline = reward.minimum.saturating_add(shipping_cost(reward, rule));
    let add_ons_total: Amount = add_ons.iter().map(|a| add_on_total(a, rule)).sum();
    baseline.saturating_add(add_ons_total).saturating_add(bonus)
}

/// What a line of the pledge summary stands for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineItemKind {
    Reward,
    AddOn,
    Shipping,
    Bonus,
}

/// One row of the pledge summary
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub kind: LineItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_id: Option<RewardId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub quantity: u32,
    pub amount: Amount,
}

/// Subtotals of a priced pledge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeBreakdown {
    /// Reward minimum
    pub reward: Amount,
    /// Σ add-on minimum × quantity
    pub add_ons: Amount,
    /// Reward shipping plus Σ add-on shipping × quantity
    pub shipping: Amount,
    pub bonus: Amount,
    pub total: Amount,
    pub lines: Vec<LineItem>,
}

impl PledgeBreakdown {
    pub fn compute(
        reward: &Reward,
        add_ons: &[AddOn],
        rule: Option<&ShippingRule>,
        bonus: Amount,
    ) -> Self {
        let mut lines = Vec::with_capacity(add_ons.len() + 3);
        lines.push(LineItem {
            kind: LineItemKind::Reward,
            reward_id: Some(reward.id.clone()),
            title: reward.title.clone(),
            quantity: 1,
            amount: reward.minimum,
        });

        let mut add_ons_amount = Amount::zero();
        let mut shipping = shipping_cost(reward, rule);
        for add_on in add_ons {
            let quantity = add_on.quantity.as_non_zero();
            let amount = add_on
                .reward
                .minimum
                .checked_mul(quantity)
                .unwrap_or(Amount(u64::MAX));
            let add_on_shipping = shipping_cost(&add_on.reward, rule)
                .checked_mul(quantity)
                .unwrap_or(Amount(u64::MAX));

            add_ons_amount = add_ons_amount.saturating_add(amount);
            shipping = shipping.saturating_add(add_on_shipping);
            lines.push(LineItem {
                kind: LineItemKind::AddOn,
                reward_id: Some(add_on.reward.id.clone()),
                title: add_on.reward.title.clone(),
                quantity: quantity.get(),
                amount,
            });
        }

        if rule.is_some() && !shipping.is_zero() {
            lines.push(LineItem {
                kind: LineItemKind::Shipping,
                reward_id: None,
                title: rule.map(|r| r.location.name.clone()),
                quantity: 1,
                amount: shipping,
            });
        }
        if !bonus.is_zero() {
            lines.push(LineItem {
                kind: LineItemKind::Bonus,
                reward_id: None,
                title: None,
                quantity: 1,
                amount: bonus,
            });
        }

        Self {
            reward: reward.minimum,
            add_ons: add_ons_amount,
            shipping,
            bonus,
            total: compute_total(reward, add_ons, rule, bonus),
            lines,
        }
    }

    /// Amount pledged excluding shipping
    pub fn pledge_amount(&self) -> Amount {
        self.total.saturating_sub(self.shipping)
    }

    /// Rows in display order: reward, each add-on, shipping, bonus
    pub fn line_items(&self) -> &[LineItem] {
        &self.lines
    }

    /// Reward and add-on minimums, without shipping or bonus
    pub fn items_amount(&self) -> Amount {
        self.reward.saturating_add(self.add_ons)
    }
}
