//! Bonus support: pledge bounds, the +/- stepper and free-text input

use crate::PledgeBreakdown;
use pledge_types::{AddOn, Amount, Country, Currency, PledgeError, Reward};
use serde::{Deserialize, Serialize};

/// Bounds a pledge must stay within
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeLimits {
    /// Lowest pledge: the reward minimum, or the country floor when
    /// pledging without a reward
    pub minimum: Amount,
    /// Largest pledge the country allows, shipping excluded
    pub maximum: Amount,
    /// Largest bonus that keeps the pledge within `maximum`
    pub max_bonus: Amount,
}

impl PledgeLimits {
    pub fn for_pledge(country: Country, reward: &Reward, add_ons: &[AddOn]) -> Self {
        let minimum = if reward.is_no_reward() {
            reward.minimum.max(country.min_pledge())
        } else {
            reward.minimum
        };
        let add_on_minimums: Amount = add_ons
            .iter()
            .map(|a| {
                a.reward
                    .minimum
                    .checked_mul(a.quantity.as_non_zero())
                    .unwrap_or(Amount(u64::MAX))
            })
            .sum();
        let maximum = country.max_pledge();
        Self {
            minimum,
            maximum,
            max_bonus: maximum.saturating_sub(minimum.saturating_add(add_on_minimums)),
        }
    }

    /// The pledge, shipping excluded, is above what the country allows
    pub fn is_exceeded_by(&self, breakdown: &PledgeBreakdown) -> bool {
        breakdown.pledge_amount() > self.maximum
    }
}

/// The +/- buttons next to the bonus field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusStepper {
    /// Amount added or removed per click
    pub step: Amount,
}

impl BonusStepper {
    /// One whole unit of `currency` per click
    pub fn for_currency(currency: Currency) -> Self {
        Self {
            step: Amount::new(currency.major_unit()),
        }
    }

    pub fn with_step(step: Amount) -> Self {
        Self { step }
    }

    pub fn can_increase(&self, bonus: Amount, limits: &PledgeLimits) -> bool {
        bonus.saturating_add(self.step) <= limits.max_bonus
    }

    pub fn can_decrease(&self, bonus: Amount) -> bool {
        !bonus.is_zero()
    }

    /// Next bonus after a "+" click; unchanged when it would pass the limit
    pub fn increase(&self, bonus: Amount, limits: &PledgeLimits) -> Amount {
        if self.can_increase(bonus, limits) {
            bonus.saturating_add(self.step)
        } else {
            bonus
        }
    }

    /// Next bonus after a "-" click; never below zero
    pub fn decrease(&self, bonus: Amount) -> Amount {
        bonus.saturating_sub(self.step)
    }
}

/// Outcome of parsing what the user typed in the bonus field
#[derive(Debug)]
pub enum BonusInput {
    /// A valid, non-negative amount
    Accepted(Amount),
    /// A negative amount, clamped to zero
    Clamped,
    /// Not a number; the previous bonus stays in effect
    Rejected(PledgeError),
}

impl BonusInput {
    /// Interpret raw input in `currency`. An empty field means no bonus.
    pub fn parse(currency: Currency, raw: &str) -> Self {
        if raw.trim().is_empty() {
            return BonusInput::Accepted(Amount::zero());
        }
        match currency.parse_amount(raw) {
            Ok(amount) => BonusInput::Accepted(amount),
            Err(PledgeError::NegativeAmount(_)) => BonusInput::Clamped,
            Err(e) => BonusInput::Rejected(e),
        }
    }

    /// The bonus to use given the one currently in effect
    pub fn resolve(&self, previous: Amount) -> Amount {
        match self {
            BonusInput::Accepted(amount) => *amount,
            BonusInput::Clamped => Amount::zero(),
            BonusInput::Rejected(_) => previous,
        }
    }
}
