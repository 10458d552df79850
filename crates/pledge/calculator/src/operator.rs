use pledge_types::{AddOn, Amount, Country, Currency, Reward, ShippingRule};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BonusStepper, PledgeBreakdown, PledgeLimits};

/// Pledge Calculator.
///
/// Prices a pledge and derives everything the checkout shows next to the
/// total: the bounds the bonus must respect and whether the stepper
/// buttons are usable. Holds no state between calls; every quote is
/// computed from scratch.
#[derive(Clone, Debug, Default)]
pub struct PledgeCalculator {
    config: CalculatorConfig,
}

/// Configuration for the pledge calculator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Whole currency units added or removed per stepper click
    pub bonus_step_major: u64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self { bonus_step_major: 1 }
    }
}

/// Everything needed to price one pledge
#[derive(Clone, Copy, Debug)]
pub struct QuoteRequest<'a> {
    pub country: Country,
    pub currency: Currency,
    pub reward: &'a Reward,
    pub add_ons: &'a [AddOn],
    pub rule: Option<&'a ShippingRule>,
    pub bonus: Amount,
}

/// A priced pledge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub breakdown: PledgeBreakdown,
    pub limits: PledgeLimits,
    /// The pledge, shipping excluded, is above the country maximum
    pub max_pledge_exceeded: bool,
    pub can_increase_bonus: bool,
    pub can_decrease_bonus: bool,
}

impl PledgeCalculator {
    /// Create a new calculator with default config.
    pub fn new() -> Self {
        Self {
            config: CalculatorConfig::default(),
        }
    }

    /// Create with custom configuration.
    pub fn with_config(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Stepper for `currency`, moving `bonus_step_major` whole units per click
    pub fn stepper(&self, currency: Currency) -> BonusStepper {
        BonusStepper::with_step(Amount::from_major(self.config.bonus_step_major.max(1), currency))
    }

    pub fn limits(&self, country: Country, reward: &Reward, add_ons: &[AddOn]) -> PledgeLimits {
        PledgeLimits::for_pledge(country, reward, add_ons)
    }

    /// Price a pledge.
    ///
    /// A no-reward pledge is priced at no less than the country minimum.
    pub fn quote(&self, request: &QuoteRequest<'_>) -> Quote {
        let limits = self.limits(request.country, request.reward, request.add_ons);
        let floored;
        let reward = if request.reward.is_no_reward() && request.reward.minimum < limits.minimum {
            floored = Reward {
                minimum: limits.minimum,
                ..request.reward.clone()
            };
            &floored
        } else {
            request.reward
        };
        let breakdown = PledgeBreakdown::compute(reward, request.add_ons, request.rule, request.bonus);
        let stepper = self.stepper(request.currency);
        let max_pledge_exceeded = limits.is_exceeded_by(&breakdown);

        debug!(
            reward = %request.reward.id,
            add_ons = request.add_ons.len(),
            destination = request.rule.map(|r| r.destination().0.as_str()),
            bonus = request.bonus.minor(),
            total = breakdown.total.minor(),
            max_pledge_exceeded,
            "Pledge priced"
        );

        Quote {
            can_increase_bonus: stepper.can_increase(request.bonus, &limits),
            can_decrease_bonus: stepper.can_decrease(request.bonus),
            breakdown,
            limits,
            max_pledge_exceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pledge_types::{Location, LocationId, ShippingPreference};

    fn usd(major: u64) -> Amount {
        Amount::from_major(major, Currency::Usd)
    }

    fn request<'a>(reward: &'a Reward, rule: Option<&'a ShippingRule>, bonus: Amount) -> QuoteRequest<'a> {
        QuoteRequest {
            country: Country::US,
            currency: Currency::Usd,
            reward,
            add_ons: &[],
            rule,
            bonus,
        }
    }

    #[test]
    fn quote_includes_shipping_and_bonus() {
        let to_us = ShippingRule::new(Location::new(LocationId::new("us"), "United States"), usd(30));
        let reward = Reward::new(usd(20))
            .with_shipping(ShippingPreference::Restricted, vec![to_us.clone()]);

        let quote = PledgeCalculator::new().quote(&request(&reward, Some(&to_us), usd(5)));
        assert_eq!(quote.breakdown.total, usd(55));
        assert_eq!(quote.limits.max_bonus, usd(9_980));
        assert!(quote.can_increase_bonus);
        assert!(quote.can_decrease_bonus);
        assert!(!quote.max_pledge_exceeded);
    }

    #[test]
    fn custom_step() {
        let calculator = PledgeCalculator::with_config(CalculatorConfig { bonus_step_major: 5 });
        assert_eq!(calculator.stepper(Currency::Usd).step, usd(5));
        assert_eq!(calculator.stepper(Currency::Jpy).step, Amount::new(5));
    }

    #[test]
    fn zero_step_falls_back_to_one_unit() {
        let calculator = PledgeCalculator::with_config(CalculatorConfig { bonus_step_major: 0 });
        assert_eq!(calculator.stepper(Currency::Usd).step, usd(1));
    }

    #[test]
    fn over_maximum_is_flagged() {
        let reward = Reward::new(usd(20));
        let quote = PledgeCalculator::default().quote(&request(&reward, None, usd(20_000)));
        assert!(quote.max_pledge_exceeded);
        assert!(!quote.can_increase_bonus);
    }

    #[test]
    fn no_reward_is_priced_at_country_minimum() {
        let reward = Reward::no_reward(Amount::zero());
        let quote = PledgeCalculator::new().quote(&request(&reward, None, Amount::zero()));
        assert_eq!(quote.breakdown.total, usd(1));
        assert_eq!(quote.breakdown.reward, usd(1));

        let quote = PledgeCalculator::new().quote(&request(&reward, None, usd(4)));
        assert_eq!(quote.breakdown.total, usd(5));

        let generous = Reward::no_reward(usd(10));
        let quote = PledgeCalculator::new().quote(&request(&generous, None, Amount::zero()));
        assert_eq!(quote.breakdown.total, usd(10));
    }

    #[test]
    fn config_defaults_when_missing() {
        let config: CalculatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CalculatorConfig::default());
    }
}
