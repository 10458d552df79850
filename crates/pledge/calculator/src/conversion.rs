//! Currency conversion and suggested amounts for backing without a reward

use pledge_types::{round_half_up, Amount, Currency};
use serde::{Deserialize, Serialize};

/// Convert an amount between currencies.
///
/// `fx_rate` is units of `to` per unit of `from`. The result is rounded
/// half up to the precision of `to`.
pub fn convert(amount: Amount, from: Currency, to: Currency, fx_rate: f64) -> Amount {
    if from == to {
        return amount;
    }
    Amount::new(round_half_up(from.to_major(amount) * fx_rate, to.precision()))
}

/// Experiment arm deciding what a no-reward pledge starts at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoRewardVariant {
    /// Start at the country minimum
    #[default]
    Control,
    /// Start at 10 whole units
    Variant2,
    /// Start at 20 whole units
    Variant3,
    /// Start at 50 whole units
    Variant4,
}

/// Amount to pre-fill for a no-reward pledge; never below `minimum`
pub fn suggested_no_reward_amount(
    variant: NoRewardVariant,
    currency: Currency,
    minimum: Amount,
) -> Amount {
    let suggested = match variant {
        NoRewardVariant::Control => return minimum,
        NoRewardVariant::Variant2 => Amount::from_major(10, currency),
        NoRewardVariant::Variant3 => Amount::from_major(20, currency),
        NoRewardVariant::Variant4 => Amount::from_major(50, currency),
    };
    suggested.max(minimum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_currency_is_identity() {
        assert_eq!(
            convert(Amount::new(5000), Currency::Usd, Currency::Usd, 3.0),
            Amount::new(5000)
        );
    }

    #[test]
    fn converts_and_rounds_half_up() {
        // MX$50.00 at 0.0505 USD per MXN = $2.525 -> $2.53
        assert_eq!(
            convert(Amount::new(5000), Currency::Mxn, Currency::Usd, 0.0505),
            Amount::new(253)
        );
    }

    #[test]
    fn converts_into_zero_decimal_currency() {
        // $10.00 at 149.6 JPY per USD = ¥1496
        assert_eq!(
            convert(Amount::new(1000), Currency::Usd, Currency::Jpy, 149.6),
            Amount::new(1496)
        );
    }

    #[test]
    fn suggested_amounts_by_variant() {
        let usd = |major| Amount::from_major(major, Currency::Usd);
        assert_eq!(
            suggested_no_reward_amount(NoRewardVariant::Control, Currency::Usd, usd(1)),
            usd(1)
        );
        assert_eq!(
            suggested_no_reward_amount(NoRewardVariant::Variant2, Currency::Usd, usd(1)),
            usd(10)
        );
        assert_eq!(
            suggested_no_reward_amount(NoRewardVariant::Variant3, Currency::Usd, usd(1)),
            usd(20)
        );
        assert_eq!(
            suggested_no_reward_amount(NoRewardVariant::Variant4, Currency::Usd, usd(1)),
            usd(50)
        );
        assert_eq!(
            suggested_no_reward_amount(NoRewardVariant::Control, Currency::Usd, usd(10)),
            usd(10)
        );
        assert_eq!(
            suggested_no_reward_amount(NoRewardVariant::Variant4, Currency::Usd, usd(100)),
            usd(100)
        );
    }
}
