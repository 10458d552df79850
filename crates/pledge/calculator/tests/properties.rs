//! Property tests: a pledge total is the sum of its independently priced parts.

use pledge_calculator::*;
use pledge_types::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

const DESTINATIONS: [&str; 4] = ["us", "de", "jp", "ng"];

fn location(id: &str) -> Location {
    Location::new(LocationId::new(id), id.to_uppercase())
}

/// Generate an amount small enough that no sum saturates.
fn arb_amount() -> impl Strategy<Value = Amount> {
    (0u64..1_000_000).prop_map(Amount::new)
}

/// Generate shipping rules for a subset of the known destinations.
fn arb_rules() -> impl Strategy<Value = Vec<ShippingRule>> {
    prop::collection::vec((any::<bool>(), arb_amount()), DESTINATIONS.len()).prop_map(|picks| {
        picks
            .into_iter()
            .zip(DESTINATIONS)
            .filter(|((ships, _), _)| *ships)
            .map(|((_, cost), id)| ShippingRule::new(location(id), cost))
            .collect()
    })
}

/// Generate a shippable reward.
fn arb_reward() -> impl Strategy<Value = Reward> {
    (arb_amount(), arb_rules()).prop_map(|(minimum, rules)| {
        Reward::new(minimum).with_shipping(ShippingPreference::Restricted, rules)
    })
}

/// Generate an add-on with a quantity of at least one.
fn arb_add_on() -> impl Strategy<Value = AddOn> {
    (arb_reward(), 1u32..20).prop_map(|(reward, quantity)| {
        AddOn::new(reward, quantity).expect("quantity is non-zero")
    })
}

fn arb_add_ons() -> impl Strategy<Value = Vec<AddOn>> {
    prop::collection::vec(arb_add_on(), 0..6)
}

/// Generate a selected rule, or none.
fn arb_selection() -> impl Strategy<Value = Option<ShippingRule>> {
    prop::option::of(
        (prop::sample::select(DESTINATIONS.to_vec()), arb_amount())
            .prop_map(|(id, cost)| ShippingRule::new(location(id), cost)),
    )
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// A reward without add-ons, shipping or bonus costs its minimum.
    #[test]
    fn digital_reward_costs_its_minimum(minimum in arb_amount()) {
        let reward = Reward::new(minimum);
        prop_assert_eq!(compute_total(&reward, &[], None, Amount::zero()), minimum);
    }

    /// A bonus raises the total by exactly its amount.
    #[test]
    fn bonus_adds_exactly(
        reward in arb_reward(),
        add_ons in arb_add_ons(),
        rule in arb_selection(),
        bonus in arb_amount(),
    ) {
        let without = compute_total(&reward, &add_ons, rule.as_ref(), Amount::zero());
        let with = compute_total(&reward, &add_ons, rule.as_ref(), bonus);
        prop_assert_eq!(with, without + bonus);
    }

    /// Each add-on contributes quantity × (minimum + its own shipping).
    #[test]
    fn add_ons_priced_per_item(
        reward in arb_reward(),
        add_ons in arb_add_ons(),
        rule in arb_selection(),
    ) {
        let base = compute_total(&reward, &[], rule.as_ref(), Amount::zero());
        let expected: u64 = add_ons
            .iter()
            .map(|a| {
                u64::from(a.quantity.get())
                    * (a.reward.minimum + shipping_cost(&a.reward, rule.as_ref())).minor()
            })
            .sum();
        let total = compute_total(&reward, &add_ons, rule.as_ref(), Amount::zero());
        prop_assert_eq!(total, base + Amount::new(expected));
    }

    /// The breakdown's subtotals always add up to the computed total.
    #[test]
    fn breakdown_matches_total(
        reward in arb_reward(),
        add_ons in arb_add_ons(),
        rule in arb_selection(),
        bonus in arb_amount(),
    ) {
        let breakdown = PledgeBreakdown::compute(&reward, &add_ons, rule.as_ref(), bonus);
        prop_assert_eq!(breakdown.total, compute_total(&reward, &add_ons, rule.as_ref(), bonus));
        prop_assert_eq!(
            breakdown.reward + breakdown.add_ons + breakdown.shipping + breakdown.bonus,
            breakdown.total
        );
        prop_assert_eq!(breakdown.line_items().len() >= 1 + add_ons.len(), true);
    }

    /// Changing the destination only moves the shipping subtotal.
    #[test]
    fn destination_only_changes_shipping(
        reward in arb_reward(),
        add_ons in arb_add_ons(),
        first in arb_selection(),
        second in arb_selection(),
    ) {
        let a = PledgeBreakdown::compute(&reward, &add_ons, first.as_ref(), Amount::zero());
        let b = PledgeBreakdown::compute(&reward, &add_ons, second.as_ref(), Amount::zero());
        prop_assert_eq!(a.items_amount(), b.items_amount());
        prop_assert_eq!(a.total - a.shipping, b.total - b.shipping);
    }

    /// The no-reward placeholder never pays shipping.
    #[test]
    fn no_reward_ignores_shipping(minimum in arb_amount(), rule in arb_selection(), rules in arb_rules()) {
        let placeholder = Reward {
            shipping_rules: rules,
            ..Reward::no_reward(minimum)
        };
        prop_assert_eq!(compute_total(&placeholder, &[], rule.as_ref(), Amount::zero()), minimum);
    }

    /// Stepping never leaves [0, max_bonus].
    #[test]
    fn stepper_stays_in_bounds(reward_major in 1u64..10_000, clicks in prop::collection::vec(any::<bool>(), 0..50)) {
        let reward = Reward::new(Amount::from_major(reward_major, Currency::Usd));
        let limits = PledgeLimits::for_pledge(Country::US, &reward, &[]);
        let stepper = BonusStepper::for_currency(Currency::Usd);

        let mut bonus = Amount::zero();
        for up in clicks {
            bonus = if up { stepper.increase(bonus, &limits) } else { stepper.decrease(bonus) };
            prop_assert!(bonus <= limits.max_bonus);
        }
    }

    /// Parsed bonus input is never negative and round-trips whole cents.
    #[test]
    fn bonus_input_accepts_cents(cents in 0u64..10_000_000) {
        let raw = Currency::Usd.to_decimal_string(Amount::new(cents));
        let resolved = BonusInput::parse(Currency::Usd, &raw).resolve(Amount::new(1));
        prop_assert_eq!(resolved, Amount::new(cents));
    }
}
