//! Rewards, add-ons and the rules that describe them
//!
//! A reward is what a backer selects; an add-on is an extra reward
//! bought alongside it. Both carry their own shipping rules, so the
//! same destination can cost a different amount per item.

use crate::{Amount, PledgeError, PledgeResult, Project, ShippingPreference, ShippingRule, ShippingSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Unique identifier for a Reward
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardId(pub String);

impl RewardId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RewardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reward tier, or the "no reward" placeholder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Lowest amount that unlocks this reward
    pub minimum: Amount,
    #[serde(default)]
    pub shipping_preference: ShippingPreference,
    /// Per-destination shipping costs for one unit
    #[serde(default)]
    pub shipping_rules: Vec<ShippingRule>,
    /// True for the placeholder used when backing without a reward
    #[serde(default)]
    pub no_reward: bool,
    #[serde(default)]
    pub is_add_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(default)]
    pub backers_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_on: Option<DateTime<Utc>>,
    /// What the backer receives, line by line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<RewardItem>,
}

/// One thing included in a reward
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    pub name: String,
    pub quantity: u32,
}

impl RewardItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

impl Reward {
    pub fn new(minimum: Amount) -> Self {
        Self {
            id: RewardId::generate(),
            title: None,
            minimum,
            shipping_preference: ShippingPreference::None,
            shipping_rules: Vec::new(),
            no_reward: false,
            is_add_on: false,
            limit: None,
            remaining: None,
            backers_count: 0,
            ends_at: None,
            estimated_delivery_on: None,
            items: Vec::new(),
        }
    }

    /// The placeholder reward for pledging without a reward.
    ///
    /// `minimum` is normally the project country's pledge floor.
    pub fn no_reward(minimum: Amount) -> Self {
        Self {
            no_reward: true,
            ..Self::new(minimum)
        }
    }

    pub fn with_id(mut self, id: RewardId) -> Self {
        self.id = id;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_shipping(
        mut self,
        preference: ShippingPreference,
        rules: Vec<ShippingRule>,
    ) -> Self {
        self.shipping_preference = preference;
        self.shipping_rules = rules;
        self
    }

    pub fn with_limit(mut self, limit: u32, remaining: Option<u32>) -> Self {
        self.limit = Some(limit);
        self.remaining = remaining;
        self
    }

    pub fn with_backers(mut self, backers_count: u32) -> Self {
        self.backers_count = backers_count;
        self
    }

    pub fn with_ends_at(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = Some(ends_at);
        self
    }

    pub fn with_estimated_delivery(mut self, on: DateTime<Utc>) -> Self {
        self.estimated_delivery_on = Some(on);
        self
    }

    pub fn with_items(mut self, items: Vec<RewardItem>) -> Self {
        self.items = items;
        self
    }

    pub fn as_add_on(mut self) -> Self {
        self.is_add_on = true;
        self
    }

    pub fn is_no_reward(&self) -> bool {
        self.no_reward
    }

    pub fn is_reward(&self) -> bool {
        !self.no_reward
    }

    /// Whether the reward needs a shipping destination
    pub fn is_shippable(&self) -> bool {
        !self.no_reward && self.shipping_preference != ShippingPreference::None
    }

    /// Limited and still has units left
    pub fn is_limited(&self) -> bool {
        self.limit.is_some() && self.remaining.is_some_and(|r| r > 0)
    }

    pub fn is_limit_reached(&self) -> bool {
        self.limit.is_some() && self.remaining == Some(0)
    }

    pub fn is_time_limited(&self) -> bool {
        self.ends_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|ends_at| ends_at < now)
    }

    pub fn has_backers(&self) -> bool {
        self.backers_count > 0
    }

    /// Lists the items it includes
    pub fn is_itemized(&self) -> bool {
        !self.items.is_empty()
    }

    /// A reward can be selected while the project is live, it has not
    /// expired and it has not sold out.
    pub fn is_available(&self, project: &Project, now: DateTime<Utc>) -> bool {
        project.is_live() && !self.is_limit_reached() && !self.is_expired(now)
    }

    pub fn shipping_summary(&self) -> Option<ShippingSummary> {
        match &self.shipping_preference {
            ShippingPreference::None => None,
            ShippingPreference::Restricted => Some(ShippingSummary::Limited),
            ShippingPreference::Unrestricted => Some(ShippingSummary::Worldwide),
            ShippingPreference::SingleLocation(name) => {
                Some(ShippingSummary::SingleLocation(name.clone()))
            }
        }
    }

    /// Time left until the reward ends, in the coarsest sensible unit
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<Countdown> {
        let seconds = (self.ends_at? - now).num_seconds();
        if seconds <= 0 {
            return None;
        }
        Some(Countdown::from_seconds(seconds as u64))
    }
}

/// Unit a countdown is expressed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// Remaining time before a deadline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub value: u64,
    pub unit: CountdownUnit,
}

impl Countdown {
    pub fn from_seconds(seconds: u64) -> Self {
        let (value, unit) = if seconds <= 120 {
            (seconds, CountdownUnit::Seconds)
        } else if seconds <= 120 * 60 {
            (seconds / 60, CountdownUnit::Minutes)
        } else if seconds <= 72 * 60 * 60 {
            (seconds / 3_600, CountdownUnit::Hours)
        } else {
            (seconds / 86_400, CountdownUnit::Days)
        };
        Self { value, unit }
    }
}

/// How many units of an add-on are selected; never zero
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    pub fn new(quantity: u32) -> PledgeResult<Self> {
        NonZeroU32::new(quantity)
            .map(Self)
            .ok_or(PledgeError::InvalidQuantity(quantity))
    }

    pub fn one() -> Self {
        Self(NonZeroU32::MIN)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    pub fn as_non_zero(&self) -> NonZeroU32 {
        self.0
    }
}

/// An add-on reward selected with a quantity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub reward: Reward,
    pub quantity: Quantity,
}

impl AddOn {
    /// Select `quantity` units of `reward`; zero is rejected
    pub fn new(reward: Reward, quantity: u32) -> PledgeResult<Self> {
        Ok(Self {
            reward: reward.as_add_on(),
            quantity: Quantity::new(quantity)?,
        })
    }

    pub fn id(&self) -> &RewardId {
        &self.reward.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Country, Currency, Location, LocationId, ProjectId};
    use chrono::Duration;

    fn usd(major: u64) -> Amount {
        Amount::from_major(major, Currency::Usd)
    }

    #[test]
    fn test_reward_kinds() {
        let reward = Reward::new(usd(20));
        let no_reward = Reward::no_reward(usd(1));
        assert!(reward.is_reward());
        assert!(!reward.is_no_reward());
        assert!(no_reward.is_no_reward());
        assert!(!no_reward.is_reward());
    }

    #[test]
    fn test_is_shippable() {
        assert!(!Reward::new(usd(20)).is_shippable());

        let rules = vec![ShippingRule::new(
            Location::new(LocationId::new("ng"), "Nigeria"),
            usd(5),
        )];
        let single = Reward::new(usd(20))
            .with_shipping(ShippingPreference::SingleLocation("Nigeria".into()), rules);
        assert!(single.is_shippable());

        let worldwide = Reward::new(usd(20)).with_shipping(ShippingPreference::Unrestricted, vec![]);
        assert!(worldwide.is_shippable());

        let no_reward = Reward {
            shipping_preference: ShippingPreference::Unrestricted,
            ..Reward::no_reward(usd(1))
        };
        assert!(!no_reward.is_shippable());
    }

    #[test]
    fn test_is_limited() {
        assert!(Reward::new(usd(1)).with_limit(10, Some(5)).is_limited());
        assert!(!Reward::new(usd(1)).with_limit(10, Some(0)).is_limited());
        assert!(!Reward::new(usd(1)).is_limited());
    }

    #[test]
    fn test_limit_reached() {
        assert!(Reward::new(usd(1)).with_limit(100, Some(0)).is_limit_reached());
        assert!(!Reward::new(usd(1)).with_limit(100, None).is_limit_reached());
        assert!(!Reward::new(usd(1)).with_limit(100, Some(50)).is_limit_reached());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let reward = Reward::new(usd(1));
        assert!(!reward.is_expired(now));
        assert!(!reward.is_time_limited());

        let ended = reward.clone().with_ends_at(now - Duration::days(2));
        assert!(ended.is_expired(now));
        assert!(ended.is_time_limited());

        let ending = reward.with_ends_at(now + Duration::days(2));
        assert!(!ending.is_expired(now));
    }

    #[test]
    fn test_is_available() {
        let now = Utc::now();
        let live = Project::new(ProjectId::new("p"), "Live", Country::US);
        let successful = live.clone().with_state(crate::ProjectState::Successful);

        let reward = Reward::new(usd(10));
        let ended = reward.clone().with_ends_at(now - Duration::hours(1));
        let sold_out = reward.clone().with_limit(5, Some(0));

        assert!(reward.is_available(&live, now));
        assert!(!ended.is_available(&live, now));
        assert!(!sold_out.is_available(&live, now));
        assert!(!reward.is_available(&successful, now));
    }

    #[test]
    fn test_has_backers() {
        assert!(Reward::new(usd(1)).with_backers(3).has_backers());
        assert!(!Reward::new(usd(1)).has_backers());
    }

    #[test]
    fn test_is_itemized() {
        assert!(!Reward::new(usd(20)).is_itemized());

        let itemized = Reward::new(usd(20)).with_items(vec![
            RewardItem::new("Art book", 1),
            RewardItem::new("Sticker", 3),
        ]);
        assert!(itemized.is_itemized());
        assert_eq!(itemized.items[1].quantity, 3);
    }

    #[test]
    fn test_shipping_summary() {
        assert_eq!(Reward::new(usd(1)).shipping_summary(), None);
        assert_eq!(
            Reward::new(usd(1))
                .with_shipping(ShippingPreference::Restricted, vec![])
                .shipping_summary(),
            Some(ShippingSummary::Limited)
        );
        assert_eq!(
            Reward::new(usd(1))
                .with_shipping(ShippingPreference::Unrestricted, vec![])
                .shipping_summary(),
            Some(ShippingSummary::Worldwide)
        );
        assert_eq!(
            Reward::new(usd(1))
                .with_shipping(ShippingPreference::SingleLocation("Nigeria".into()), vec![])
                .shipping_summary(),
            Some(ShippingSummary::SingleLocation("Nigeria".into()))
        );
    }

    #[test]
    fn test_countdown_units() {
        assert_eq!(
            Countdown::from_seconds(30),
            Countdown { value: 30, unit: CountdownUnit::Seconds }
        );
        assert_eq!(
            Countdown::from_seconds(300),
            Countdown { value: 5, unit: CountdownUnit::Minutes }
        );
        assert_eq!(
            Countdown::from_seconds(3_600),
            Countdown { value: 60, unit: CountdownUnit::Minutes }
        );
        assert_eq!(
            Countdown::from_seconds(86_400),
            Countdown { value: 24, unit: CountdownUnit::Hours }
        );
        assert_eq!(Countdown::from_seconds(31 * 86_400).unit, CountdownUnit::Days);
    }

    #[test]
    fn test_countdown_from_reward() {
        let now = Utc::now();
        let reward = Reward::new(usd(1)).with_ends_at(now + Duration::seconds(120));
        assert_eq!(
            reward.countdown(now),
            Some(Countdown { value: 120, unit: CountdownUnit::Seconds })
        );
        assert_eq!(Reward::new(usd(1)).countdown(now), None);
        let ended = Reward::new(usd(1)).with_ends_at(now - Duration::seconds(1));
        assert_eq!(ended.countdown(now), None);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(matches!(
            AddOn::new(Reward::new(usd(9)), 0),
            Err(PledgeError::InvalidQuantity(0))
        ));
        let add_on = AddOn::new(Reward::new(usd(9)), 2).unwrap();
        assert_eq!(add_on.quantity.get(), 2);
        assert!(add_on.reward.is_add_on);
    }

    #[test]
    fn test_quantity_serde_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        let q: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(q.get(), 4);
        assert_eq!(Quantity::one().get(), 1);
    }
}
