//! Shipping destinations and the per-destination cost of an item

use crate::{Amount, Country};
use serde::{Deserialize, Serialize};

/// Unique identifier for a shipping destination
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A place a reward can ship to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    /// Human-readable name ("United States", "Germany")
    pub name: String,
    /// Country the location lies in, when it is a single country
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            country: None,
        }
    }

    pub fn with_country(mut self, country: Country) -> Self {
        self.country = Some(country);
        self
    }
}

/// Unique identifier for a shipping rule
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShippingRuleId(pub String);

impl ShippingRuleId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ShippingRuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cost of shipping one unit of an item to one destination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRule {
    pub id: ShippingRuleId,
    pub location: Location,
    pub cost: Amount,
}

impl ShippingRule {
    pub fn new(location: Location, cost: Amount) -> Self {
        Self {
            id: ShippingRuleId::generate(),
            location,
            cost,
        }
    }

    pub fn with_id(mut self, id: ShippingRuleId) -> Self {
        self.id = id;
        self
    }

    /// Destination this rule prices; rules match across items by destination
    pub fn destination(&self) -> &LocationId {
        &self.location.id
    }
}

/// How a reward is delivered
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingPreference {
    /// Digital or no delivery
    #[default]
    None,
    /// Ships to a fixed list of destinations
    Restricted,
    /// Ships anywhere
    Unrestricted,
    /// Ships to exactly one named location
    SingleLocation(String),
}

/// Short description of where a reward ships
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShippingSummary {
    Worldwide,
    Limited,
    SingleLocation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_is_location_id() {
        let rule = ShippingRule::new(
            Location::new(LocationId::new("us"), "United States").with_country(Country::US),
            Amount::new(3000),
        );
        assert_eq!(rule.destination(), &LocationId::new("us"));
        assert_eq!(rule.location.country, Some(Country::US));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ShippingRuleId::generate(), ShippingRuleId::generate());
        assert_eq!(format!("{}", LocationId::new("de")), "de");
    }

    #[test]
    fn test_shipping_preference_serde() {
        let json = serde_json::to_string(&ShippingPreference::Unrestricted).unwrap();
        assert_eq!(json, "\"unrestricted\"");
        let single: ShippingPreference =
            serde_json::from_str(r#"{"single_location":"Nigeria"}"#).unwrap();
        assert_eq!(single, ShippingPreference::SingleLocation("Nigeria".into()));
    }
}
