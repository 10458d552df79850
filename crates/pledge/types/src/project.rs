//! Projects and the backing a user may already have on them

use crate::{Amount, Country, Currency, LocationId, RewardId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a Project
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a project
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    Submitted,
    #[default]
    Live,
    Successful,
    Failed,
    Canceled,
    Suspended,
}

/// The pledge a user already has on a project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Backing {
    /// Total charged, shipping included
    pub amount: Amount,
    #[serde(default)]
    pub shipping_amount: Amount,
    /// Destination the backing ships to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    pub reward_id: RewardId,
}

impl Backing {
    pub fn new(amount: Amount, reward_id: RewardId) -> Self {
        Self {
            amount,
            shipping_amount: Amount::zero(),
            location_id: None,
            reward_id,
        }
    }

    pub fn with_shipping(mut self, location_id: LocationId, shipping_amount: Amount) -> Self {
        self.location_id = Some(location_id);
        self.shipping_amount = shipping_amount;
        self
    }

    /// Amount pledged excluding shipping
    pub fn pledge_amount(&self) -> Amount {
        self.amount.saturating_sub(self.shipping_amount)
    }
}

/// A crowdfunding project as seen by the checkout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub country: Country,
    /// Currency the project is priced in
    pub currency: Currency,
    /// Currency the current user prefers to see amounts in
    pub current_currency: Currency,
    /// Units of `current_currency` per unit of `currency`
    pub fx_rate: f64,
    #[serde(default)]
    pub state: ProjectState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backing: Option<Backing>,
}

impl Project {
    /// A live project priced in its country's currency
    pub fn new(id: ProjectId, name: impl Into<String>, country: Country) -> Self {
        Self {
            id,
            name: name.into(),
            country,
            currency: country.currency(),
            current_currency: country.currency(),
            fx_rate: 1.0,
            state: ProjectState::Live,
            deadline: None,
            backing: None,
        }
    }

    pub fn with_state(mut self, state: ProjectState) -> Self {
        self.state = state;
        self
    }

    pub fn with_current_currency(mut self, currency: Currency, fx_rate: f64) -> Self {
        self.current_currency = currency;
        self.fx_rate = fx_rate;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_backing(mut self, backing: Backing) -> Self {
        self.backing = Some(backing);
        self
    }

    pub fn is_live(&self) -> bool {
        self.state == ProjectState::Live
    }

    pub fn is_backing(&self) -> bool {
        self.backing.is_some()
    }

    /// Amounts must be shown converted when the user prefers another currency
    pub fn needs_conversion(&self) -> bool {
        self.currency != self.current_currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_defaults_to_country_currency() {
        let project = Project::new(ProjectId::new("p-1"), "Tabletop", Country::MX);
        assert_eq!(project.currency, Currency::Mxn);
        assert!(project.is_live());
        assert!(!project.needs_conversion());
        assert!(!project.is_backing());
    }

    #[test]
    fn test_needs_conversion() {
        let project = Project::new(ProjectId::new("p-1"), "Tabletop", Country::MX)
            .with_current_currency(Currency::Usd, 0.05);
        assert!(project.needs_conversion());
    }

    #[test]
    fn test_backing_pledge_amount() {
        let backing = Backing::new(Amount::new(4000), RewardId::new("r-1"))
            .with_shipping(LocationId::new("us"), Amount::new(1000));
        assert_eq!(backing.pledge_amount(), Amount::new(3000));
        assert_eq!(backing.location_id, Some(LocationId::new("us")));
    }

    #[test]
    fn test_project_state_serde() {
        let json = serde_json::to_string(&ProjectState::Successful).unwrap();
        assert_eq!(json, "\"successful\"");
    }
}
