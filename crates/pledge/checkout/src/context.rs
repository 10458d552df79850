//! Who is checking out, and under which platform configuration

use pledge_calculator::NoRewardVariant;
use pledge_types::Country;
use serde::{Deserialize, Serialize};

/// Unique identifier for a User
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The logged-in backer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Country the user lives in, used to preselect a shipping destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_country: Option<Country>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location_country: None,
        }
    }

    pub fn with_location(mut self, country: Country) -> Self {
        self.location_country = Some(country);
        self
    }
}

/// Platform configuration visible to the checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Country the client is operating in
    pub country_code: Country,
    /// Enabled feature flags
    #[serde(default)]
    pub features: Vec<String>,
    /// Experiment arm for the no-reward starting amount
    #[serde(default)]
    pub no_reward_variant: NoRewardVariant,
}

impl PlatformConfig {
    pub fn new(country_code: Country) -> Self {
        Self {
            country_code,
            features: Vec::new(),
            no_reward_variant: NoRewardVariant::Control,
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    pub fn with_no_reward_variant(mut self, variant: NoRewardVariant) -> Self {
        self.no_reward_variant = variant;
        self
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::new(Country::US)
    }
}

/// Explicit environment for one checkout session
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<User>,
    #[serde(default)]
    pub config: PlatformConfig,
}

impl CheckoutContext {
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            current_user: None,
            config,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.current_user = Some(user);
        self
    }

    /// Country used to preselect shipping: the user's, else the platform's
    pub fn country(&self) -> Country {
        self.current_user
            .as_ref()
            .and_then(|u| u.location_country)
            .unwrap_or(self.config.country_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_country_wins_over_platform() {
        let context = CheckoutContext::new(PlatformConfig::new(Country::US));
        assert_eq!(context.country(), Country::US);

        let context = context.with_user(User::new(UserId::new("u-1"), "Ada").with_location(Country::DE));
        assert_eq!(context.country(), Country::DE);
    }

    #[test]
    fn user_without_location_uses_platform() {
        let context = CheckoutContext::new(PlatformConfig::new(Country::MX))
            .with_user(User::new(UserId::generate(), "Ada"));
        assert_eq!(context.country(), Country::MX);
    }

    #[test]
    fn feature_flags() {
        let config = PlatformConfig::default().with_feature("pledge_bonus_stepper");
        assert!(config.has_feature("pledge_bonus_stepper"));
        assert!(!config.has_feature("other"));
    }
}
