//! Shipping rule provider trait.
//!
//! Defines where a session gets the shipping rules of a reward from.

use std::collections::HashMap;

use async_trait::async_trait;
use pledge_types::{PledgeError, PledgeResult, ProjectId, RewardId, ShippingRule};

/// Source of per-destination shipping costs for a reward.
#[async_trait]
pub trait ShippingRuleProvider: Send + Sync {
    /// Fetch the shipping rules of `reward` on `project`.
    async fn fetch_shipping_rules(
        &self,
        project: &ProjectId,
        reward: &RewardId,
    ) -> PledgeResult<Vec<ShippingRule>>;
}

/// In-memory shipping rules, keyed by project and reward.
#[derive(Clone, Debug, Default)]
pub struct StaticShippingRules {
    rules: HashMap<(ProjectId, RewardId), Vec<ShippingRule>>,
}

impl StaticShippingRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(
        mut self,
        project: ProjectId,
        reward: RewardId,
        rules: Vec<ShippingRule>,
    ) -> Self {
        self.insert(project, reward, rules);
        self
    }

    pub fn insert(&mut self, project: ProjectId, reward: RewardId, rules: Vec<ShippingRule>) {
        self.rules.insert((project, reward), rules);
    }
}

#[async_trait]
impl ShippingRuleProvider for StaticShippingRules {
    async fn fetch_shipping_rules(
        &self,
        project: &ProjectId,
        reward: &RewardId,
    ) -> PledgeResult<Vec<ShippingRule>> {
        self.rules
            .get(&(project.clone(), reward.clone()))
            .cloned()
            .ok_or_else(|| {
                PledgeError::ShippingRulesUnavailable(format!(
                    "no rules for reward {} on project {}",
                    reward, project
                ))
            })
    }
}
