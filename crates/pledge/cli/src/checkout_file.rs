//! Checkout files: a project, a reward with add-ons, a destination and a
//! bonus, written as TOML with decimal amounts.

use std::path::Path;

use pledge_types::{
    AddOn, Amount, Backing, Country, Currency, Location, LocationId, PledgeReason, Project,
    ProjectId, Reward, RewardId, RewardItem, ShippingPreference, ShippingRule,
};
use pledge_calculator::BonusInput;
use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// Raw checkout file as written on disk
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutFile {
    pub project: ProjectSection,
    pub reward: RewardSection,
    #[serde(default)]
    pub add_ons: Vec<AddOnSection>,
    /// Location id of the selected destination
    #[serde(default)]
    pub destination: Option<String>,
    /// Bonus as typed by the backer
    #[serde(default)]
    pub bonus: Option<String>,
    #[serde(default)]
    pub reason: PledgeReason,
    #[serde(default)]
    pub backing: Option<BackingSection>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    pub id: String,
    pub name: String,
    pub country: Country,
    /// Currency the backer prefers to see totals in
    #[serde(default)]
    pub current_currency: Option<Currency>,
    #[serde(default)]
    pub fx_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleSection {
    pub location: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<Country>,
    pub cost: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardSection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub minimum: Option<String>,
    #[serde(default)]
    pub shipping: ShippingPreference,
    #[serde(default)]
    pub shipping_rules: Vec<RuleSection>,
    #[serde(default)]
    pub no_reward: bool,
    #[serde(default)]
    pub items: Vec<RewardItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddOnSection {
    #[serde(flatten)]
    pub reward: RewardSection,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackingSection {
    pub amount: String,
    #[serde(default)]
    pub shipping_amount: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// One simulated user action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Pick a shipping destination by location id
    Select { destination: String },
    /// Type into the bonus field
    Bonus { value: String },
    Increase,
    Decrease,
}

/// A checkout file with amounts parsed and references resolved
#[derive(Debug, Clone)]
pub struct Checkout {
    pub project: Project,
    pub reward: Reward,
    pub add_ons: Vec<AddOn>,
    pub rule: Option<ShippingRule>,
    pub bonus: Amount,
    pub reason: PledgeReason,
    pub steps: Vec<Step>,
}

impl CheckoutFile {
    pub fn read(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> CliResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Parse amounts in the project currency and resolve the destination.
    pub fn resolve(&self) -> CliResult<Checkout> {
        let mut project = Project::new(
            ProjectId::new(&self.project.id),
            &self.project.name,
            self.project.country,
        );
        if let Some(currency) = self.project.current_currency {
            project = project.with_current_currency(currency, self.project.fx_rate.unwrap_or(1.0));
        }
        let currency = project.currency;

        let reward = self.reward.build(currency, "reward")?;
        let add_ons = self
            .add_ons
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let reward = section.reward.build(currency, &format!("add-on-{}", i + 1))?;
                Ok(AddOn::new(reward, section.quantity)?)
            })
            .collect::<CliResult<Vec<_>>>()?;

        if let Some(backing) = &self.backing {
            let mut record = Backing::new(currency.parse_amount(&backing.amount)?, reward.id.clone());
            if let Some(location) = &backing.location {
                let shipping = match &backing.shipping_amount {
                    Some(raw) => currency.parse_amount(raw)?,
                    None => Amount::zero(),
                };
                record = record.with_shipping(LocationId::new(location), shipping);
            }
            project = project.with_backing(record);
        }

        let rule = self
            .destination
            .as_deref()
            .map(|destination| find_rule(&reward, &add_ons, destination))
            .transpose()?;

        // Negative bonuses clamp to zero like typed input; garbage is an error
        let bonus = match self.bonus.as_deref().map(|raw| BonusInput::parse(currency, raw)) {
            Some(BonusInput::Rejected(e)) => return Err(e.into()),
            Some(input) => input.resolve(Amount::zero()),
            None => Amount::zero(),
        };

        Ok(Checkout {
            project,
            reward,
            add_ons,
            rule,
            bonus,
            reason: self.reason,
            steps: self.steps.clone(),
        })
    }
}

impl RewardSection {
    fn build(&self, currency: Currency, fallback_id: &str) -> CliResult<Reward> {
        let minimum = match &self.minimum {
            Some(raw) => currency.parse_amount(raw)?,
            None if self.no_reward => Amount::zero(),
            None => {
                return Err(CliError::InvalidInput(format!(
                    "{} has no minimum",
                    self.id.as_deref().unwrap_or(fallback_id)
                )))
            }
        };
        let rules = self
            .shipping_rules
            .iter()
            .map(|rule| rule.build(currency))
            .collect::<CliResult<Vec<_>>>()?;

        let mut reward = if self.no_reward {
            Reward::no_reward(minimum)
        } else {
            Reward::new(minimum)
        };
        reward = reward
            .with_id(RewardId::new(self.id.as_deref().unwrap_or(fallback_id)))
            .with_shipping(self.shipping.clone(), rules)
            .with_items(self.items.clone());
        if let Some(title) = &self.title {
            reward = reward.with_title(title);
        }
        Ok(reward)
    }
}

impl RuleSection {
    fn build(&self, currency: Currency) -> CliResult<ShippingRule> {
        let mut location = Location::new(
            LocationId::new(&self.location),
            self.name.clone().unwrap_or_else(|| self.location.clone()),
        );
        if let Some(country) = self.country {
            location = location.with_country(country);
        }
        Ok(ShippingRule::new(location, currency.parse_amount(&self.cost)?))
    }
}

/// Rule for `destination`, taken from the reward or else from an add-on
pub fn find_rule(reward: &Reward, add_ons: &[AddOn], destination: &str) -> CliResult<ShippingRule> {
    let id = LocationId::new(destination);
    std::iter::once(reward)
        .chain(add_ons.iter().map(|a| &a.reward))
        .flat_map(|item| item.shipping_rules.iter())
        .find(|rule| rule.destination() == &id)
        .cloned()
        .ok_or_else(|| CliError::InvalidInput(format!("no item ships to {}", destination)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
destination = "us"

[project]
id = "tabletop"
name = "Tabletop"
country = "US"

[reward]
id = "deluxe"
minimum = "50"
shipping = "restricted"
shipping_rules = [
    { location = "us", country = "US", cost = "30" },
    { location = "de", country = "DE", cost = "40" },
]

[[add_ons]]
id = "dice"
minimum = "9"
quantity = 2
shipping = "restricted"
shipping_rules = [{ location = "us", cost = "5" }]

[[add_ons]]
id = "mat"
minimum = "11"
quantity = 4
shipping = "restricted"
shipping_rules = [{ location = "us", cost = "3" }]

[[add_ons]]
id = "minis"
minimum = "15"
quantity = 10
shipping = "restricted"
shipping_rules = [{ location = "us", cost = "10" }]

[[steps]]
action = "bonus"
value = "123"

[[steps]]
action = "increase"

[[steps]]
action = "select"
destination = "de"
"#;

    #[test]
    fn resolves_scenario() {
        let checkout = CheckoutFile::parse(SCENARIO).unwrap().resolve().unwrap();
        assert_eq!(checkout.reward.minimum, Amount::new(5000));
        assert_eq!(checkout.add_ons.len(), 3);
        assert_eq!(checkout.add_ons[2].quantity.get(), 10);
        assert_eq!(checkout.rule.unwrap().destination(), &LocationId::new("us"));
        assert_eq!(checkout.bonus, Amount::zero());
        assert_eq!(
            checkout.steps,
            vec![
                Step::Bonus { value: "123".into() },
                Step::Increase,
                Step::Select { destination: "de".into() },
            ]
        );
    }

    #[test]
    fn resolved_scenario_totals_414() {
        let checkout = CheckoutFile::parse(SCENARIO).unwrap().resolve().unwrap();
        let total = pledge_calculator::compute_total(
            &checkout.reward,
            &checkout.add_ons,
            checkout.rule.as_ref(),
            checkout.bonus,
        );
        assert_eq!(total, Amount::new(41_400));
    }

    #[test]
    fn demo_reward_lists_its_items() {
        let demo = include_str!("../../../../demos/checkout.toml");
        let checkout = CheckoutFile::parse(demo).unwrap().resolve().unwrap();
        assert!(checkout.reward.is_itemized());
        assert_eq!(checkout.reward.items[0].name, "Core game");
        assert!(!checkout.add_ons[0].reward.is_itemized());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let file = CheckoutFile::parse(
            r#"
[project]
id = "p"
name = "P"
country = "US"

[reward]
minimum = "5"

[[add_ons]]
minimum = "1"
quantity = 0
"#,
        )
        .unwrap();
        assert!(matches!(
            file.resolve(),
            Err(CliError::Pledge(pledge_types::PledgeError::InvalidQuantity(0)))
        ));
    }

    #[test]
    fn negative_bonus_is_clamped() {
        let mut file = CheckoutFile::parse(SCENARIO).unwrap();
        file.bonus = Some("-5".into());
        assert_eq!(file.resolve().unwrap().bonus, Amount::zero());

        file.bonus = Some("12.50".into());
        assert_eq!(file.resolve().unwrap().bonus, Amount::new(1250));
    }

    #[test]
    fn malformed_bonus_is_rejected() {
        let mut file = CheckoutFile::parse(SCENARIO).unwrap();
        file.bonus = Some("lots".into());
        assert!(matches!(
            file.resolve(),
            Err(CliError::Pledge(pledge_types::PledgeError::MalformedAmount(_)))
        ));
    }

    #[test]
    fn unknown_destination_is_rejected() {
        let mut file = CheckoutFile::parse(SCENARIO).unwrap();
        file.destination = Some("jp".into());
        assert!(matches!(file.resolve(), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn no_reward_needs_no_minimum() {
        let file = CheckoutFile::parse(
            r#"
[project]
id = "p"
name = "P"
country = "GB"

[reward]
no_reward = true
"#,
        )
        .unwrap();
        let checkout = file.resolve().unwrap();
        assert!(checkout.reward.is_no_reward());
        assert_eq!(checkout.project.currency, Currency::Gbp);
    }
}
