//! Configuration for the pledge CLI

use pledge_calculator::{CalculatorConfig, NoRewardVariant};
use pledge_checkout::PlatformConfig;
use pledge_types::Country;
use serde::{Deserialize, Serialize};

/// Main CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PledgeConfig {
    /// Checkout defaults
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Checkout defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Country the platform runs in when a checkout file names no user
    #[serde(default = "default_country")]
    pub default_country: Country,

    /// Whole currency units per bonus stepper click
    #[serde(default = "default_bonus_step")]
    pub bonus_step: u64,

    /// Experiment arm for no-reward pledges
    #[serde(default)]
    pub no_reward_variant: NoRewardVariant,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            default_country: default_country(),
            bonus_step: default_bonus_step(),
            no_reward_variant: NoRewardVariant::Control,
        }
    }
}

fn default_country() -> Country {
    Country::US
}

fn default_bonus_step() -> u64 {
    1
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PledgeConfig {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// Environment overrides use the `PLEDGE_` prefix with `__` between
    /// sections, e.g. `PLEDGE_CHECKOUT__BONUS_STEP=5`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&PledgeConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PLEDGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn calculator(&self) -> CalculatorConfig {
        CalculatorConfig {
            bonus_step_major: self.checkout.bonus_step,
        }
    }

    pub fn platform(&self) -> PlatformConfig {
        PlatformConfig::new(self.checkout.default_country)
            .with_no_reward_variant(self.checkout.no_reward_variant)
    }
}
