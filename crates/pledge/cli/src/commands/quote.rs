//! Price a checkout file once

use std::path::Path;

use pledge_calculator::{PledgeCalculator, Quote, QuoteRequest};
use pledge_types::Money;
use serde::Serialize;
use tracing::warn;

use crate::checkout_file::{Checkout, CheckoutFile};
use crate::config::PledgeConfig;
use crate::error::CliResult;
use crate::output::{money, print_breakdown, print_json, print_warning, OutputFormat};

/// JSON shape of a quote
#[derive(Debug, Serialize)]
struct QuoteOutput {
    #[serde(flatten)]
    quote: Quote,
    total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    converted_total: Option<Money>,
}

/// Execute the quote command
pub fn execute(path: &Path, config: &PledgeConfig, format: OutputFormat) -> CliResult<()> {
    let checkout = CheckoutFile::read(path)?.resolve()?;
    let quote = price(&checkout, config);
    let project = &checkout.project;

    let converted_total = project.needs_conversion().then(|| {
        Money::new(
            pledge_calculator::convert(
                quote.breakdown.total,
                project.currency,
                project.current_currency,
                project.fx_rate,
            ),
            project.current_currency,
        )
    });

    match format {
        OutputFormat::Json => print_json(&QuoteOutput {
            total: Money::new(quote.breakdown.total, project.currency),
            converted_total,
            quote,
        }),
        OutputFormat::Table => {
            print_breakdown(&quote.breakdown, project.currency);
            if let Some(converted) = converted_total {
                println!("About {}", converted);
            }
            if quote.max_pledge_exceeded {
                print_warning(&format!(
                    "Pledge exceeds the maximum of {}",
                    money(quote.limits.maximum, project.currency)
                ));
            }
            Ok(())
        }
    }
}

/// Price a resolved checkout with the configured calculator.
pub fn price(checkout: &Checkout, config: &PledgeConfig) -> Quote {
    let project = &checkout.project;
    if checkout.reward.is_shippable() && checkout.rule.is_none() {
        warn!(reward = %checkout.reward.id, "No destination selected; shipping not included");
    }

    PledgeCalculator::with_config(config.calculator()).quote(&QuoteRequest {
        country: project.country,
        currency: project.currency,
        reward: &checkout.reward,
        add_ons: &checkout.add_ons,
        rule: checkout.rule.as_ref(),
        bonus: checkout.bonus,
    })
}
