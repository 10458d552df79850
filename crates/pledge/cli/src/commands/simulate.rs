//! Run a checkout session through the steps of a checkout file

use std::path::Path;
use std::sync::Arc;

use pledge_calculator::PledgeCalculator;
use pledge_checkout::{
    CheckoutContext, CheckoutEvent, CheckoutInput, CheckoutSession, CheckoutSnapshot, ShippingPhase,
    StaticShippingRules,
};
use pledge_types::{Amount, Money, PledgeError};
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, info};

use crate::checkout_file::{find_rule, Checkout, CheckoutFile, Step};
use crate::config::PledgeConfig;
use crate::error::CliResult;
use crate::output::{money, print_breakdown, print_json, print_success, print_warning, OutputFormat};

/// JSON shape of a simulation
#[derive(Debug, Serialize)]
struct SimulationOutput {
    totals: Vec<Money>,
    snapshot: CheckoutSnapshot,
}

/// Execute the simulate command
pub async fn execute(path: &Path, config: &PledgeConfig, format: OutputFormat) -> CliResult<()> {
    let checkout = CheckoutFile::read(path)?.resolve()?;
    let currency = checkout.project.currency;
    let (totals, snapshot) = run(checkout, config).await?;

    match format {
        OutputFormat::Json => print_json(&SimulationOutput {
            totals: totals.into_iter().map(|t| Money::new(t, currency)).collect(),
            snapshot,
        }),
        OutputFormat::Table => {
            for (i, total) in totals.iter().enumerate() {
                println!("{:>3}  {}", i + 1, money(*total, currency));
            }
            match &snapshot.breakdown {
                Some(breakdown) => print_breakdown(breakdown, currency),
                None => print_warning("Shipping unavailable; no total"),
            }
            if snapshot.submit_enabled {
                print_success("Ready to submit");
            } else {
                print_warning("Submit disabled");
            }
            Ok(())
        }
    }
}

/// Drive a session through every step and collect the totals it published.
pub async fn run(checkout: Checkout, config: &PledgeConfig) -> CliResult<(Vec<Amount>, CheckoutSnapshot)> {
    let mut provider = StaticShippingRules::new();
    provider.insert(
        checkout.project.id.clone(),
        checkout.reward.id.clone(),
        checkout.reward.shipping_rules.clone(),
    );

    let mut input = CheckoutInput::new(checkout.project.clone(), checkout.reward.clone())
        .with_add_ons(checkout.add_ons.clone())
        .with_reason(checkout.reason);
    if let Some(rule) = &checkout.rule {
        input = input.with_initial_rule(rule.clone());
    }

    let handle = CheckoutSession::spawn_with_calculator(
        CheckoutContext::new(config.platform()),
        input,
        Arc::new(provider),
        PledgeCalculator::with_config(config.calculator()),
    );
    let mut totals_rx = handle.subscribe_totals();

    let mut events = Vec::new();
    if !checkout.bonus.is_zero() {
        events.push(CheckoutEvent::BonusInput(
            checkout.project.currency.to_decimal_string(checkout.bonus),
        ));
    }
    for step in &checkout.steps {
        events.push(match step {
            Step::Select { destination } => CheckoutEvent::ShippingRuleSelected(find_rule(
                &checkout.reward,
                &checkout.add_ons,
                destination,
            )?),
            Step::Bonus { value } => CheckoutEvent::BonusInput(value.clone()),
            Step::Increase => CheckoutEvent::IncreaseBonus,
            Step::Decrease => CheckoutEvent::DecreaseBonus,
        });
    }

    // Steps start once the session has started and shipping is known
    let mut snapshot = handle
        .wait_for(|s| s.revision >= 1 && s.shipping != ShippingPhase::Loading)
        .await?;
    for event in events {
        // Bonus edits are ignored where the flow fixes the amount
        let applies = matches!(event, CheckoutEvent::ShippingRuleSelected(_)) || snapshot.bonus_editable;
        let revision = snapshot.revision;
        debug!(?event, revision, "Simulating step");

        handle.send(event).await?;
        if applies {
            snapshot = handle.wait_for(|s| s.revision > revision).await?;
        }
    }
    let snapshot = handle.snapshot();
    handle.shutdown().await;

    let mut totals = Vec::new();
    loop {
        match totals_rx.try_recv() {
            Ok(total) => totals.push(total),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    if totals.is_empty() && snapshot.shipping == ShippingPhase::Failed {
        return Err(PledgeError::ShippingRulesUnavailable(checkout.reward.id.to_string()).into());
    }

    info!(
        steps = checkout.steps.len(),
        totals = totals.len(),
        final_total = snapshot.total.map(|t| t.minor()),
        "Simulation finished"
    );
    Ok((totals, snapshot))
}
