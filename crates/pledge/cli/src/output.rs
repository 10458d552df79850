//! Output formatting utilities

use colored::*;
use pledge_calculator::{LineItem, LineItemKind, PledgeBreakdown};
use pledge_types::{Amount, Currency, Money};
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// One row of a pledge summary table
#[derive(Debug, Tabled)]
pub struct LineRow {
    #[tabled(rename = "Item")]
    pub item: String,
    #[tabled(rename = "Qty")]
    pub quantity: u32,
    #[tabled(rename = "Amount")]
    pub amount: String,
}

impl LineRow {
    pub fn from_line(line: &LineItem, currency: Currency) -> Self {
        let label = match line.kind {
            LineItemKind::Reward => "Reward",
            LineItemKind::AddOn => "Add-on",
            LineItemKind::Shipping => "Shipping",
            LineItemKind::Bonus => "Bonus",
        };
        let item = match &line.title {
            Some(title) => format!("{label}: {title}"),
            None => match &line.reward_id {
                Some(id) => format!("{label}: {id}"),
                None => label.to_string(),
            },
        };
        Self {
            item,
            quantity: line.quantity,
            amount: money(line.amount, currency),
        }
    }
}

/// Format an amount for display
pub fn money(amount: Amount, currency: Currency) -> String {
    Money::new(amount, currency).to_string()
}

/// Print a breakdown as a table followed by its total
pub fn print_breakdown(breakdown: &PledgeBreakdown, currency: Currency) {
    let rows: Vec<LineRow> = breakdown
        .line_items()
        .iter()
        .map(|line| LineRow::from_line(line, currency))
        .collect();
    println!("{}", Table::new(rows));
    println!("{} {}", "Total:".bold(), money(breakdown.total, currency).bold());
}

/// Print a single item as pretty JSON
pub fn print_json<T: Serialize>(data: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pledge_types::RewardId;

    #[test]
    fn test_money_format() {
        assert_eq!(money(Amount::new(41_400), Currency::Usd), "$414.00");
        assert_eq!(money(Amount::new(500), Currency::Jpy), "¥500");
    }

    #[test]
    fn test_line_row_labels() {
        let line = LineItem {
            kind: LineItemKind::AddOn,
            reward_id: Some(RewardId::new("dice")),
            title: None,
            quantity: 2,
            amount: Amount::new(1800),
        };
        let row = LineRow::from_line(&line, Currency::Usd);
        assert_eq!(row.item, "Add-on: dice");
        assert_eq!(row.quantity, 2);
        assert_eq!(row.amount, "$18.00");

        let bonus = LineItem {
            kind: LineItemKind::Bonus,
            reward_id: None,
            title: None,
            quantity: 1,
            amount: Amount::new(700),
        };
        assert_eq!(LineRow::from_line(&bonus, Currency::Usd).item, "Bonus");
    }
}
