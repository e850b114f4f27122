//! Cash-flow summary command implementation

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use finpro_core::summary::{CashFlowSummary, Period};

use super::{format_brl, load_transactions};

pub fn cmd_summary(file: &Path, period: Period, json: bool) -> Result<()> {
    let transactions = load_transactions(file)?;
    let summary = CashFlowSummary::for_period(&transactions, period, Local::now().date_naive());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_summary(&summary, period));
    }
    Ok(())
}

/// Human-readable summary block
pub fn format_summary(summary: &CashFlowSummary, period: Period) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n💰 Cash flow ({})\n", period));
    out.push_str("   ─────────────────────────────\n");
    out.push_str(&format!("   Income:   {:>16}\n", format_brl(summary.income)));
    out.push_str(&format!("   Expenses: {:>16}\n", format_brl(summary.expenses)));
    out.push_str(&format!("   Balance:  {:>16}\n", format_brl(summary.balance)));
    out.push_str(&format!("   Transactions: {}\n", summary.transaction_count));

    if !summary.by_category.is_empty() {
        out.push_str("\n   Expenses by category:\n");
        for category in &summary.by_category {
            out.push_str(&format!(
                "   {:<24} {:>16}  ({})\n",
                category.category,
                format_brl(category.total),
                category.count
            ));
        }
    }
    out
}
