//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (service construction, transaction loading)
//! - `insights` - Insights, forecast and advisor commands
//! - `prompts` - Prompt library management commands
//! - `receipts` - Receipt extraction command
//! - `serve` - Web server command
//! - `status` - AI backend status command
//! - `summary` - Cash-flow summary command

pub mod core;
pub mod insights;
pub mod prompts;
pub mod receipts;
pub mod serve;
pub mod status;
pub mod summary;

// Re-export command functions for main.rs
pub use core::*;
pub use insights::*;
pub use prompts::*;
pub use receipts::*;
pub use serve::*;
pub use status::*;
pub use summary::*;

/// Format an amount the way the dashboard shows it, e.g. `R$ -1.234,56`
pub fn format_brl(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("R$ {}{},{}", sign, grouped, frac_part)
}
