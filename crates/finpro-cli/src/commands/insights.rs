//! Insight, forecast and advisor command implementations

use std::path::Path;

use anyhow::Result;
use finpro_core::insights::{InsightOutcome, InsightReply, InsightService};
use finpro_core::models::FinancialForecast;

use super::{format_brl, load_transactions};

pub async fn cmd_insights(service: &InsightService, file: &Path, json: bool) -> Result<()> {
    let transactions = load_transactions(file)?;
    println!("🤖 Analyzing {} transactions...", transactions.len());

    let reply = service.get_insights(&transactions).await;
    print_reply(&reply, json)
}

pub async fn cmd_forecast(service: &InsightService, file: &Path, json: bool) -> Result<()> {
    let transactions = load_transactions(file)?;
    let forecast = service.get_forecast(&transactions).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    match forecast {
        Some(forecast) => print!("{}", format_forecast(&forecast)),
        None => {
            println!("No forecast available.");
            println!("   At least 3 transactions are needed and the model must answer.");
        }
    }
    Ok(())
}

pub async fn cmd_ask(service: &InsightService, file: &Path, question: &str) -> Result<()> {
    let transactions = load_transactions(file)?;
    let reply = service.ask_advisor(&transactions, question).await;
    print_reply(&reply, false)
}

fn print_reply(reply: &InsightReply, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
        return Ok(());
    }

    println!();
    println!("{}", reply.text);
    if reply.outcome == InsightOutcome::Unavailable {
        println!();
        println!("   (Run with --verbose for details)");
    }
    Ok(())
}

/// Human-readable forecast block
pub fn format_forecast(forecast: &FinancialForecast) -> String {
    let mut out = String::new();
    out.push_str("\n📈 Forecast\n");
    out.push_str("   ─────────────────────────────\n");
    out.push_str(&format!(
        "   Predicted balance: {}\n",
        format_brl(forecast.predicted_balance)
    ));
    out.push_str(&format!("   Risk level: {}\n", forecast.risk_level));
    if let Some(confidence) = forecast.confidence_score {
        out.push_str(&format!("   Confidence: {:.0}%\n", confidence * 100.0));
    }
    out.push_str(&format!("\n   {}\n", forecast.explanation));
    out
}
