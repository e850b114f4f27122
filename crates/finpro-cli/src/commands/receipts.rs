//! Receipt command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use finpro_core::insights::InsightService;

use super::format_brl;

/// Where the receipt image comes from
#[derive(Debug, Clone)]
pub enum ReceiptSource {
    File(PathBuf),
    DataUrl(String),
}

pub async fn cmd_receipt(service: &InsightService, source: ReceiptSource, json: bool) -> Result<()> {
    let extraction = match source {
        ReceiptSource::File(path) => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            service.analyze_receipt_bytes(&bytes).await
        }
        ReceiptSource::DataUrl(data) => service.analyze_receipt(&data).await,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    match extraction {
        Some(receipt) => {
            println!();
            println!("🧾 Receipt");
            println!("   ─────────────────────────────");
            println!("   Amount: {}", format_brl(receipt.amount));
            println!("   Date: {}", receipt.date);
            println!("   Description: {}", receipt.description);
            if let Some(category) = &receipt.category_suggestion {
                println!("   Suggested category: {}", category);
            }
        }
        None => println!("Could not read the receipt. Try a sharper photo."),
    }
    Ok(())
}
