//! FinPro CLI - AI insights for small-business cash flow
//!
//! Usage:
//!   finpro insights --file tx.csv             Strategic insights
//!   finpro forecast --file tx.json            Next-period balance forecast
//!   finpro receipt --image recibo.jpg         Extract receipt fields
//!   finpro serve --port 3000                  Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::ServiceOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let options = ServiceOptions {
        prompts_dir: cli.prompts_dir.clone(),
        models_config: cli.models_config.clone(),
        model: cli.model.clone(),
    };

    match cli.command {
        Commands::Insights { file } => {
            let service = commands::require_service(&options)?;
            commands::cmd_insights(&service, &file, cli.json).await
        }
        Commands::Forecast { file } => {
            let service = commands::require_service(&options)?;
            commands::cmd_forecast(&service, &file, cli.json).await
        }
        Commands::Receipt { image, data_url } => {
            let service = commands::require_service(&options)?;
            let source = match (image, data_url) {
                (Some(path), _) => commands::ReceiptSource::File(path),
                (None, Some(data)) => commands::ReceiptSource::DataUrl(data),
                (None, None) => anyhow::bail!("Either --image or --data-url is required"),
            };
            commands::cmd_receipt(&service, source, cli.json).await
        }
        Commands::Ask { file, question } => {
            let service = commands::require_service(&options)?;
            commands::cmd_ask(&service, &file, &question).await
        }
        Commands::Summary { file, period } => commands::cmd_summary(&file, period, cli.json),
        Commands::Prompts { action } => {
            let library = commands::load_prompts(&options)?;
            match action {
                None | Some(PromptsAction::List) => commands::cmd_prompts_list(&library),
                Some(PromptsAction::Show { id }) => commands::cmd_prompts_show(&library, &id),
                Some(PromptsAction::Path) => commands::cmd_prompts_path(&library),
            }
        }
        Commands::Status => commands::cmd_status(&options).await,
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&options, &host, port, no_auth).await,
    }
}
