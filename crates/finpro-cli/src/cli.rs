//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use finpro_core::summary::Period;

/// FinPro - AI insights for small-business cash flow
#[derive(Parser)]
#[command(name = "finpro")]
#[command(about = "Cash-flow insights, forecasts and receipt extraction", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory with prompt overrides (defaults to the user data directory)
    #[arg(long, global = true)]
    pub prompts_dir: Option<PathBuf>,

    /// Override the backend's default model (e.g., gemini-2.5-pro)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Model routing config file (defaults to the user data directory)
    #[arg(long, global = true)]
    pub models_config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Strategic insights about the most recent transactions
    Insights {
        /// Transactions file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Forecast next period's balance and risk
    Forecast {
        /// Transactions file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Extract amount, date and merchant from a receipt photo
    #[command(group(ArgGroup::new("source").required(true).args(["image", "data_url"])))]
    Receipt {
        /// Image file
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Image as a data URL or bare base64
        #[arg(long)]
        data_url: Option<String>,
    },

    /// Ask the advisor a question about your transactions
    Ask {
        /// Transactions file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Question to ask
        #[arg(short, long)]
        question: String,
    },

    /// Income, expenses and balance
    Summary {
        /// Transactions file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Period: all, week, month, year
        #[arg(short, long, default_value = "all")]
        period: Period,
    },

    /// Manage AI prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Show AI backend status
    Status,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all prompts and their override status
    List,

    /// Show the content of a prompt
    Show {
        /// Prompt ID (e.g., financial_insights)
        id: String,
    },

    /// Print the prompt override directory
    Path,
}
