//! Financial Insight Service
//!
//! Three stateless operations over a remote generative model, plus the
//! advisor question:
//!
//! - **Insights** - short strategic advice about the most recent transactions
//! - **Forecast** - structured next-period balance prediction with a risk level
//! - **Receipt** - amount, date and merchant extracted from a receipt photo
//! - **Advisor** - free-form question answered with the transactions as context
//!
//! None of them returns an error. Text operations always produce a
//! displayable [`InsightReply`]; structured ones return `None` on failure.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finpro_core::insights::InsightService;
//!
//! let ai = AIClient::from_env().expect("AI backend configured");
//! let service = InsightService::with_defaults(ai);
//! let reply = service.get_insights(&transactions).await;
//! println!("{}", reply.text);
//! ```

pub mod service;
pub mod types;

pub use service::{
    forecast_schema, receipt_schema, strip_data_url, InsightService, MIN_FORECAST_TRANSACTIONS,
    RECENT_WINDOW,
};
pub use types::{
    InsightOutcome, InsightReply, EMPTY_REPLY_MESSAGE, NO_QUESTION_MESSAGE,
    NO_TRANSACTIONS_MESSAGE, UNAVAILABLE_MESSAGE,
};
