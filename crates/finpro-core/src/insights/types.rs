//! Insight reply types

use serde::{Deserialize, Serialize};

/// Shown when there are no transactions to analyze
pub const NO_TRANSACTIONS_MESSAGE: &str =
    "Adicione algumas transações para receber insights financeiros.";

/// Shown when the model answered with no text
pub const EMPTY_REPLY_MESSAGE: &str = "Continue registrando para mais insights.";

/// Shown when the model could not be reached or failed
pub const UNAVAILABLE_MESSAGE: &str =
    "Não foi possível analisar seus dados agora. Tente novamente.";

/// Shown when the advisor is asked a blank question
pub const NO_QUESTION_MESSAGE: &str = "Digite uma pergunta sobre seu fluxo de caixa.";

/// How a text reply came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightOutcome {
    /// The model produced the text
    Generated,
    /// Nothing to send; no call was made
    NoInput,
    /// The call succeeded but the model returned no text
    EmptyReply,
    /// The call failed (transport, auth, quota, timeout)
    Unavailable,
}

impl InsightOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::NoInput => "no_input",
            Self::EmptyReply => "empty_reply",
            Self::Unavailable => "unavailable",
        }
    }
}

/// A displayable text reply; `text` is always safe to show the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightReply {
    pub outcome: InsightOutcome,
    pub text: String,
}

impl InsightReply {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            outcome: InsightOutcome::Generated,
            text: text.into(),
        }
    }

    pub fn no_input(message: &str) -> Self {
        Self {
            outcome: InsightOutcome::NoInput,
            text: message.to_string(),
        }
    }

    pub fn empty_reply() -> Self {
        Self {
            outcome: InsightOutcome::EmptyReply,
            text: EMPTY_REPLY_MESSAGE.to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            outcome: InsightOutcome::Unavailable,
            text: UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    /// Whether the text came from the model
    pub fn is_generated(&self) -> bool {
        self.outcome == InsightOutcome::Generated
    }
}
