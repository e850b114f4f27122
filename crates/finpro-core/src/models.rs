//! Domain models for FinPro

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    #[serde(alias = "income", alias = "Receita", alias = "receita")]
    Income,
    #[serde(alias = "expense", alias = "Despesa", alias = "despesa")]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    /// Infer the type from the sign of an amount (zero counts as income)
    pub fn from_sign(amount: f64) -> Self {
        if amount < 0.0 {
            Self::Expense
        } else {
            Self::Income
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(Self::Income),
            "expense" | "despesa" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction supplied by the caller
///
/// The explicit `type` is authoritative. Records that omit it get a type
/// inferred from the sign of `amount` when they are deserialized, so every
/// constructed transaction has exactly one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTransaction")]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub description: String,
}

impl Transaction {
    /// Create a transaction with an explicit type
    pub fn new(
        date: NaiveDate,
        amount: f64,
        kind: TransactionType,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            kind,
            category: category.into(),
            description: description.into(),
        }
    }

    /// Create a transaction whose type is inferred from the sign of `amount`
    pub fn signed(
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            date,
            amount,
            TransactionType::from_sign(amount),
            category,
            description,
        )
    }

    /// Magnitude of the amount, independent of sign convention
    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }
}

/// Wire shape of a transaction, with the type optional
#[derive(Deserialize)]
struct RawTransaction {
    date: NaiveDate,
    amount: f64,
    #[serde(rename = "type", default)]
    kind: Option<TransactionType>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
}

impl From<RawTransaction> for Transaction {
    fn from(raw: RawTransaction) -> Self {
        Self {
            date: raw.date,
            amount: raw.amount,
            kind: raw
                .kind
                .unwrap_or_else(|| TransactionType::from_sign(raw.amount)),
            category: raw.category,
            description: raw.description,
        }
    }
}

/// Projection sent to the model for free-text insights
#[derive(Debug, Clone, Serialize)]
pub struct InsightSummary<'a> {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub category: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a Transaction> for InsightSummary<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            kind: tx.kind,
            amount: tx.amount,
            category: &tx.category,
            description: &tx.description,
        }
    }
}

/// Projection sent to the model for balance forecasting
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl From<&Transaction> for ForecastPoint {
    fn from(tx: &Transaction) -> Self {
        Self {
            date: tx.date,
            amount: tx.amount,
            kind: tx.kind,
        }
    }
}

/// Projection sent to the model for advisor questions
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorContext<'a> {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub category: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a Transaction> for AdvisorContext<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            date: tx.date,
            kind: tx.kind,
            amount: tx.amount,
            category: &tx.category,
            description: &tx.description,
        }
    }
}

/// Forecast risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Next-period balance forecast produced by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialForecast {
    pub predicted_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    pub risk_level: RiskLevel,
    pub explanation: String,
}

/// Fields extracted from a receipt image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptExtraction {
    pub amount: f64,
    pub date: String,
    pub description: String,
    #[serde(
        default,
        alias = "category_suggestion",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_suggestion: Option<String>,
}
