//! Cash-flow totals for the dashboard
//!
//! Totals use the magnitude of each amount grouped by its type, so lists
//! that store expenses as negative numbers and lists that store them as
//! positive numbers with `type = EXPENSE` give the same result.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// Reporting window relative to a reference date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    /// From 6 days before the reference date onward; later dates count too
    Week,
    /// The reference date's calendar month
    Month,
    /// The reference date's calendar year
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Whether `date` falls inside this period
    pub fn contains(&self, date: NaiveDate, reference: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Week => {
                let start = reference
                    .checked_sub_days(Days::new(6))
                    .unwrap_or(NaiveDate::MIN);
                date >= start
            }
            Self::Month => date.year() == reference.year() && date.month() == reference.month(),
            Self::Year => date.year() == reference.year(),
        }
    }

    /// Transactions inside this period, in input order
    pub fn filter(&self, transactions: &[Transaction], reference: NaiveDate) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.contains(t.date, reference))
            .cloned()
            .collect()
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "tudo" => Ok(Self::All),
            "week" | "semana" => Ok(Self::Week),
            "month" | "mes" | "mês" => Ok(Self::Month),
            "year" | "ano" => Ok(Self::Year),
            _ => Err(format!(
                "Unknown period: {} (expected all, week, month or year)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

/// Income, expenses and balance over a set of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    pub income: f64,
    /// Positive magnitude
    pub expenses: f64,
    pub balance: f64,
    pub transaction_count: usize,
    /// Expenses per category, largest first
    pub by_category: Vec<CategoryTotal>,
}

/// Category label used when a transaction has none
pub const UNCATEGORIZED: &str = "Sem categoria";

impl CashFlowSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut income = 0.0;
        let mut expenses = 0.0;
        let mut categories: HashMap<&str, (f64, usize)> = HashMap::new();

        for tx in transactions {
            match tx.kind {
                TransactionType::Income => income += tx.magnitude(),
                TransactionType::Expense => {
                    expenses += tx.magnitude();
                    let name = match tx.category.trim() {
                        "" => UNCATEGORIZED,
                        name => name,
                    };
                    let entry = categories.entry(name).or_insert((0.0, 0));
                    entry.0 += tx.magnitude();
                    entry.1 += 1;
                }
            }
        }

        let mut by_category: Vec<CategoryTotal> = categories
            .into_iter()
            .map(|(category, (total, count))| CategoryTotal {
                category: category.to_string(),
                total,
                count,
            })
            .collect();
        by_category.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });

        Self {
            income,
            expenses,
            balance: income - expenses,
            transaction_count: transactions.len(),
            by_category,
        }
    }

    /// Summary of the transactions inside `period`
    pub fn for_period(transactions: &[Transaction], period: Period, reference: NaiveDate) -> Self {
        Self::from_transactions(&period.filter(transactions, reference))
    }
}
