//! Transaction import from JSON and CSV
//!
//! CSV files may use either the plain English layout
//! (`date,amount,type,category,description`) or the dashboard's Portuguese
//! export (`Data;Tipo;Categoria;Descrição;Valor;Método`, `dd/mm/yyyy` dates,
//! decimal comma). Header names are matched case-insensitively and the
//! delimiter is sniffed from the header line.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionType};

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Some(Self::Json),
            Some("csv") | Some("txt") => Some(Self::Csv),
            _ => None,
        }
    }

    /// Guess the format from the content itself
    pub fn sniff(content: &str) -> Self {
        match strip_bom(content).trim_start().chars().next() {
            Some('[') | Some('{') => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Read a transaction file, picking the format from the extension or content
pub fn load_file(path: &Path) -> Result<Vec<Transaction>> {
    let content = fs::read_to_string(path)?;
    let format = ImportFormat::from_path(path).unwrap_or_else(|| ImportFormat::sniff(&content));
    let transactions = parse_transactions(&content, format)?;
    debug!(
        path = %path.display(),
        count = transactions.len(),
        "Loaded transactions"
    );
    Ok(transactions)
}

/// Parse transactions in the given format
pub fn parse_transactions(content: &str, format: ImportFormat) -> Result<Vec<Transaction>> {
    match format {
        ImportFormat::Json => parse_json(content),
        ImportFormat::Csv => parse_csv(content),
    }
}

/// A JSON file holds either a bare array or `{"transactions": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    List(Vec<Transaction>),
    Wrapped { transactions: Vec<Transaction> },
}

/// Parse a JSON transaction list
pub fn parse_json(content: &str) -> Result<Vec<Transaction>> {
    let document: JsonDocument = serde_json::from_str(strip_bom(content))
        .map_err(|e| Error::Import(format!("Invalid transaction JSON: {}", e)))?;
    Ok(match document {
        JsonDocument::List(list) => list,
        JsonDocument::Wrapped { transactions } => transactions,
    })
}

/// Column positions resolved from the header row
#[derive(Debug)]
struct Columns {
    date: usize,
    amount: usize,
    kind: Option<usize>,
    category: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().to_lowercase();
                names.iter().any(|n| h == *n)
            })
        };

        let date = find(&["date", "data"])
            .ok_or_else(|| Error::Import("Missing date column".into()))?;
        let amount = find(&["amount", "valor", "value"])
            .ok_or_else(|| Error::Import("Missing amount column".into()))?;

        Ok(Self {
            date,
            amount,
            kind: find(&["type", "tipo"]),
            category: find(&["category", "categoria"]),
            description: find(&["description", "descrição", "descricao", "desc"]),
        })
    }
}

/// Parse CSV transactions
pub fn parse_csv(content: &str) -> Result<Vec<Transaction>> {
    let content = strip_bom(content);
    let delimiter = sniff_delimiter(content);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;
    let mut transactions = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Line numbers are 1-based and the header is line 1
        let line = index + 2;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let field = |i: Option<usize>| {
            i.and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default()
        };

        let date = parse_date(field(Some(columns.date)))
            .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?;
        let amount = parse_amount(field(Some(columns.amount)))
            .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?;

        let kind = match field(columns.kind) {
            "" => TransactionType::from_sign(amount),
            raw => raw
                .parse::<TransactionType>()
                .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?,
        };

        transactions.push(Transaction::new(
            date,
            amount,
            kind,
            field(columns.category),
            field(columns.description),
        ));
    }

    Ok(transactions)
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// `;` when the header line uses it, `,` otherwise
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Parse a date in ISO or day-first form
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%d/%m/%Y", // 15/01/2024
        "%d-%m-%Y", // 15-01-2024
        "%d.%m.%Y", // 15.01.2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, handling currency symbols and either decimal separator
///
/// When both `.` and `,` appear, the last one is the decimal separator. A
/// lone `,` is a decimal comma; repeated separators are thousands groups.
pub fn parse_amount(s: &str) -> Result<f64> {
    let mut cleaned: String = s
        .trim()
        .replace("R$", "")
        .chars()
        .filter(|c| !matches!(c, '$' | ' ' | '\u{a0}'))
        .collect();

    let negative = cleaned.starts_with('(') && cleaned.ends_with(')');
    if negative {
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }

    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if commas == 1 => cleaned.replace(',', "."),
        (Some(_), None) => cleaned.replace(',', ""),
        (None, Some(_)) if dots > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    let value = normalized
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))?;

    if !value.is_finite() {
        return Err(Error::Import(format!("Unable to parse amount: {}", s)));
    }

    Ok(if negative { -value } else { value })
}
