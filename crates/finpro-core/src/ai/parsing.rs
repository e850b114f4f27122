//! JSON parsing helpers for AI backend responses
//!
//! Structured-output modes should return bare JSON, but models still wrap it
//! in prose or code fences now and then. These helpers pull the outermost
//! object out of the text and validate it against the expected shape.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{FinancialForecast, ReceiptExtraction};

/// Maximum characters of raw model text quoted in error messages
const RAW_PREVIEW_CHARS: usize = 200;

/// Shorten model text for error messages without splitting a UTF-8 character
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(RAW_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Locate the outermost JSON object in a model response
pub fn extract_json_object(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::InvalidData(format!(
            "No JSON found in AI response | Raw: {}",
            preview(response)
        ))),
    }
}

fn parse_object<T: DeserializeOwned>(response: &str, what: &str) -> Result<T> {
    let json_str = extract_json_object(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid {} JSON from AI: {} | Raw: {}",
            what,
            e,
            preview(json_str)
        ))
    })
}

/// Parse a balance forecast
///
/// Fails when `predictedBalance`, `riskLevel` or `explanation` is missing or
/// when `riskLevel` is not LOW/MEDIUM/HIGH. An out-of-range `confidenceScore`
/// is dropped rather than failing the whole forecast.
pub fn parse_forecast(response: &str) -> Result<FinancialForecast> {
    let mut forecast: FinancialForecast = parse_object(response, "forecast")?;

    if let Some(score) = forecast.confidence_score {
        if !(0.0..=1.0).contains(&score) {
            warn!(score, "Discarding confidenceScore outside [0, 1]");
            forecast.confidence_score = None;
        }
    }

    Ok(forecast)
}

/// Parse receipt fields; `amount`, `date` and `description` are required
pub fn parse_receipt_extraction(response: &str) -> Result<ReceiptExtraction> {
    parse_object(response, "receipt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;

    #[test]
    fn test_parse_forecast() {
        let response = r#"{"predictedBalance": 6200, "confidenceScore": 0.8, "riskLevel": "LOW", "explanation": "stable trend"}"#;
        let result = parse_forecast(response).unwrap();
        assert_eq!(result.predicted_balance, 6200.0);
        assert_eq!(result.confidence_score, Some(0.8));
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_parse_forecast_with_code_fence() {
        let response = "```json\n{\"predictedBalance\": -120.5, \"riskLevel\": \"HIGH\", \"explanation\": \"saídas maiores\"}\n```";
        let result = parse_forecast(response).unwrap();
        assert_eq!(result.predicted_balance, -120.5);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result.confidence_score.is_none());
    }

    #[test]
    fn test_parse_forecast_missing_required() {
        assert!(parse_forecast(r#"{"riskLevel": "LOW", "explanation": "x"}"#).is_err());
        assert!(parse_forecast(r#"{"predictedBalance": 1, "explanation": "x"}"#).is_err());
        assert!(parse_forecast(r#"{"predictedBalance": 1, "riskLevel": "LOW"}"#).is_err());
        assert!(parse_forecast(r#"{"predictedBalance": null, "riskLevel": "LOW", "explanation": "x"}"#).is_err());
    }

    #[test]
    fn test_parse_forecast_rejects_unknown_risk() {
        let response = r#"{"predictedBalance": 1, "riskLevel": "CRITICAL", "explanation": "x"}"#;
        assert!(parse_forecast(response).is_err());
    }

    #[test]
    fn test_parse_forecast_drops_out_of_range_confidence() {
        let response = r#"{"predictedBalance": 1, "confidenceScore": 85, "riskLevel": "MEDIUM", "explanation": "x"}"#;
        let result = parse_forecast(response).unwrap();
        assert!(result.confidence_score.is_none());
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_parse_forecast_not_json() {
        let err = parse_forecast("Desculpe, não consigo prever.").unwrap_err();
        assert!(err.to_string().contains("No JSON found"));
    }

    #[test]
    fn test_parse_receipt_extraction() {
        let response = r#"Here it is: {"amount": 87.3, "date": "2024-02-10", "description": "Supermercado Dia", "categorySuggestion": "Alimentação"}"#;
        let result = parse_receipt_extraction(response).unwrap();
        assert_eq!(result.amount, 87.3);
        assert_eq!(result.date, "2024-02-10");
        assert_eq!(result.description, "Supermercado Dia");
        assert_eq!(result.category_suggestion.as_deref(), Some("Alimentação"));
    }

    #[test]
    fn test_parse_receipt_missing_description() {
        let response = r#"{"amount": 87.3, "date": "2024-02-10"}"#;
        assert!(parse_receipt_extraction(response).is_err());
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let long = "ç".repeat(300);
        let shortened = preview(&long);
        assert!(shortened.ends_with("..."));
        assert_eq!(shortened.chars().count(), RAW_PREVIEW_CHARS + 3);
    }
}
