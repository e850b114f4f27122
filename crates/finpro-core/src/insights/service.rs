//! Financial Insight Service
//!
//! Turns a caller-supplied transaction list into model requests and the
//! model's answers back into domain values. Nothing here returns an error:
//! every failure is logged and replaced by a fallback reply or `None`.

use std::collections::HashMap;
use std::sync::Arc;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tracing::{debug, warn};

use crate::ai::parsing::{parse_forecast, parse_receipt_extraction, preview};
use crate::ai::{AIBackend, AIClient, GenerateRequest, InlineImage, ResponseSchema};
use crate::error::{Error, Result};
use crate::model_router::{ModelRouter, TaskType};
use crate::models::{
    AdvisorContext, FinancialForecast, ForecastPoint, InsightSummary, ReceiptExtraction,
    Transaction,
};
use crate::prompts::{PromptId, PromptLibrary};

use super::types::{InsightReply, NO_QUESTION_MESSAGE, NO_TRANSACTIONS_MESSAGE};

/// How many of the most recent transactions text prompts include
pub const RECENT_WINDOW: usize = 30;

/// Minimum history length before a forecast is attempted
pub const MIN_FORECAST_TRANSACTIONS: usize = 3;

/// Receipt images are always declared as JPEG
const RECEIPT_MIME_TYPE: &str = "image/jpeg";

/// Standard alphabet, padding optional
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Stateless façade over the configured AI backend
///
/// Cheap to clone; clones share the same prompts and routing config.
#[derive(Clone)]
pub struct InsightService {
    ai: AIClient,
    router: Arc<ModelRouter>,
    prompts: Arc<PromptLibrary>,
}

impl InsightService {
    pub fn new(ai: AIClient, router: ModelRouter, prompts: PromptLibrary) -> Self {
        Self {
            ai,
            router: Arc::new(router),
            prompts: Arc::new(prompts),
        }
    }

    /// Service with the embedded routing config and prompts
    pub fn with_defaults(ai: AIClient) -> Self {
        Self::new(ai, ModelRouter::embedded(), PromptLibrary::embedded_only())
    }

    pub fn ai(&self) -> &AIClient {
        &self.ai
    }

    /// Short strategic insights about the most recent transactions
    pub async fn get_insights(&self, transactions: &[Transaction]) -> InsightReply {
        if transactions.is_empty() {
            return InsightReply::no_input(NO_TRANSACTIONS_MESSAGE);
        }

        let summary: Vec<InsightSummary<'_>> = most_recent(transactions, RECENT_WINDOW)
            .into_iter()
            .map(InsightSummary::from)
            .collect();

        let result = match serde_json::to_string(&summary) {
            Ok(json) => {
                self.generate_text(
                    TaskType::Insights,
                    PromptId::FinancialInsights,
                    &[("transactions", json.as_str())],
                )
                .await
            }
            Err(e) => Err(e.into()),
        };

        text_reply(TaskType::Insights, result)
    }

    /// Next-period balance forecast over the full history
    ///
    /// `None` when there are fewer than three transactions or the model's
    /// answer is unusable.
    pub async fn get_forecast(&self, transactions: &[Transaction]) -> Option<FinancialForecast> {
        if transactions.len() < MIN_FORECAST_TRANSACTIONS {
            debug!(
                count = transactions.len(),
                "Not enough transactions for a forecast"
            );
            return None;
        }

        let history: Vec<ForecastPoint> = transactions.iter().map(ForecastPoint::from).collect();

        let result: Result<FinancialForecast> = async {
            let json = serde_json::to_string(&history)?;
            let mut vars = HashMap::new();
            vars.insert("history", json.as_str());
            let request = self
                .base_request(TaskType::Forecast, PromptId::FinancialForecast, &vars)?
                .with_schema(forecast_schema());
            let text = self.call(request).await?;
            parse_forecast(&require_text(text)?)
        }
        .await;

        absorb(TaskType::Forecast, result)
    }

    /// Extract amount, date, merchant and a category from a receipt image
    ///
    /// Accepts a `data:` URL or a bare base64 payload, line-wrapped or
    /// unpadded. `None` when the payload is empty or not base64 (no call is
    /// made) or the answer is unusable.
    pub async fn analyze_receipt(&self, image_data: &str) -> Option<ReceiptExtraction> {
        let payload = match normalize_base64(strip_data_url(image_data)) {
            Ok(payload) => payload,
            Err(reason) => {
                warn!("Receipt image {}", reason);
                return None;
            }
        };

        let result: Result<ReceiptExtraction> = async {
            let prompt = self.prompts.get(PromptId::AnalyzeReceipt)?;
            let vars = HashMap::new();
            let config = self.router.config_for_task(TaskType::Receipt);
            let request = GenerateRequest::new(TaskType::Receipt)
                .with_model(config.model)
                .with_temperature(config.temperature)
                .with_system(prompt.render_system(&vars))
                .with_image(InlineImage {
                    mime_type: RECEIPT_MIME_TYPE.to_string(),
                    data: payload.clone(),
                })
                .with_text(prompt.render_user(&vars))
                .with_schema(receipt_schema());
            let text = self.call(request).await?;
            parse_receipt_extraction(&require_text(text)?)
        }
        .await;

        absorb(TaskType::Receipt, result)
    }

    /// [`analyze_receipt`](Self::analyze_receipt) for raw image bytes
    pub async fn analyze_receipt_bytes(&self, image: &[u8]) -> Option<ReceiptExtraction> {
        if image.is_empty() {
            warn!("Receipt image is empty");
            return None;
        }
        let encoded = STANDARD.encode(image);
        self.analyze_receipt(&encoded).await
    }

    /// Answer a free-form question with the recent transactions as context
    pub async fn ask_advisor(&self, transactions: &[Transaction], question: &str) -> InsightReply {
        let question = question.trim();
        if question.is_empty() {
            return InsightReply::no_input(NO_QUESTION_MESSAGE);
        }

        let context: Vec<AdvisorContext<'_>> = most_recent(transactions, RECENT_WINDOW)
            .into_iter()
            .map(AdvisorContext::from)
            .collect();

        let result = match serde_json::to_string(&context) {
            Ok(json) => {
                self.generate_text(
                    TaskType::Advisor,
                    PromptId::FinancialAdvisor,
                    &[("transactions", json.as_str()), ("question", question)],
                )
                .await
            }
            Err(e) => Err(e.into()),
        };

        text_reply(TaskType::Advisor, result)
    }

    /// Request with the task's model, temperature and system instruction,
    /// plus the rendered user section as its only text part
    fn base_request(
        &self,
        task: TaskType,
        prompt_id: PromptId,
        vars: &HashMap<&str, &str>,
    ) -> Result<GenerateRequest> {
        let prompt = self.prompts.get(prompt_id)?;
        let config = self.router.config_for_task(task);
        Ok(GenerateRequest::new(task)
            .with_model(config.model)
            .with_temperature(config.temperature)
            .with_system(prompt.render_system(vars))
            .with_text(prompt.render_user(vars)))
    }

    async fn generate_text(
        &self,
        task: TaskType,
        prompt_id: PromptId,
        vars: &[(&str, &str)],
    ) -> Result<Option<String>> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        let request = self.base_request(task, prompt_id, &vars)?;
        self.call(request).await
    }

    /// One logical call: per-task timeout, bounded retry with backoff
    ///
    /// Only transport-class failures are retried.
    async fn call(&self, request: GenerateRequest) -> Result<Option<String>> {
        let config = self.router.config_for_task(request.task);
        let mut backoff = config.retry_backoff;
        let mut attempt = 0;

        loop {
            debug!(
                task = request.task.as_str(),
                attempt,
                backend = self.ai.backend_name(),
                "Calling model"
            );

            let result = match tokio::time::timeout(config.timeout, self.ai.generate(&request)).await
            {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(config.timeout)),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < config.max_retries => {
                    attempt += 1;
                    warn!(
                        task = request.task.as_str(),
                        attempt,
                        error = %e,
                        "Model call failed, retrying"
                    );
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                    backoff = backoff.saturating_mul(2);
                }
                other => return other,
            }
        }
    }
}

/// The `n` most recent transactions, newest first; equal dates keep input order
fn most_recent(transactions: &[Transaction], n: usize) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(n);
    sorted
}

/// Drop a `data:<mime>;base64,` prefix if present
pub fn strip_data_url(image_data: &str) -> &str {
    let trimmed = image_data.trim();
    match trimmed.split_once(',') {
        Some((head, payload)) if head.starts_with("data:") => payload.trim(),
        _ => trimmed,
    }
}

/// Canonical padded base64 for a payload that may contain whitespace or lack
/// padding
fn normalize_base64(payload: &str) -> std::result::Result<String, &'static str> {
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err("is empty");
    }
    let bytes = LENIENT_BASE64
        .decode(&compact)
        .map_err(|_| "is not valid base64")?;
    if bytes.is_empty() {
        return Err("is empty");
    }
    Ok(STANDARD.encode(bytes))
}

fn require_text(text: Option<String>) -> Result<String> {
    text.ok_or_else(|| Error::InvalidData("model returned no text".into()))
}

fn text_reply(task: TaskType, result: Result<Option<String>>) -> InsightReply {
    match result {
        Ok(Some(text)) if !text.trim().is_empty() => InsightReply::generated(text.trim()),
        Ok(_) => {
            debug!(task = task.as_str(), "Model returned no text");
            InsightReply::empty_reply()
        }
        Err(e) => {
            warn!(task = task.as_str(), error = %e, "Model call failed");
            InsightReply::unavailable()
        }
    }
}

fn absorb<T>(task: TaskType, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(task = task.as_str(), error = %preview(&e.to_string()), "Discarding model answer");
            None
        }
    }
}

/// Schema for [`FinancialForecast`]
pub fn forecast_schema() -> ResponseSchema {
    ResponseSchema::object()
        .required("predictedBalance", ResponseSchema::number())
        .optional("confidenceScore", ResponseSchema::number())
        .required(
            "riskLevel",
            ResponseSchema::string().one_of(&["LOW", "MEDIUM", "HIGH"]),
        )
        .required("explanation", ResponseSchema::string())
}

/// Schema for [`ReceiptExtraction`]
pub fn receipt_schema() -> ResponseSchema {
    ResponseSchema::object()
        .required("amount", ResponseSchema::number())
        .required("date", ResponseSchema::string())
        .required("description", ResponseSchema::string())
        .optional("categorySuggestion", ResponseSchema::string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use serde_json::Value;

    use super::*;
    use crate::ai::{ContentPart, MockBackend, MockReply};
    use crate::insights::types::{InsightOutcome, EMPTY_REPLY_MESSAGE, UNAVAILABLE_MESSAGE};
    use crate::model_router::{RouterConfig, TaskConfig};
    use crate::models::{RiskLevel, TransactionType};

    fn service_with(mock: &MockBackend) -> InsightService {
        service_with_policy(mock, Duration::from_secs(5), 1)
    }

    fn service_with_policy(
        mock: &MockBackend,
        timeout: Duration,
        max_retries: u32,
    ) -> InsightService {
        let config = RouterConfig {
            defaults: TaskConfig {
                model: None,
                temperature: Some(0.4),
                timeout,
                max_retries,
                retry_backoff: Duration::ZERO,
            },
            tasks: HashMap::new(),
        };
        InsightService::new(
            AIClient::Mock(mock.clone()),
            ModelRouter::with_config(config),
            PromptLibrary::embedded_only(),
        )
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(n as u64)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::signed(day(0), 5000.0, "Vendas", "Cliente A"),
            Transaction::signed(day(4), -1500.0, "Aluguel", "Escritório"),
            Transaction::signed(day(9), -300.0, "Serviços", "Internet"),
        ]
    }

    /// The JSON array embedded in the request's user text
    fn embedded_array(request: &GenerateRequest) -> Vec<Value> {
        let text = request.text_prompt();
        let start = text.find('[').unwrap();
        let end = text.rfind(']').unwrap();
        serde_json::from_str(&text[start..=end]).unwrap()
    }

    #[tokio::test]
    async fn test_insights_empty_input_makes_no_call() {
        let mock = MockBackend::new();
        let reply = service_with(&mock).get_insights(&[]).await;
        assert_eq!(reply.outcome, InsightOutcome::NoInput);
        assert_eq!(reply.text, NO_TRANSACTIONS_MESSAGE);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_insights_sends_thirty_most_recent() {
        // Interleave old and new so input order differs from date order
        let mut transactions: Vec<Transaction> = (0..40)
            .map(|i| Transaction::signed(day(i), i as f64, "Cat", format!("tx {}", i)))
            .collect();
        transactions.reverse();
        transactions.swap(0, 25);

        let mock = MockBackend::with_replies([MockReply::text("1. Corte custos")]);
        let reply = service_with(&mock).get_insights(&transactions).await;
        assert_eq!(reply, InsightReply::generated("1. Corte custos"));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let sent = embedded_array(&requests[0]);
        assert_eq!(sent.len(), RECENT_WINDOW);
        assert_eq!(sent[0]["amount"], 39.0);
        assert_eq!(sent[29]["amount"], 10.0);
        assert!(sent.iter().all(|t| t["amount"].as_f64().unwrap() >= 10.0));

        // Projection: no dates, explicit type
        let first = sent[0].as_object().unwrap();
        assert!(!first.contains_key("date"));
        assert_eq!(first["type"], "INCOME");
        assert_eq!(first["category"], "Cat");
    }

    #[tokio::test]
    async fn test_insights_request_shape() {
        let mock = MockBackend::new();
        service_with(&mock).get_insights(&sample()).await;

        let request = &mock.requests()[0];
        assert_eq!(request.task, TaskType::Insights);
        assert_eq!(request.temperature, Some(0.4));
        assert!(request.system.as_deref().unwrap().contains("CFO"));
        assert!(request.response_schema.is_none());
        // Data goes in the user text, never in the system instruction
        assert!(!request.system.as_deref().unwrap().contains("Aluguel"));
        assert!(request.text_prompt().contains("Aluguel"));
    }

    #[tokio::test]
    async fn test_ties_keep_input_order() {
        let transactions = vec![
            Transaction::signed(day(1), 1.0, "A", "first"),
            Transaction::signed(day(1), 2.0, "B", "second"),
            Transaction::signed(day(2), 3.0, "C", "newest"),
        ];
        let recent = most_recent(&transactions, 30);
        let descriptions: Vec<&str> = recent.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, ["newest", "first", "second"]);
    }

    #[tokio::test]
    async fn test_insights_empty_reply() {
        let mock = MockBackend::with_replies([MockReply::Empty]);
        let reply = service_with(&mock).get_insights(&sample()).await;
        assert_eq!(reply.outcome, InsightOutcome::EmptyReply);
        assert_eq!(reply.text, EMPTY_REPLY_MESSAGE);

        let mock = MockBackend::with_replies([MockReply::text("   \n")]);
        let reply = service_with(&mock).get_insights(&sample()).await;
        assert_eq!(reply.outcome, InsightOutcome::EmptyReply);
    }

    #[tokio::test]
    async fn test_insights_never_fails() {
        let mock = MockBackend::with_replies([
            MockReply::Fail { status: 500 },
            MockReply::Fail { status: 500 },
        ]);
        let reply = service_with(&mock).get_insights(&sample()).await;
        assert_eq!(reply.outcome, InsightOutcome::Unavailable);
        assert_eq!(reply.text, UNAVAILABLE_MESSAGE);
        assert_eq!(mock.call_count(), 2);

        let mock = MockBackend::with_replies([MockReply::Fail { status: 401 }]);
        let reply = service_with(&mock).get_insights(&sample()).await;
        assert_eq!(reply.outcome, InsightOutcome::Unavailable);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_retried_once() {
        let mock = MockBackend::with_replies([
            MockReply::Hang(Duration::from_secs(10)),
            MockReply::text("depois do retry"),
        ]);
        let service = service_with_policy(&mock, Duration::from_millis(50), 1);
        let reply = service.get_insights(&sample()).await;
        assert_eq!(reply, InsightReply::generated("depois do retry"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_timeout_without_retries_is_unavailable() {
        let mock = MockBackend::with_replies([MockReply::Hang(Duration::from_secs(10))]);
        let service = service_with_policy(&mock, Duration::from_millis(50), 0);
        let reply = service.get_insights(&sample()).await;
        assert_eq!(reply.outcome, InsightOutcome::Unavailable);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_forecast_needs_three_transactions() {
        let mock = MockBackend::new();
        let service = service_with(&mock);

        assert!(service.get_forecast(&[]).await.is_none());
        assert!(service.get_forecast(&sample()[..2]).await.is_none());
        assert_eq!(mock.call_count(), 0);

        assert!(service.get_forecast(&sample()).await.is_some());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_forecast_passes_result_through() {
        let mock = MockBackend::with_replies([MockReply::text(
            r#"{"predictedBalance":6200,"riskLevel":"LOW","explanation":"stable trend"}"#,
        )]);
        let forecast = service_with(&mock).get_forecast(&sample()).await.unwrap();
        assert_eq!(forecast.predicted_balance, 6200.0);
        assert_eq!(forecast.risk_level, RiskLevel::Low);
        assert_eq!(forecast.explanation, "stable trend");
        assert!(forecast.confidence_score.is_none());

        let request = &mock.requests()[0];
        let schema = request.response_schema.as_ref().unwrap();
        assert_eq!(schema, &forecast_schema());
        let history = embedded_array(request);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0]["date"], "2024-01-01");
        assert_eq!(history[1]["type"], "EXPENSE");
        assert!(history[0].get("category").is_none());
    }

    #[tokio::test]
    async fn test_forecast_sends_full_history() {
        let transactions: Vec<Transaction> = (0..45)
            .map(|i| Transaction::signed(day(i), -(i as f64), "Cat", "x"))
            .collect();
        let mock = MockBackend::new();
        service_with(&mock).get_forecast(&transactions).await;
        assert_eq!(embedded_array(&mock.requests()[0]).len(), 45);
    }

    #[tokio::test]
    async fn test_forecast_invalid_answers_are_none() {
        for body in [
            r#"{"riskLevel":"LOW","explanation":"x"}"#,
            r#"{"predictedBalance":1,"explanation":"x"}"#,
            r#"{"predictedBalance":1,"riskLevel":"SEVERE","explanation":"x"}"#,
            "not json at all",
        ] {
            let mock = MockBackend::with_replies([MockReply::text(body)]);
            assert!(
                service_with(&mock).get_forecast(&sample()).await.is_none(),
                "accepted {}",
                body
            );
            // Parse failures are final
            assert_eq!(mock.call_count(), 1);
        }

        let mock = MockBackend::with_replies([MockReply::Empty]);
        assert!(service_with(&mock).get_forecast(&sample()).await.is_none());

        let mock = MockBackend::with_replies([
            MockReply::Fail { status: 503 },
            MockReply::Fail { status: 503 },
        ]);
        assert!(service_with(&mock).get_forecast(&sample()).await.is_none());
    }

    #[tokio::test]
    async fn test_receipt_strips_data_url_prefix() {
        let mock = MockBackend::with_replies([MockReply::text(
            r#"{"amount":87.3,"date":"2024-02-10","description":"Supermercado Dia","category_suggestion":"Alimentação"}"#,
        )]);
        let extraction = service_with(&mock)
            .analyze_receipt("data:image/png;base64,iVBORw0KGgo=")
            .await
            .unwrap();
        assert_eq!(extraction.amount, 87.3);
        assert_eq!(extraction.category_suggestion.as_deref(), Some("Alimentação"));

        let request = &mock.requests()[0];
        let image = request.images().next().unwrap();
        assert_eq!(image.data, "iVBORw0KGgo=");
        assert_eq!(image.mime_type, "image/jpeg");
        // Image first, then the instruction
        assert!(matches!(request.parts[0], ContentPart::Image(_)));
        assert!(matches!(request.parts[1], ContentPart::Text(_)));
        assert_eq!(request.response_schema.as_ref(), Some(&receipt_schema()));
    }

    #[tokio::test]
    async fn test_receipt_bad_payload_makes_no_call() {
        let mock = MockBackend::new();
        let service = service_with(&mock);
        assert!(service.analyze_receipt("").await.is_none());
        assert!(service.analyze_receipt("data:image/jpeg;base64,").await.is_none());
        assert!(service.analyze_receipt("not base64 !!").await.is_none());
        assert!(service.analyze_receipt_bytes(&[]).await.is_none());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_receipt_accepts_wrapped_and_unpadded_base64() {
        let mock = MockBackend::new();
        let service = service_with(&mock);

        assert!(service
            .analyze_receipt("data:image/jpeg;base64,QUJD\nREVG")
            .await
            .is_some());
        assert!(service
            .analyze_receipt("data:image/jpeg;base64,QUJDRA")
            .await
            .is_some());
        assert!(service.analyze_receipt("QUJD\r\n  REVG\n").await.is_some());

        // Forwarded as canonical padded base64
        let sent: Vec<String> = mock
            .requests()
            .iter()
            .map(|r| r.images().next().unwrap().data.clone())
            .collect();
        assert_eq!(sent, vec!["QUJDREVG", "QUJDRA==", "QUJDREVG"]);
    }

    #[tokio::test]
    async fn test_receipt_requires_fields() {
        for body in [
            r#"{"date":"2024-02-10","description":"x"}"#,
            r#"{"amount":1,"description":"x"}"#,
            r#"{"amount":1,"date":"2024-02-10"}"#,
        ] {
            let mock = MockBackend::with_replies([MockReply::text(body)]);
            assert!(service_with(&mock).analyze_receipt("QUJD").await.is_none());
        }
    }

    #[tokio::test]
    async fn test_receipt_bytes_are_encoded() {
        let mock = MockBackend::new();
        let extraction = service_with(&mock).analyze_receipt_bytes(b"ABC").await;
        assert!(extraction.is_some());
        assert_eq!(mock.requests()[0].images().next().unwrap().data, "QUJD");
    }

    #[tokio::test]
    async fn test_advisor_question() {
        let mock = MockBackend::with_replies([MockReply::text("Reduza o aluguel.")]);
        let service = service_with(&mock);

        let blank = service.ask_advisor(&sample(), "   ").await;
        assert_eq!(blank.outcome, InsightOutcome::NoInput);
        assert_eq!(blank.text, NO_QUESTION_MESSAGE);
        assert_eq!(mock.call_count(), 0);

        let reply = service
            .ask_advisor(&sample(), "Como posso reduzir gastos?")
            .await;
        assert_eq!(reply, InsightReply::generated("Reduza o aluguel."));

        let request = &mock.requests()[0];
        assert_eq!(request.task, TaskType::Advisor);
        assert!(request.text_prompt().contains("Como posso reduzir gastos?"));
        let context = embedded_array(request);
        assert_eq!(context[0]["date"], "2024-01-10");
        assert_eq!(context[0]["description"], "Internet");
    }

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url("  AAAA  "), "AAAA");
        assert_eq!(strip_data_url("data:image/jpeg;base64,"), "");
    }

    #[test]
    fn test_explicit_type_reaches_projection() {
        let tx = Transaction::new(day(0), 1500.0, TransactionType::Expense, "Aluguel", "");
        let json = serde_json::to_value(InsightSummary::from(&tx)).unwrap();
        assert_eq!(json["type"], "EXPENSE");
    }
}
