//! Vision client with ordered model fallback.
//!
//! Model replies are treated as untrusted text: fencing markup is stripped,
//! the JSON contract is enforced field by field, and the record id and
//! timestamp are always generated here, never taken from the reply.

use chrono::Utc;
use regen_core::{RegenError, Result, ScanRecord};
use serde::Deserialize;
use std::sync::Arc;

use crate::image::ImageRef;
use crate::transport::{ContentPart, ModelTransport};

/// Model ids tried in priority order when none are configured explicitly.
pub const DEFAULT_MODEL_PRIORITY: &[&str] = &["gemini-2.5-flash", "gemini-2.5-pro"];

const ANALYSIS_PROMPT: &str = r#"Analyze the item in this image and provide a JSON response with this structure:
{
  "itemName": "The common name of the main item",
  "disposalMethod": "Concise disposal method (Recycle, Trash, Compost, E-Waste, etc.)",
  "alternative": "A sustainable alternative to this item",
  "upcyclingIdea": "A creative reuse or upcycle idea",
  "ecoTip": "A short eco-friendly tip related to this item",
  "ecoPoints": 10
}
If you cannot identify the item, return: { "error": "Item not recognized" }"#;

const CONNECTIVITY_PROMPT: &str = "Reply only with: success";

/// Client that analyzes item images against a ranked list of vision models.
///
/// Candidates are tried strictly sequentially; a later candidate is never
/// started before an earlier one has definitively failed, so a metered API
/// is never billed for speculative parallel requests.
pub struct VisionClient {
    transport: Arc<dyn ModelTransport>,
    models: Vec<String>,
}

impl VisionClient {
    /// Creates a client over `transport` with the default model priority.
    pub fn new(transport: Arc<dyn ModelTransport>) -> Self {
        Self {
            transport,
            models: DEFAULT_MODEL_PRIORITY.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Replaces the model priority list.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Analyzes the item in `image`, trying models in priority order until
    /// one returns a reply satisfying the JSON contract.
    ///
    /// # Errors
    ///
    /// Returns [`RegenError::AnalysisUnavailable`] carrying the last
    /// candidate's cause once every candidate has failed. A partially valid
    /// record is never returned.
    pub async fn analyze_item(&self, image: &ImageRef) -> Result<ScanRecord> {
        let image_part = image.to_part().await?;
        let parts = [ContentPart::Text(ANALYSIS_PROMPT.to_string()), image_part];

        let mut last_error: Option<RegenError> = None;
        for model in &self.models {
            match self.try_analyze(model, &parts).await {
                Ok(record) => return Ok(record),
                Err(err) => {
                    tracing::warn!(model = %model, error = %err, "Model candidate failed");
                    last_error = Some(err);
                }
            }
        }

        Err(RegenError::analysis_unavailable(
            last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| "no model candidates configured".to_string()),
        ))
    }

    /// Health probe: sends a minimal prompt through the same fallback loop
    /// and returns the confirmation text of the first model that answers.
    ///
    /// # Errors
    ///
    /// Returns [`RegenError::Connectivity`] if every candidate fails.
    pub async fn check_connectivity(&self) -> Result<String> {
        let parts = [ContentPart::Text(CONNECTIVITY_PROMPT.to_string())];

        let mut last_error: Option<RegenError> = None;
        for model in &self.models {
            match self.transport.generate(model, &parts).await {
                Ok(text) => return Ok(text.trim().to_string()),
                Err(err) => {
                    tracing::warn!(model = %model, error = %err, "Connectivity probe failed");
                    last_error = Some(err);
                }
            }
        }

        Err(RegenError::connectivity(
            last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| "no model candidates configured".to_string()),
        ))
    }

    async fn try_analyze(&self, model: &str, parts: &[ContentPart]) -> Result<ScanRecord> {
        let text = self.transport.generate(model, parts).await?;
        let fields = parse_analysis(model, &text)?;

        // Stamp id and timestamp here, overriding anything the model emitted.
        let now = Utc::now();
        Ok(ScanRecord {
            id: ScanRecord::id_for(now),
            timestamp: now,
            item_name: fields.item_name,
            disposal_method: fields.disposal_method,
            alternative: fields.alternative,
            upcycling_idea: fields.upcycling_idea,
            eco_tip: fields.eco_tip,
            eco_points: fields.eco_points,
        })
    }
}

/// Analysis fields as the model must emit them. Hallucinated extras such as
/// `id` or `timestamp` are ignored; a missing field fails deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisFields {
    item_name: String,
    disposal_method: String,
    alternative: String,
    upcycling_idea: String,
    eco_tip: String,
    eco_points: u32,
}

/// Strips known code-fence tokens and surrounding whitespace.
///
/// Models routinely wrap JSON in ```json fences; the contract is enforced
/// on the stripped text.
fn normalize_response(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn parse_analysis(model: &str, text: &str) -> Result<AnalysisFields> {
    let cleaned = normalize_response(text);

    let value: serde_json::Value = serde_json::from_str(&cleaned).map_err(|err| {
        RegenError::model_unavailable(model, format!("response is not valid JSON: {err}"))
    })?;

    // An explicit error field is a candidate failure even though it parses.
    if let Some(reported) = value.get("error") {
        let reason = reported.as_str().unwrap_or("unrecognized item");
        return Err(RegenError::model_unavailable(
            model,
            format!("model reported an error: {reason}"),
        ));
    }

    serde_json::from_value(value).map_err(|err| {
        RegenError::model_unavailable(model, format!("response violates the contract: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const VALID_REPLY: &str = r#"{"itemName":"Plastic Bottle","disposalMethod":"Recycle","alternative":"Reusable bottle","upcyclingIdea":"Planter","ecoTip":"Rinse before recycling","ecoPoints":10}"#;

    /// Transport that replays a scripted sequence of results and records
    /// which model each request targeted.
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelTransport for ScriptedTransport {
        async fn generate(&self, model: &str, _parts: &[ContentPart]) -> Result<String> {
            self.calls.lock().unwrap().push(model.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(RegenError::model_unavailable(model, "script exhausted")))
        }
    }

    fn client_with(replies: Vec<Result<String>>) -> (Arc<ScriptedTransport>, VisionClient) {
        let transport = Arc::new(ScriptedTransport::new(replies));
        let client = VisionClient::new(transport.clone());
        (transport, client)
    }

    fn sample_image() -> ImageRef {
        ImageRef::bytes(vec![1, 2, 3], "image/jpeg")
    }

    #[tokio::test]
    async fn test_first_candidate_success_stops_fallback() {
        let (transport, client) = client_with(vec![Ok(VALID_REPLY.to_string())]);

        let record = client.analyze_item(&sample_image()).await.unwrap();
        assert_eq!(record.item_name, "Plastic Bottle");
        assert_eq!(record.eco_points, 10);
        assert_eq!(transport.calls(), vec!["gemini-2.5-flash"]);
    }

    #[tokio::test]
    async fn test_fallback_tries_candidates_in_priority_order() {
        let (transport, client) = client_with(vec![
            Err(RegenError::model_unavailable("gemini-2.5-flash", "503")),
            Ok(VALID_REPLY.to_string()),
        ]);
        let client = client.with_models(vec![
            "model-a".to_string(),
            "model-b".to_string(),
            "model-c".to_string(),
        ]);

        client.analyze_item(&sample_image()).await.unwrap();
        // exactly two attempts, in order, candidate c never started
        assert_eq!(transport.calls(), vec!["model-a", "model-b"]);
    }

    #[tokio::test]
    async fn test_all_candidates_failing_is_analysis_unavailable() {
        let (transport, client) = client_with(vec![
            Err(RegenError::model_unavailable("gemini-2.5-flash", "network down")),
            Err(RegenError::model_unavailable("gemini-2.5-pro", "quota exceeded")),
        ]);

        let err = client.analyze_item(&sample_image()).await.unwrap_err();
        match err {
            RegenError::AnalysisUnavailable { message } => {
                // the last candidate's cause is carried for diagnostics
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fenced_reply_parses_like_unfenced() {
        let fenced = format!("```json\n{VALID_REPLY}\n```");
        let (_, client) = client_with(vec![Ok(fenced)]);

        let record = client.analyze_item(&sample_image()).await.unwrap();
        assert_eq!(record.disposal_method, "Recycle");
        assert_eq!(record.upcycling_idea, "Planter");
    }

    #[tokio::test]
    async fn test_error_field_is_candidate_failure() {
        let (transport, client) = client_with(vec![
            Ok(r#"{"error": "Item not recognized"}"#.to_string()),
            Ok(VALID_REPLY.to_string()),
        ]);

        let record = client.analyze_item(&sample_image()).await.unwrap();
        assert_eq!(record.item_name, "Plastic Bottle");
        // the error reply consumed the first candidate
        assert_eq!(transport.calls(), vec!["gemini-2.5-flash", "gemini-2.5-pro"]);
    }

    #[tokio::test]
    async fn test_missing_field_is_candidate_failure() {
        let incomplete = r#"{"itemName":"Bottle","disposalMethod":"Recycle","ecoPoints":5}"#;
        let (_, client) = client_with(vec![
            Ok(incomplete.to_string()),
            Err(RegenError::model_unavailable("gemini-2.5-pro", "down")),
        ]);

        let err = client.analyze_item(&sample_image()).await.unwrap_err();
        assert!(err.is_analysis_unavailable());
    }

    #[tokio::test]
    async fn test_id_and_timestamp_are_generated_not_echoed() {
        let reply_with_hallucinated_metadata = r#"{
            "id": "scan_1",
            "timestamp": "1999-01-01T00:00:00Z",
            "itemName": "Can",
            "disposalMethod": "Recycle",
            "alternative": "Glass jar",
            "upcyclingIdea": "Pen holder",
            "ecoTip": "Crush to save space",
            "ecoPoints": 5
        }"#;
        let (_, client) = client_with(vec![Ok(reply_with_hallucinated_metadata.to_string())]);

        let before = Utc::now();
        let record = client.analyze_item(&sample_image()).await.unwrap();

        assert_ne!(record.id, "scan_1");
        assert!(record.id.starts_with("scan_"));
        assert!(record.timestamp >= before);
        assert_eq!(record.id, ScanRecord::id_for(record.timestamp));
    }

    #[tokio::test]
    async fn test_end_to_end_malformed_then_valid() {
        // Priority [A, B]: A replies with malformed JSON, B with the valid
        // contract. Exactly two network attempts must be made.
        let (transport, client) = client_with(vec![
            Ok("I think this is a bottle! Here you go: itemName=...".to_string()),
            Ok(VALID_REPLY.to_string()),
        ]);
        let client = client.with_models(vec!["A".to_string(), "B".to_string()]);

        let record = client.analyze_item(&sample_image()).await.unwrap();
        assert_eq!(record.item_name, "Plastic Bottle");
        assert_eq!(record.eco_points, 10);
        assert!(record.id.starts_with("scan_"));
        assert_eq!(transport.calls(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_connectivity_probe_success() {
        let (transport, client) = client_with(vec![Ok(" success \n".to_string())]);

        let reply = client.check_connectivity().await.unwrap();
        assert_eq!(reply, "success");
        assert_eq!(transport.calls(), vec!["gemini-2.5-flash"]);
    }

    #[tokio::test]
    async fn test_connectivity_probe_exhaustion() {
        let (transport, client) = client_with(vec![
            Err(RegenError::model_unavailable("gemini-2.5-flash", "down")),
            Err(RegenError::model_unavailable("gemini-2.5-pro", "down")),
        ]);

        let err = client.check_connectivity().await.unwrap_err();
        assert!(matches!(err, RegenError::Connectivity(_)));
        assert_eq!(transport.calls().len(), 2);
    }

    #[test]
    fn test_normalize_strips_fences_and_whitespace() {
        assert_eq!(normalize_response("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(normalize_response("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(normalize_response("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_parse_analysis_rejects_prose() {
        let err = parse_analysis("m", "Sure! The item is a bottle.").unwrap_err();
        assert!(matches!(err, RegenError::ModelUnavailable { .. }));
    }
}
