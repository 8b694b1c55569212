//! GeminiTransport - Direct REST API implementation for Gemini.
//!
//! Calls the Gemini `generateContent` endpoint directly. The model id is
//! supplied per request so the fallback loop can reuse one transport across
//! the whole priority list.

use async_trait::async_trait;
use regen_core::{RegenError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::transport::{ContentPart, ModelTransport};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Transport that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiTransport {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiTransport {
    /// Creates a new transport with the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL (local emulators, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_request(&self, model: &str, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = model,
            api_key = self.api_key
        );

        let response = self.client.post(url).json(body).send().await.map_err(|err| {
            RegenError::model_unavailable(model, format!("request failed: {err}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(model, status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            RegenError::model_unavailable(model, format!("failed to parse response body: {err}"))
        })?;

        extract_text_response(model, parsed)
    }
}

#[async_trait]
impl ModelTransport for GeminiTransport {
    async fn generate(&self, model: &str, parts: &[ContentPart]) -> Result<String> {
        if parts.is_empty() {
            return Err(RegenError::model_unavailable(
                model,
                "payload must include text or image parts",
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: parts.iter().map(Part::from).collect(),
            }],
        };
        self.send_request(model, &request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

impl From<&ContentPart> for Part {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Part::Text { text: text.clone() },
            ContentPart::InlineImage { mime_type, data } => Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(model: &str, response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            RegenError::model_unavailable(model, "response contained no text candidates")
        })
}

fn map_http_error(model: &str, status: StatusCode, body: String) -> RegenError {
    let detail = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    RegenError::model_unavailable(model, format!("HTTP {}: {}", status.as_u16(), detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_from_response() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "hello"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text_response("m", parsed).unwrap(), "hello");
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let err = extract_text_response("m", parsed).unwrap_err();
        assert!(matches!(err, RegenError::ModelUnavailable { .. }));
    }

    #[test]
    fn test_map_http_error_unwraps_error_body() {
        let body = r#"{"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error("m", StatusCode::TOO_MANY_REQUESTS, body.to_string());
        let text = err.to_string();
        assert!(text.contains("HTTP 429"));
        assert!(text.contains("RESOURCE_EXHAUSTED: quota"));
    }

    #[test]
    fn test_map_http_error_keeps_opaque_body() {
        let err = map_http_error("m", StatusCode::BAD_GATEWAY, "<html>bad</html>".to_string());
        assert!(err.to_string().contains("<html>bad</html>"));
    }

    #[test]
    fn test_part_serialization_shapes() {
        let text = Part::from(&ContentPart::Text("hi".into()));
        assert_eq!(serde_json::to_value(text).unwrap(), serde_json::json!({"text": "hi"}));

        let image = Part::from(&ContentPart::InlineImage {
            mime_type: "image/jpeg".into(),
            data: "QUJD".into(),
        });
        assert_eq!(
            serde_json::to_value(image).unwrap(),
            serde_json::json!({"inlineData": {"mimeType": "image/jpeg", "data": "QUJD"}})
        );
    }
}
