//! Gemini adapter. Implements AnalysisPort and AdvisorPort over the
//! `generateContent` REST endpoint.
//!
//! One request per call. No retry, no backoff, and no client-side timeout:
//! the transport's defaults apply.

use crate::adapters::ai::payload::parse_analysis;
use crate::adapters::ai::prompts::{
    ADVISOR_PERSONA, EMPTY_REPLY_FALLBACK, FAILURE_REPLY_FALLBACK, analysis_prompt,
    analysis_schema,
};
use crate::domain::{Device, DeviceAnalysis, DomainError};
use crate::ports::{AdvisorPort, AnalysisPort};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Gemini API adapter.
///
/// `api_url` is the service base (e.g. "https://generativelanguage.googleapis.com");
/// the model path is appended per request.
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiAdapter {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Send one request and return the concatenated text of the first candidate.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, DomainError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::Ai(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Gemini API returned error");
            return Err(DomainError::Ai(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Ai(format!("Failed to parse API response: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        debug!(raw_len = text.len(), "received Gemini response");
        Ok(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[async_trait::async_trait]
impl AnalysisPort for GeminiAdapter {
    async fn analyze_device(&self, device: &Device) -> Result<DeviceAnalysis, DomainError> {
        info!(
            device_id = %device.id,
            name = %device.name,
            model = %self.model,
            "requesting device analysis"
        );

        let current_year = chrono::Local::now().year();
        let request = GenerateRequest {
            contents: vec![Content::text(
                Some("user"),
                &analysis_prompt(device, current_year),
            )],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: analysis_schema(),
            }),
        };

        let raw = self.generate(&request).await?;
        if raw.trim().is_empty() {
            return Err(DomainError::Ai("empty analysis response".to_string()));
        }
        let analysis = parse_analysis(&raw)?;

        info!(
            device_id = %device.id,
            score = analysis.sustainability_score,
            recommendation = %analysis.recommendation,
            "device analysis complete"
        );
        Ok(analysis)
    }
}

#[async_trait::async_trait]
impl AdvisorPort for GeminiAdapter {
    async fn quick_advice(&self, query: &str) -> String {
        let request = GenerateRequest {
            contents: vec![Content::text(Some("user"), query)],
            system_instruction: Some(Content::text(None, ADVISOR_PERSONA)),
            generation_config: None,
        };

        match self.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_REPLY_FALLBACK.to_string(),
            Err(e) => {
                warn!(error = %e, "advisory chat request failed");
                FAILURE_REPLY_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Recommendation, seed_devices};
    use mockito::{Matcher, Server};
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-test:generateContent";

    fn adapter(server: &Server) -> GeminiAdapter {
        GeminiAdapter::new(
            server.url(),
            "test-key".to_string(),
            "gemini-test".to_string(),
        )
    }

    fn reply_with_text(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    const ANALYSIS_JSON: &str = r#"{"sustainabilityScore": 38, "recommendation": "Repair", "lifecycleStage": "End-of-life", "breakdown": {"recyclable": ["Aluminium chassis"], "hazardous": ["Lithium-ion battery"], "repairable": ["Keyboard"]}, "indiaSpecificSteps": ["Book a technician via Urban Company"], "educationalInsight": "Aluminium is endlessly recyclable."}"#;

    #[tokio::test]
    async fn test_analyze_device_sends_schema_and_parses_reply() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "required": [
                        "sustainabilityScore",
                        "recommendation",
                        "lifecycleStage",
                        "breakdown",
                        "indiaSpecificSteps",
                        "educationalInsight"
                    ] }
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply_with_text(ANALYSIS_JSON))
            .create_async()
            .await;

        let device = &seed_devices()[1];
        let analysis = adapter(&server).analyze_device(device).await.unwrap();

        assert_eq!(analysis.sustainability_score, 38);
        assert_eq!(analysis.recommendation, Recommendation::Repair);
        assert_eq!(analysis.breakdown.hazardous, vec!["Lithium-ion battery"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_device_accepts_fenced_json() {
        let mut server = Server::new_async().await;
        let fenced = format!("```json\n{}\n```", ANALYSIS_JSON);
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(reply_with_text(&fenced))
            .create_async()
            .await;

        let analysis = adapter(&server)
            .analyze_device(&seed_devices()[0])
            .await
            .unwrap();
        assert_eq!(analysis.lifecycle_stage, "End-of-life");
    }

    #[tokio::test]
    async fn test_analyze_device_rejects_out_of_range_score() {
        let mut server = Server::new_async().await;
        let payload = ANALYSIS_JSON.replace("38", "250");
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(reply_with_text(&payload))
            .create_async()
            .await;

        let result = adapter(&server).analyze_device(&seed_devices()[0]).await;
        assert!(matches!(result, Err(DomainError::InvalidAnalysis(_))));
    }

    #[tokio::test]
    async fn test_analyze_device_http_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let result = adapter(&server).analyze_device(&seed_devices()[0]).await;
        assert!(matches!(result, Err(DomainError::Ai(_))));
    }

    #[tokio::test]
    async fn test_analyze_device_empty_candidates() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let result = adapter(&server).analyze_device(&seed_devices()[0]).await;
        assert!(matches!(result, Err(DomainError::Ai(_))));
    }

    #[tokio::test]
    async fn test_quick_advice_sends_persona() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Where do I drop batteries?" }] }],
                "systemInstruction": { "parts": [{ "text": ADVISOR_PERSONA }] }
            })))
            .with_status(200)
            .with_body(reply_with_text("Use a CPCB-authorized collection point ♻️"))
            .create_async()
            .await;

        let reply = adapter(&server)
            .quick_advice("Where do I drop batteries?")
            .await;
        assert_eq!(reply, "Use a CPCB-authorized collection point ♻️");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_quick_advice_keeps_reply_verbatim() {
        let mut server = Server::new_async().await;
        let text = "1. Back up your data\n2. Visit Cashify\n";
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(reply_with_text(text))
            .create_async()
            .await;

        assert_eq!(adapter(&server).quick_advice("Sell my phone?").await, text);
    }

    #[tokio::test]
    async fn test_quick_advice_empty_reply_falls_back() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates": [{"content": {"parts": []}}]}"#)
            .create_async()
            .await;

        let reply = adapter(&server).quick_advice("hello").await;
        assert_eq!(reply, EMPTY_REPLY_FALLBACK);
    }

    #[tokio::test]
    async fn test_quick_advice_failure_is_absorbed() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(503)
            .create_async()
            .await;

        let reply = adapter(&server).quick_advice("hello").await;
        assert_eq!(reply, FAILURE_REPLY_FALLBACK);
    }
}
