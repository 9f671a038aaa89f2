use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::InsightError;

/// The one outbound call: prompt text in, raw model text out.
pub trait InsightClient: Send + Sync {
    fn request_insights(&self, prompt: &str) -> Result<String, InsightError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// First candidate's first text part, or a format error.
fn extract_text(body: &str) -> Result<String, InsightError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|_| InsightError::UnexpectedResponse)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(InsightError::UnexpectedResponse)
}

/// Message to classify for a non-success response.
fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| "Failed to generate insights".to_string())
}

/// The request URL carries the key, so it is stripped before the error is
/// shown or logged.
fn transport_error(e: reqwest::Error) -> InsightError {
    InsightError::from_remote_message(e.without_url().to_string())
}

/// Gemini `generateContent` over a blocking HTTP client. Call it from a
/// worker thread.
pub struct GeminiClient {
    config: Config,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl InsightClient for GeminiClient {
    fn request_insights(&self, prompt: &str) -> Result<String, InsightError> {
        let key = self.config.validated_api_key()?;

        let body = GenerateRequest {
            contents: [Content { parts: [Part { text: prompt }] }],
            generation_config: GenerationConfig::default(),
        };
        tracing::debug!("Requesting insights from {} ({} prompt chars)", self.config.model, prompt.len());

        let response = self
            .http
            .post(self.config.generate_url())
            .query(&[("key", key.expose())])
            .json(&body)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let text = response
            .text()
            .map_err(transport_error)?;

        if !status.is_success() {
            let message = remote_error_message(&text);
            tracing::error!("Insight request failed with {status}: {message}");
            return Err(InsightError::from_remote_message(message));
        }

        extract_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;

    #[test]
    fn transport_errors_do_not_reveal_the_key() {
        let secret = "AIzaSECRETtransportKey123456";
        let client = GeminiClient::new(Config {
            api_key: Some(ApiKey::new(secret)),
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        });
        let err = client.request_insights("hello").unwrap_err();
        let text = err.to_string();
        assert!(!text.contains(secret), "{text}");
        assert!(!format!("{err:?}").contains(secret));
    }

    #[test]
    fn request_body_matches_generate_content_shape() {
        let body = GenerateRequest {
            contents: [Content { parts: [Part { text: "hi" }] }],
            generation_config: GenerationConfig::default(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn text_is_read_from_first_candidate() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"1. **Up**"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "1. **Up**");
    }

    #[test]
    fn missing_text_is_a_format_error() {
        for body in [r#"{}"#, r#"{"candidates":[]}"#, r#"{"candidates":[{"content":{"parts":[]}}]}"#, "not json"] {
            assert_eq!(extract_text(body), Err(InsightError::UnexpectedResponse), "{body}");
        }
        assert_eq!(
            InsightError::UnexpectedResponse.to_string(),
            "Failed to generate insights: Unexpected API response format"
        );
    }

    #[test]
    fn remote_errors_are_classified() {
        let quota = r#"{"error":{"code":429,"message":"You exceeded your current quota"}}"#;
        assert_eq!(
            InsightError::from_remote_message(remote_error_message(quota)),
            InsightError::QuotaExceeded
        );
        let key = r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#;
        assert!(InsightError::from_remote_message(remote_error_message(key))
            .to_string()
            .starts_with("Authentication failed: "));
        assert_eq!(remote_error_message("<html>"), "Failed to generate insights");
    }

    #[test]
    fn credential_is_checked_before_any_request() {
        let client = GeminiClient::new(Config {
            api_key: Some(ApiKey::new("short")),
            // Unroutable; the request must never be attempted.
            endpoint: "http://127.0.0.1:9".into(),
            ..Config::default()
        });
        let err = client.request_insights("prompt").unwrap_err();
        assert!(err.to_string().starts_with("Authentication failed: API key appears to be invalid"));
    }
}
