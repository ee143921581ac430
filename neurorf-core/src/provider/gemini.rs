//! Google Gemini provider implementation
//!
//! Talks to the `generateContent` REST endpoint. The API key travels as the
//! `key` query parameter; system messages become `system_instruction`.

use super::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = http_client(&config, 120)?;
        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_URL)
            .trim_end_matches('/')
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url(), model)
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        self.config.default_model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let model = request.model.as_deref().unwrap_or(self.default_model()).to_string();

        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::AuthenticationFailed)?;

        let mut system_parts = Vec::new();
        let mut contents = Vec::new();
        for msg in &request.messages {
            match msg.role {
                Role::System => system_parts.push(GeminiPart {
                    text: Some(msg.content.clone()),
                }),
                Role::User | Role::Assistant => contents.push(GeminiContent {
                    role: Some(if msg.role == Role::User { "user" } else { "model" }.into()),
                    parts: vec![GeminiPart {
                        text: Some(msg.content.clone()),
                    }],
                }),
            }
        }

        let mut generation_config = json!({});
        if let Some(temperature) = request.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        if request.json_mode {
            generation_config["responseMimeType"] = json!("application/json");
        }

        let api_request = GeminiRequest {
            contents,
            system_instruction: if system_parts.is_empty() {
                None
            } else {
                Some(GeminiContent {
                    role: None,
                    parts: system_parts,
                })
            },
            generation_config,
        };

        info!(
            provider = "gemini",
            model = model.as_str(),
            messages = request.messages.len(),
            json_mode = request.json_mode,
            "Sending request to Gemini"
        );

        let mut req = self
            .client
            .post(self.model_url(&model))
            .query(&[("key", api_key)])
            .json(&api_request);

        for (key, value) in &self.config.headers {
            req = req.header(key, value);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let retry = retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            debug!(status, body = text.as_str(), "Gemini returned an error status");
            return Err(status_error(status, retry, text));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let candidate = api_response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        let content: Option<String> = candidate.content.map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        });
        let content = content.filter(|c| !c.is_empty());

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => FinishReason::ContentFilter,
            _ => FinishReason::Unknown,
        };

        let usage = api_response
            .usage_metadata
            .map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        debug!(
            chars = content.as_ref().map(|c| c.len()).unwrap_or(0),
            ?finish_reason,
            total_tokens = usage.total_tokens,
            "Received response from Gemini"
        );

        Ok(CompletionResponse {
            id: api_response.response_id.unwrap_or_default(),
            model: api_response.model_version.unwrap_or(model),
            content,
            finish_reason,
            usage,
        })
    }
}

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "system_instruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
    response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(ProviderConfig::gemini("test-key").with_base_url(server.base_url()))
            .unwrap()
    }

    fn design_request() -> CompletionRequest {
        CompletionRequest::new(vec![
            ChatMessage::system("You are an antenna engineer"),
            ChatMessage::user("patch at 2.4 GHz"),
        ])
        .with_temperature(0.5)
        .with_json_mode(true)
    }

    #[tokio::test]
    async fn test_complete_sends_json_mode_and_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-2.0-flash-lite:generateContent")
                    .query_param("key", "test-key")
                    .json_body_partial(
                        r#"{
                            "generationConfig": {"responseMimeType": "application/json"},
                            "system_instruction": {"parts": [{"text": "You are an antenna engineer"}]},
                            "contents": [{"role": "user", "parts": [{"text": "patch at 2.4 GHz"}]}]
                        }"#,
                    );
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "{\"antenna_type\":\"patch\"}"}]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20},
                    "modelVersion": "gemini-2.0-flash-lite-001"
                }));
            })
            .await;

        let response = provider(&server).complete(design_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content.as_deref(), Some("{\"antenna_type\":\"patch\"}"));
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.model, "gemini-2.0-flash-lite-001");
        assert_eq!(response.usage.total_tokens, 20);
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(429).header("retry-after", "7").body("quota");
            })
            .await;

        let err = provider(&server).complete(design_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { retry_after: Some(7) }));
    }

    #[tokio::test]
    async fn test_forbidden_is_authentication_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(403).body("API key not valid");
            })
            .await;

        let err = provider(&server).complete(design_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({"candidates": []}));
            })
            .await;

        let err = provider(&server).complete(design_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let mut config = ProviderConfig::gemini("");
        config.base_url = Some("http://127.0.0.1:9".into());
        let provider = GeminiProvider::new(config).unwrap();

        let err = provider.complete(design_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed));
    }
}
