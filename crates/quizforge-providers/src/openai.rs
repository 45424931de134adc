//! OpenAI-compatible chat-completion backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizforge_core::error::ProviderError;
use quizforge_core::traits::{ChatBackend, ChatMessage, ChatRequest, ChatResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Backend for any service exposing `POST {base_url}/chat/completions`.
pub struct OpenAiBackend {
    api_key: String,
    base_url: String,
    timeout_secs: Option<u64>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAiBackend {
    /// Build the HTTP handle. No request is sent.
    ///
    /// `base_url` includes the API version prefix (e.g. `.../v1`). Without a
    /// `timeout_secs` the transport's own default applies.
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    model: String,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let body = OpenAiRequest {
            model: &request.model,
            messages: &request.messages,
        };

        let mut req = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json");
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = req.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout_secs.unwrap_or_default())
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body));
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(request.model.clone()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            });
        }

        let api_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        tracing::debug!(choices = api_response.choices.len(), "chat completion received");

        Ok(ChatResponse {
            choices: api_response
                .choices
                .into_iter()
                .map(|c| c.message.content.unwrap_or_default())
                .collect(),
            model: api_response.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat() -> ChatRequest {
        ChatRequest {
            model: "gpt-4.1-mini".into(),
            messages: vec![
                ChatMessage::system("You are an expert assessment generator."),
                ChatMessage::user("Write 3 questions"),
            ],
        }
    }

    #[tokio::test]
    async fn successful_completion() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [
                {"message": {"content": "{\"title\": \"T\"}", "role": "assistant"}, "index": 0},
                {"message": {"content": "second", "role": "assistant"}, "index": 1}
            ],
            "model": "gpt-4.1-mini-2025-04-14"
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4.1-mini",
                "messages": [
                    {"role": "system", "content": "You are an expert assessment generator."},
                    {"role": "user", "content": "Write 3 questions"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .expect(1)
            .mount(&server)
            .await;

        let backend =
            OpenAiBackend::new("test-key", Some(format!("{}/v1", server.uri())), None).unwrap();
        let response = backend.complete(&chat()).await.unwrap();
        assert_eq!(response.choices, vec!["{\"title\": \"T\"}", "second"]);
        assert_eq!(response.model, "gpt-4.1-mini-2025-04-14");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}],
                "model": "local"
            })))
            .mount(&server)
            .await;

        let backend =
            OpenAiBackend::new("", Some(format!("{}/v1/", server.uri())), Some(5)).unwrap();
        let response = backend.complete(&chat()).await.unwrap();
        assert_eq!(response.choices, vec!["ok"]);
    }

    #[tokio::test]
    async fn empty_choices_pass_through() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": [], "model": "m"})),
            )
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None).unwrap();
        let response = backend.complete(&chat()).await.unwrap();
        assert!(response.choices.is_empty());
    }

    #[tokio::test]
    async fn null_content_becomes_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": null, "role": "assistant"}}],
                "model": "m"
            })))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None).unwrap();
        let response = backend.complete(&chat()).await.unwrap();
        assert_eq!(response.choices, vec![""]);
    }

    #[tokio::test]
    async fn unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("bad", Some(server.uri()), None).unwrap();
        let err = backend.complete(&chat()).await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(ref b) if b.contains("invalid api key")));
    }

    #[tokio::test]
    async fn unknown_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None).unwrap();
        let err = backend.complete(&chat()).await.unwrap_err();
        assert!(matches!(err, ProviderError::ModelNotFound(ref m) if m == "gpt-4.1-mini"));
    }

    #[tokio::test]
    async fn error_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None).unwrap();
        let err = backend.complete(&chat()).await.unwrap_err();
        assert_eq!(err.to_string(), "API error (HTTP 500): internal error");
    }

    #[tokio::test]
    async fn malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new("key", Some(server.uri()), None).unwrap();
        let err = backend.complete(&chat()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn default_base_url_and_masked_debug() {
        let backend = OpenAiBackend::new("sk-secret", None, None).unwrap();
        assert_eq!(backend.base_url(), DEFAULT_BASE_URL);
        let debug = format!("{backend:?}");
        assert!(!debug.contains("sk-secret"));
    }
}
