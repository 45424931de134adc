//! The generation client: render, call, clean, parse, validate.

use tracing::{debug, error, instrument, warn};

use crate::consistency::check_result;
use crate::error::GenerateError;
use crate::model::{AssessmentRequest, AssessmentResult};
use crate::prompt::PromptRenderer;
use crate::reply::parse_reply;
use crate::traits::{ChatBackend, ChatMessage, ChatRequest};

/// Name of the template rendered for every assessment request.
pub const ASSESSMENT_TEMPLATE: &str = "assessment";

/// System instruction sent ahead of every rendered prompt.
pub const SYSTEM_PROMPT: &str = "You are an expert assessment generator.";

/// Generates assessments through a chat-completion backend.
///
/// Holds no mutable state; one client can serve any number of sequential or
/// concurrent calls.
pub struct GenerationClient {
    model: String,
    backend: Box<dyn ChatBackend>,
    renderer: PromptRenderer,
}

impl GenerationClient {
    pub fn new(
        model: impl Into<String>,
        backend: Box<dyn ChatBackend>,
        renderer: PromptRenderer,
    ) -> Self {
        Self {
            model: model.into(),
            backend,
            renderer,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Build the two-message exchange for a request.
    pub fn build_chat_request(
        &self,
        request: &AssessmentRequest,
    ) -> Result<ChatRequest, GenerateError> {
        let prompt = self
            .renderer
            .render(ASSESSMENT_TEMPLATE, &request.template_vars())?;
        debug!(prompt_chars = prompt.len(), "rendered assessment prompt");

        Ok(ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
        })
    }

    /// Generate one assessment.
    #[instrument(skip_all, fields(model = %self.model, backend = self.backend.name()))]
    pub async fn generate(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentResult, GenerateError> {
        let chat = self.build_chat_request(request)?;
        let response = self.backend.complete(&chat).await?;

        let Some(content) = response.choices.into_iter().next() else {
            return Err(GenerateError::EmptyResponse);
        };
        debug!(reply_chars = content.len(), "received completion");

        let result = parse_reply(&content).inspect_err(|e| {
            error!(error = %e, raw = %content, "failed to parse generation reply");
        })?;

        for warning in check_result(&result) {
            warn!(%warning, "generated assessment is inconsistent");
        }

        Ok(result)
    }
}
