//! Entry point for callers: validates the request and delegates to the client.

use crate::client::GenerationClient;
use crate::error::GenerateError;
use crate::model::{AssessmentRequest, AssessmentResult};

/// Thin facade over a [`GenerationClient`].
pub struct AssessmentAgent {
    client: GenerationClient,
}

impl AssessmentAgent {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    /// Generate an assessment for a request.
    ///
    /// Bounds are re-checked here because request fields are public and may
    /// have changed since construction.
    pub async fn invoke(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentResult, GenerateError> {
        request.validate().map_err(GenerateError::InvalidRequest)?;
        self.client.generate(request).await
    }

    /// Generate an assessment from a dynamically shaped request.
    ///
    /// Anything that does not deserialize into a valid [`AssessmentRequest`]
    /// is rejected before rendering or any network activity.
    pub async fn invoke_value(
        &self,
        value: serde_json::Value,
    ) -> Result<AssessmentResult, GenerateError> {
        let request = AssessmentRequest::from_value(value).map_err(GenerateError::InvalidRequest)?;
        self.client.generate(&request).await
    }
}
