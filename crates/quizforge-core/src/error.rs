//! Error types for the generation pipeline.
//!
//! Each stage of a generation call has its own error type so callers can
//! tell a bad request apart from a transport failure or an unusable reply
//! without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// A value failed schema validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The JSON shape did not match the schema (missing field, wrong type,
    /// unknown enum member, negative integer).
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The TOML shape did not match the schema.
    #[error("{0}")]
    Toml(#[from] toml::de::Error),

    /// An integer field is below its lower bound.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: String,
        min: u32,
        value: u32,
    },

    /// A fractional field is outside its closed range.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

/// Errors from looking up or rendering a prompt template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template file exists for the name.
    #[error("template not found: {name} ({})", path.display())]
    NotFound { name: String, path: PathBuf },

    /// The template file exists but could not be read.
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template references variables absent from the supplied mapping.
    #[error("template {template} references undefined variables: {}", names.join(", "))]
    MissingVariables { template: String, names: Vec<String> },
}

/// Errors that can occur when talking to the generation service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The service answered with a body that is not a chat completion.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Why a reply could not be turned into an assessment.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// The cleaned reply is not JSON.
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// The reply is JSON but does not satisfy the assessment schema.
    #[error("schema validation failed: {0}")]
    Schema(#[source] ValidationError),
}

/// Errors surfaced by [`crate::GenerationClient::generate`] and
/// [`crate::AssessmentAgent::invoke`].
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The caller passed something that is not a well-formed request.
    #[error("invalid assessment request: {0}")]
    InvalidRequest(#[source] ValidationError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The service replied without any completion choices.
    #[error("generation service returned no completion choices")]
    EmptyResponse,

    /// The reply text could not be parsed or validated. `raw` is the reply
    /// exactly as received.
    #[error("failed to parse generation reply: {source}")]
    Parse {
        raw: String,
        #[source]
        source: ReplyError,
    },
}

impl GenerateError {
    /// The unmodified reply text, for parse failures.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            GenerateError::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variables_lists_every_name() {
        let err = TemplateError::MissingVariables {
            template: "assessment".into(),
            names: vec!["grade".into(), "subject".into()],
        };
        assert_eq!(
            err.to_string(),
            "template assessment references undefined variables: grade, subject"
        );
    }

    #[test]
    fn raw_reply_only_for_parse_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = GenerateError::Parse {
            raw: "{".into(),
            source: ReplyError::Json(json_err),
        };
        assert_eq!(err.raw_reply(), Some("{"));
        assert!(GenerateError::EmptyResponse.raw_reply().is_none());
    }

    #[test]
    fn provider_errors_pass_through_display() {
        let err: GenerateError = ProviderError::ApiError {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert_eq!(err.to_string(), "API error (HTTP 500): boom");
    }
}
