//! quizforge-core — assessment schema and generation pipeline.
//!
//! This crate defines the request/result data model, the prompt renderer,
//! the reply cleaning and validation routine, and the generation client and
//! agent that tie them to a chat-completion backend.

pub mod agent;
pub mod client;
pub mod consistency;
pub mod error;
pub mod model;
pub mod prompt;
pub mod reply;
pub mod traits;

pub use agent::AssessmentAgent;
pub use client::GenerationClient;
pub use error::{GenerateError, ProviderError, ReplyError, TemplateError, ValidationError};
pub use model::{AssessmentRequest, AssessmentResult};
