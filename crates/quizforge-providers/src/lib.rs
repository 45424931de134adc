//! quizforge-providers — chat-completion backends and configuration.
//!
//! Implements the `ChatBackend` trait for OpenAI-compatible services and
//! turns a `QuizforgeConfig` into a ready-to-use generation client.

pub mod config;
pub mod mock;
pub mod openai;

pub use config::{
    create_agent, create_backend, create_client, load_config, load_config_from, QuizforgeConfig,
};
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
