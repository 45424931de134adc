pub mod generate;
pub mod init;
pub mod schema;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use quizforge_core::AssessmentRequest;

/// Load a request from a `.json` file, or from TOML for any other extension.
pub fn load_request(path: &Path) -> Result<AssessmentRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request: {}", path.display()))?;

    let request = if path.extension().is_some_and(|ext| ext == "json") {
        AssessmentRequest::from_json_str(&content)
    } else {
        AssessmentRequest::from_toml_str(&content)
    };

    request.with_context(|| format!("invalid request: {}", path.display()))
}
