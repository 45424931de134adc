//! Configuration loading and client factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizforge_core::prompt::{PromptRenderer, DEFAULT_TEMPLATES_DIR};
use quizforge_core::{AssessmentAgent, GenerationClient};

use crate::openai::{OpenAiBackend, DEFAULT_BASE_URL};

pub const CONFIG_FILE_NAME: &str = "quizforge.toml";
pub const ENV_MODEL: &str = "QUIZFORGE_MODEL";
pub const ENV_API_KEY: &str = "QUIZFORGE_API_KEY";
pub const ENV_BASE_URL: &str = "QUIZFORGE_BASE_URL";

/// Everything needed to reach the generation service.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Bearer credential; empty means no Authorization header.
    #[serde(default)]
    pub api_key: String,
    /// Service endpoint including the API version prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory holding `<name>.j2` prompt templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    /// Transport timeout; the HTTP client's default when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for QuizforgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizforgeConfig")
            .field("model", &self.model)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("templates_dir", &self.templates_dir)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_templates_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATES_DIR)
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            base_url: default_base_url(),
            templates_dir: default_templates_dir(),
            timeout_secs: None,
        }
    }
}

impl QuizforgeConfig {
    /// Parse a TOML config. Relative template directories stay relative.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config")
    }

    /// Apply `QUIZFORGE_*` overrides and expand `${VAR}` references using `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(ENV_MODEL) {
            self.model = model;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }

        self.model = resolve_env_vars(&self.model, &lookup);
        self.api_key = resolve_env_vars(&self.api_key, &lookup);
        self.base_url = resolve_env_vars(&self.base_url, &lookup);
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to the empty string.
fn resolve_env_vars<F>(s: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&lookup(&rest[start + 2..start + len]).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable overrides: `QUIZFORGE_MODEL`, `QUIZFORGE_API_KEY`,
/// `QUIZFORGE_BASE_URL`.
pub fn load_config() -> Result<QuizforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
///
/// A relative `templates_dir` is resolved against the directory of the file
/// it was read from.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let mut config = QuizforgeConfig::from_toml_str(&content)
                .with_context(|| format!("invalid config: {}", path.display()))?;
            if config.templates_dir.is_relative() {
                if let Some(parent) = path.parent() {
                    config.templates_dir = parent.join(&config.templates_dir);
                }
            }
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => QuizforgeConfig::default(),
    };

    config.apply_env(process_env);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

/// Build the HTTP backend described by a config.
pub fn create_backend(config: &QuizforgeConfig) -> Result<OpenAiBackend> {
    OpenAiBackend::new(
        &config.api_key,
        Some(config.base_url.clone()),
        config.timeout_secs,
    )
    .context("failed to configure generation backend")
}

/// Build a generation client. No network call happens here.
pub fn create_client(config: &QuizforgeConfig) -> Result<GenerationClient> {
    let backend = create_backend(config)?;
    Ok(GenerationClient::new(
        config.model.clone(),
        Box::new(backend),
        PromptRenderer::new(config.templates_dir.clone()),
    ))
}

/// Build an agent around a freshly configured client.
pub fn create_agent(config: &QuizforgeConfig) -> Result<AssessmentAgent> {
    Ok(AssessmentAgent::new(create_client(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn resolve_env_vars_basic() {
        let lookup = env(&[("_QUIZFORGE_TEST_VAR", "hello")]);
        assert_eq!(resolve_env_vars("${_QUIZFORGE_TEST_VAR}", &lookup), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZFORGE_TEST_VAR}_suffix", &lookup),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${UNSET}x", &lookup), "x");
        assert_eq!(resolve_env_vars("${unterminated", &lookup), "${unterminated");
    }

    #[test]
    fn default_config() {
        let config = QuizforgeConfig::default();
        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.templates_dir, PathBuf::from("prompts"));
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn parse_config() {
        let config = QuizforgeConfig::from_toml_str(
            r#"
model = "llama3.1"
api_key = "${LLM_KEY}"
base_url = "http://localhost:11434/v1"
templates_dir = "templates"
timeout_secs = 90
"#,
        )
        .unwrap();
        assert_eq!(config.model, "llama3.1");
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.timeout_secs, Some(90));

        let mut resolved = config.clone();
        resolved.apply_env(env(&[("LLM_KEY", "sk-local")]));
        assert_eq!(resolved.api_key, "sk-local");
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = QuizforgeConfig::default();
        config.apply_env(env(&[
            (ENV_MODEL, "gpt-4o"),
            (ENV_API_KEY, "sk-env"),
            (ENV_BASE_URL, "http://proxy/v1"),
        ]));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.base_url, "http://proxy/v1");
    }

    #[test]
    fn debug_masks_api_key() {
        let config = QuizforgeConfig {
            api_key: "sk-very-secret".into(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }

    #[test]
    fn missing_explicit_config_is_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizforge.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn templates_dir_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizforge.toml");
        std::fs::write(&path, "model = \"m\"\ntemplates_dir = \"prompts\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.templates_dir, dir.path().join("prompts"));
    }

    #[test]
    fn create_client_does_not_touch_network() {
        let config = QuizforgeConfig {
            base_url: "http://127.0.0.1:9/v1".into(),
            ..Default::default()
        };
        let client = create_client(&config).unwrap();
        assert_eq!(client.model(), "gpt-4.1-mini");
        assert_eq!(client.backend_name(), "openai");
    }
}
