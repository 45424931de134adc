//! Prompt template rendering.
//!
//! Templates live in a directory as `<name>.j2` files and use `{{ name }}`
//! placeholders. Rendering fails if a placeholder names a variable that is
//! not in the supplied mapping; an empty value renders as empty text.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TemplateError;

/// File suffix of prompt templates.
pub const TEMPLATE_EXTENSION: &str = "j2";

/// Default directory searched for templates.
pub const DEFAULT_TEMPLATES_DIR: &str = "prompts";

/// Source of the stock `assessment` template, written out by `quizforge init`.
pub const DEFAULT_ASSESSMENT_TEMPLATE: &str = include_str!("../templates/assessment.j2");

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex is valid")
});

/// Renders named templates from a directory.
#[derive(Debug, Clone)]
pub struct PromptRenderer {
    dir: PathBuf,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATES_DIR)
    }
}

impl PromptRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a template name resolves to.
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{TEMPLATE_EXTENSION}"))
    }

    /// Read the source of a named template.
    pub fn load(&self, name: &str) -> Result<String, TemplateError> {
        let path = self.template_path(name);
        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => TemplateError::NotFound {
                name: name.to_string(),
                path: path.clone(),
            },
            _ => TemplateError::Io {
                path: path.clone(),
                source,
            },
        })
    }

    /// Load the named template and fill it from `vars`.
    pub fn render(
        &self,
        name: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        let source = self.load(name)?;
        render_str(name, &source, vars)
    }
}

/// Fill the placeholders of an in-memory template.
pub fn render_str(
    name: &str,
    source: &str,
    vars: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut missing = BTreeSet::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(source) {
        let (Some(whole), Some(var)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&source[last..whole.start()]);
        match vars.get(var.as_str()) {
            Some(value) => out.push_str(value),
            None => {
                missing.insert(var.as_str().to_string());
            }
        }
        last = whole.end();
    }
    out.push_str(&source[last..]);

    if !missing.is_empty() {
        return Err(TemplateError::MissingVariables {
            template: name.to_string(),
            names: missing.into_iter().collect(),
        });
    }

    Ok(out)
}

/// Names of every variable a template references, sorted and deduplicated.
pub fn placeholders(source: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
