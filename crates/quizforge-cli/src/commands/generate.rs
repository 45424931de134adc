//! The `quizforge generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizforge_core::consistency::check_request;
use quizforge_core::AssessmentResult;
use quizforge_providers::config::load_config_from;
use quizforge_providers::create_agent;

const PREVIEW_CHARS: usize = 60;

pub async fn execute(
    request_path: PathBuf,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    model: Option<String>,
) -> Result<()> {
    let request = super::load_request(&request_path)?;
    for warning in check_request(&request) {
        eprintln!("WARNING: {warning}");
    }

    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(model) = model {
        config.model = model;
    }

    let agent = create_agent(&config)?;
    tracing::info!(
        model = %config.model,
        questions = request.number_of_questions,
        "generating assessment"
    );

    let result = agent
        .invoke(&request)
        .await
        .context("assessment generation failed")?;

    let json = serde_json::to_string_pretty(&result)?;
    match &output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    print_summary(&result);
    Ok(())
}

fn print_summary(result: &AssessmentResult) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Type", "Marks", "Level", "Difficulty", "Question"]);

    for (i, question) in result.questions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(question.question_type),
            Cell::new(question.marks),
            Cell::new(question.blooms_level),
            Cell::new(question.difficulty),
            Cell::new(preview(&question.question_text)),
        ]);
    }

    eprintln!("\n{}", result.title);
    eprintln!("{table}");
    eprintln!(
        "{} questions, {} marks",
        result.questions.len(),
        result.question_marks()
    );
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_text() {
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(PREVIEW_CHARS + 5);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 1);
        assert!(shown.ends_with('…'));
    }
}
