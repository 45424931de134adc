//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizforge_core::consistency::{check_request, check_result, ConsistencyWarning};
use quizforge_core::AssessmentResult;

pub fn execute(request_path: Option<PathBuf>, result_path: Option<PathBuf>) -> Result<()> {
    let warnings = match (request_path, result_path) {
        (Some(path), _) => {
            let request = super::load_request(&path)?;
            println!(
                "Request: {} ({} questions, {} marks)",
                request.curriculum_standard, request.number_of_questions, request.total_marks
            );
            check_request(&request)
        }
        (None, Some(path)) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read assessment: {}", path.display()))?;
            let result = AssessmentResult::from_json_str(&content)
                .with_context(|| format!("invalid assessment: {}", path.display()))?;
            println!(
                "Assessment: {} ({} questions, {} marks)",
                result.title,
                result.questions.len(),
                result.question_marks()
            );
            check_result(&result)
        }
        (None, None) => anyhow::bail!("pass --request or --result"),
    };

    report(&warnings);
    Ok(())
}

fn report(warnings: &[ConsistencyWarning]) {
    for w in warnings {
        println!("  WARNING: {w}");
    }

    if warnings.is_empty() {
        println!("All checks passed.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }
}
