//! The `quizforge init` command.

use std::path::Path;

use anyhow::Result;

use quizforge_core::prompt::DEFAULT_ASSESSMENT_TEMPLATE;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizforge.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("prompts/assessment.j2"), DEFAULT_ASSESSMENT_TEMPLATE)?;
    write_if_missing(Path::new("requests/example.toml"), EXAMPLE_REQUEST)?;

    println!("\nNext steps:");
    println!("  1. Set QUIZFORGE_API_KEY or edit quizforge.toml");
    println!("  2. Run: quizforge validate --request requests/example.toml");
    println!("  3. Run: quizforge generate --request requests/example.toml --output assessment.json");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    println!("Created {}", path.display());
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

model = "gpt-4.1-mini"
api_key = "${OPENAI_API_KEY}"
base_url = "https://api.openai.com/v1"
templates_dir = "prompts"
# timeout_secs = 120
"#;

const EXAMPLE_REQUEST: &str = r#"# Assessment request

curriculum_standard = "CBSE Class 10"
learning_objectives = "Understanding quadratic equations and their applications"
blooms_taxonomy_level = "understand"
toughness_level = "medium"
total_marks = 50
number_of_questions = 5
additional_prompts = "Include real-world applications"
mcq_percentage = 0.4
short_answer_percentage = 0.3
long_answer_percentage = 0.3
"#;
