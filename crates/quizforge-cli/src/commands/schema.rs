//! The `quizforge schema` command.

use anyhow::Result;

use quizforge_core::model::assessment_result_schema;

pub fn execute() -> Result<()> {
    let schema: serde_json::Value = serde_json::from_str(assessment_result_schema())?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
