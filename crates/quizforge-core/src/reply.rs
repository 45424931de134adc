//! Turning a generation service reply into a validated assessment.
//!
//! Models often wrap JSON in Markdown code fences, with or without a
//! language tag. The fences are stripped, the remainder is parsed once, and
//! the parsed value is validated against the assessment schema. There is no
//! repair pass: any failure carries the reply exactly as received.

use crate::error::{GenerateError, ReplyError};
use crate::model::AssessmentResult;

/// Markdown code fence delimiter.
pub const CODE_FENCE: &str = "```";

/// Strip a leading and a trailing Markdown code fence.
///
/// A leading fence may carry an alphabetic language tag (```` ```json ````),
/// optionally separated from the backticks by spaces or tabs; the fence, the
/// tag and the whitespace that follows are removed. A trailing
/// fence and the whitespace before it are removed. Text without fences is
/// returned unchanged.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw;

    if let Some(rest) = text.trim_start().strip_prefix(CODE_FENCE) {
        text = rest
            .trim_start_matches([' ', '\t'])
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim_start();
    }

    if let Some(rest) = text.trim_end().strip_suffix(CODE_FENCE) {
        text = rest.trim_end();
    }

    text
}

/// Clean, parse and validate a reply.
pub fn parse_reply(raw: &str) -> Result<AssessmentResult, GenerateError> {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|e| GenerateError::Parse {
            raw: raw.to_string(),
            source: ReplyError::Json(e),
        })?;

    AssessmentResult::from_value(value).map_err(|e| GenerateError::Parse {
        raw: raw.to_string(),
        source: ReplyError::Schema(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
  "title": "T",
  "curriculum_standard": "Common Core Grade 8",
  "learning_objectives": "Linear equations",
  "target_blooms_level": "apply",
  "questions": [],
  "metadata": {
    "total_questions": 0,
    "total_marks": 0,
    "difficulty_distribution": {},
    "question_type_distribution": {},
    "blooms_level_coverage": {}
  },
  "student_instructions": "Show your work."
}"#;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_fence_with_surrounding_whitespace() {
        assert_eq!(
            strip_code_fences("  \n```JSON  \r\n {\"a\":1} \n```\n\n"),
            "{\"a\":1}"
        );
    }

    #[test]
    fn strips_tag_separated_from_fence() {
        assert_eq!(strip_code_fences("``` json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\tjson\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_unterminated_opening_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn strips_lone_closing_fence() {
        assert_eq!(strip_code_fences("{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn unfenced_text_is_unchanged() {
        let raw = "  {\"a\": 1}\n";
        assert_eq!(strip_code_fences(raw), raw);
    }

    #[test]
    fn parses_fenced_reply() {
        let raw = format!("```json\n{VALID}\n```");
        let result = parse_reply(&raw).unwrap();
        assert_eq!(result.title, "T");
        assert!(result.questions.is_empty());
    }

    #[test]
    fn parses_tagged_fence_with_space() {
        let raw = format!("``` json\n{VALID}\n```");
        assert_eq!(parse_reply(&raw).unwrap().title, "T");
    }

    #[test]
    fn accepts_fractional_distributions_and_float_marks() {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        value["questions"] = serde_json::json!([{
            "question_type": "short_answer",
            "question_text": "Solve 2x + 3 = 7.",
            "marks": 1.0,
            "blooms_level": "apply",
            "difficulty": "easy",
            "answer_key": {"correct_answer": "x = 2"}
        }]);
        value["metadata"]["difficulty_distribution"] = serde_json::json!({"easy": 0.5, "hard": 0.5});
        value["metadata"]["question_type_distribution"] = serde_json::json!({"short_answer": "100%"});

        let result = parse_reply(&value.to_string()).unwrap();
        assert_eq!(result.questions[0].marks, 1);
    }

    #[test]
    fn truncated_json_keeps_raw_text() {
        let raw = "```json\n{\"title\": \"T\", \"questions\": [";
        let err = parse_reply(raw).unwrap_err();
        assert_eq!(err.raw_reply(), Some(raw));
        assert!(matches!(
            err,
            GenerateError::Parse {
                source: ReplyError::Json(_),
                ..
            }
        ));
    }

    #[test]
    fn missing_metadata_is_schema_error() {
        let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
        value.as_object_mut().unwrap().remove("metadata");
        let raw = value.to_string();

        let err = parse_reply(&raw).unwrap_err();
        assert_eq!(err.raw_reply(), Some(raw.as_str()));
        match err {
            GenerateError::Parse {
                source: ReplyError::Schema(e),
                ..
            } => assert!(e.to_string().contains("metadata")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn prose_reply_is_parse_error() {
        let err = parse_reply("Sorry, I cannot help with that.").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
