//! Advisory cross-field checks.
//!
//! None of these conditions make a request or result invalid. They are
//! reported so callers can decide whether to trust a generated assessment.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{whole_number_value, AssessmentRequest, AssessmentResult, Question, QuestionType};

/// Allowed deviation of the question mix sum from 1.0.
pub const MIX_TOLERANCE: f64 = 0.01;

/// A cross-field inconsistency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyWarning {
    /// Index of the question concerned, if any.
    pub question: Option<usize>,
    pub message: String,
}

impl ConsistencyWarning {
    fn general(message: impl Into<String>) -> Self {
        Self {
            question: None,
            message: message.into(),
        }
    }

    fn question(index: usize, message: impl Into<String>) -> Self {
        Self {
            question: Some(index),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.question {
            Some(i) => write!(f, "question {}: {}", i + 1, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Check that the question mix of a request adds up to one.
pub fn check_request(request: &AssessmentRequest) -> Vec<ConsistencyWarning> {
    let mut warnings = Vec::new();

    let total = request.mcq_percentage
        + request.short_answer_percentage
        + request.long_answer_percentage;
    if (total - 1.0).abs() > MIX_TOLERANCE {
        warnings.push(ConsistencyWarning::general(format!(
            "question mix sums to {total:.2}, expected 1.00"
        )));
    }

    warnings
}

/// Check a generated assessment against its own metadata and answer keys.
pub fn check_result(result: &AssessmentResult) -> Vec<ConsistencyWarning> {
    let mut warnings = Vec::new();
    let meta = &result.metadata;

    if meta.total_questions as usize != result.questions.len() {
        warnings.push(ConsistencyWarning::general(format!(
            "metadata reports {} questions but {} were generated",
            meta.total_questions,
            result.questions.len()
        )));
    }

    let marks = result.question_marks();
    if u64::from(meta.total_marks) != marks {
        warnings.push(ConsistencyWarning::general(format!(
            "metadata reports {} total marks but questions add up to {marks}",
            meta.total_marks
        )));
    }

    let distributions = [
        (
            "difficulty_distribution",
            &meta.difficulty_distribution,
            count_by(&result.questions, |q| q.difficulty.as_str()),
        ),
        (
            "question_type_distribution",
            &meta.question_type_distribution,
            count_by(&result.questions, |q| q.question_type.as_str()),
        ),
        (
            "blooms_level_coverage",
            &meta.blooms_level_coverage,
            count_by(&result.questions, |q| q.blooms_level.as_str()),
        ),
    ];
    for (name, reported, actual) in distributions {
        let Some(counts) = reported_counts(reported) else {
            continue;
        };
        if counts != actual {
            warnings.push(ConsistencyWarning::general(format!(
                "{name} {counts:?} does not match questions {actual:?}"
            )));
        }
    }

    for (i, question) in result.questions.iter().enumerate() {
        check_question(i, question, &mut warnings);
    }

    warnings
}

fn check_question(index: usize, question: &Question, warnings: &mut Vec<ConsistencyWarning>) {
    match question.question_type {
        QuestionType::MultipleChoice => {
            let options = question.options.as_deref().unwrap_or_default();
            if options.is_empty() {
                warnings.push(ConsistencyWarning::question(
                    index,
                    "multiple choice question has no options",
                ));
                return;
            }

            let correct = options.iter().filter(|o| o.is_correct).count();
            if correct != 1 {
                warnings.push(ConsistencyWarning::question(
                    index,
                    format!("expected exactly one correct option, found {correct}"),
                ));
            }

            if let Some(answer) = &question.answer_key.correct_answer {
                for value in answer.values() {
                    if !options.iter().any(|o| o.option_id == value) {
                        warnings.push(ConsistencyWarning::question(
                            index,
                            format!("correct answer {value:?} matches no option"),
                        ));
                    }
                }
            }
        }
        QuestionType::LongAnswer => {
            let has_criteria = question
                .answer_key
                .marking_criteria
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty());
            if !has_criteria {
                warnings.push(ConsistencyWarning::question(
                    index,
                    "long answer question has no marking criteria",
                ));
            }
        }
        QuestionType::ShortAnswer => {}
    }
}

fn count_by<F>(questions: &[Question], key: F) -> BTreeMap<String, u32>
where
    F: Fn(&Question) -> &'static str,
{
    let mut counts = BTreeMap::new();
    for question in questions {
        *counts.entry(key(question).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Non-zero counts of a reported distribution, or `None` when any value is
/// not a whole number (fractions, percentages).
fn reported_counts(map: &BTreeMap<String, serde_json::Value>) -> Option<BTreeMap<String, u32>> {
    let mut counts = BTreeMap::new();
    for (key, value) in map {
        let count = whole_number_value(value)?;
        if count > 0 {
            counts.insert(key.clone(), count);
        }
    }
    Some(counts)
}
