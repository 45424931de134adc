//! Assessment data model.
//!
//! Requests describe what the caller wants generated; results are the
//! validated assessments built from a generation service's reply. Field names
//! are the wire names used in prompt templates and in the JSON the service is
//! asked to produce.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Bloom's taxonomy cognitive level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl CognitiveLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "remember",
            CognitiveLevel::Understand => "understand",
            CognitiveLevel::Apply => "apply",
            CognitiveLevel::Analyze => "analyze",
            CognitiveLevel::Evaluate => "evaluate",
            CognitiveLevel::Create => "create",
        }
    }
}

impl fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Question or assessment difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
            DifficultyLevel::VeryHard => "very_hard",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Kind of assessment question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    LongAnswer,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::LongAnswer => "long_answer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One option of a multiple choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MCQOption {
    /// Option identifier (A, B, C, D).
    pub option_id: String,
    /// Option text content.
    pub text: String,
    /// Whether this is the correct answer.
    #[serde(default)]
    pub is_correct: bool,
}

/// The correct answer of a question: one value or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Single(String),
    Multiple(Vec<String>),
}

impl CorrectAnswer {
    /// All answer values, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            CorrectAnswer::Single(s) => vec![s.as_str()],
            CorrectAnswer::Multiple(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for CorrectAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectAnswer::Single(s) => f.write_str(s),
            CorrectAnswer::Multiple(v) => f.write_str(&v.join(", ")),
        }
    }
}

/// Answer key and marking guide for a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerKey {
    /// Correct answer(s).
    #[serde(default)]
    pub correct_answer: Option<CorrectAnswer>,
    /// Explanation of the correct answer.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Detailed marking rubric for long answers.
    #[serde(default)]
    pub marking_criteria: Option<String>,
    /// Key points to award marks.
    #[serde(default)]
    pub key_points: Option<Vec<String>>,
}

/// A single assessment question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub question_type: QuestionType,
    pub question_text: String,
    /// Marks allocated to this question, at least 1.
    #[serde(deserialize_with = "whole_number")]
    #[schemars(with = "u32", range(min = 1))]
    pub marks: u32,
    pub blooms_level: CognitiveLevel,
    pub difficulty: DifficultyLevel,
    /// Options, for multiple choice questions.
    #[serde(default)]
    pub options: Option<Vec<MCQOption>>,
    pub answer_key: AnswerKey,
    #[serde(default)]
    pub learning_objective_covered: Option<String>,
    #[serde(default, deserialize_with = "optional_whole_number")]
    #[schemars(with = "Option<u32>")]
    pub estimated_time_minutes: Option<u32>,
}

impl Question {
    fn validate(&self, index: usize) -> Result<(), ValidationError> {
        at_least(&format!("questions[{index}].marks"), self.marks, 1)
    }
}

/// Summary statistics the generation service reports about its assessment.
///
/// The distributions are taken as reported. Services variously send counts,
/// fractions or percentage strings, so values are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentMetadata {
    #[serde(deserialize_with = "whole_number")]
    #[schemars(with = "u32")]
    pub total_questions: u32,
    #[serde(deserialize_with = "whole_number")]
    #[schemars(with = "u32")]
    pub total_marks: u32,
    #[serde(default, deserialize_with = "optional_whole_number")]
    #[schemars(with = "Option<u32>")]
    pub estimated_duration_minutes: Option<u32>,
    /// Questions per difficulty level.
    pub difficulty_distribution: BTreeMap<String, serde_json::Value>,
    /// Questions per question type.
    pub question_type_distribution: BTreeMap<String, serde_json::Value>,
    /// Questions per cognitive level.
    pub blooms_level_coverage: BTreeMap<String, serde_json::Value>,
}

/// Read a JSON number as a whole `u32`.
///
/// Integral floats such as `2.0` are accepted; fractions, negatives and
/// values past `u32::MAX` are not.
pub fn whole_number_value(value: &serde_json::Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) {
        Some(f as u32)
    } else {
        None
    }
}

fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    whole_number_value(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid value: {value}, expected a whole number"))
    })
}

fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => whole_number_value(&value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid value: {value}, expected a whole number"))
        }),
    }
}

/// A complete generated assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentResult {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub curriculum_standard: String,
    pub learning_objectives: String,
    /// Primary cognitive level of the assessment.
    pub target_blooms_level: CognitiveLevel,
    pub questions: Vec<Question>,
    pub metadata: AssessmentMetadata,
    /// Instructions for students taking the assessment.
    pub student_instructions: String,
    #[serde(default)]
    pub teacher_notes: Option<String>,
}

impl AssessmentResult {
    /// Build a result from parsed JSON, validating every nested question.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        let result: AssessmentResult = serde_json::from_value(value)?;
        result.validate()?;
        Ok(result)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ValidationError> {
        let result: AssessmentResult = serde_json::from_str(s)?;
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (i, question) in self.questions.iter().enumerate() {
            question.validate(i)?;
        }
        Ok(())
    }

    /// Sum of the marks of every question.
    pub fn question_marks(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.marks)).sum()
    }
}

static RESULT_SCHEMA: LazyLock<String> = LazyLock::new(|| {
    serde_json::to_string(&schemars::schema_for!(AssessmentResult)).unwrap_or_default()
});

/// JSON Schema of [`AssessmentResult`], used as the default response format hint.
pub fn assessment_result_schema() -> &'static str {
    &RESULT_SCHEMA
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Parameters for generating an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// The curriculum standard to assess.
    pub curriculum_standard: String,
    /// Specific learning objectives.
    pub learning_objectives: String,
    /// Target cognitive level.
    pub blooms_taxonomy_level: CognitiveLevel,
    /// Overall difficulty.
    pub toughness_level: DifficultyLevel,
    /// Total marks for the assessment, at least 1.
    pub total_marks: u32,
    /// Number of questions to generate, at least 1.
    pub number_of_questions: u32,
    /// Additional requirements or constraints.
    #[serde(default)]
    pub additional_prompts: Option<String>,
    /// Target fraction of multiple choice questions.
    #[serde(default = "default_mcq_percentage")]
    pub mcq_percentage: f64,
    /// Target fraction of short answer questions.
    #[serde(default = "default_short_answer_percentage")]
    pub short_answer_percentage: f64,
    /// Target fraction of long answer questions.
    #[serde(default = "default_long_answer_percentage")]
    pub long_answer_percentage: f64,
    /// Serialized schema the reply should follow.
    #[serde(default = "default_response_format")]
    pub response_format: Option<String>,
}

fn default_mcq_percentage() -> f64 {
    0.4
}

fn default_short_answer_percentage() -> f64 {
    0.3
}

fn default_long_answer_percentage() -> f64 {
    0.3
}

fn default_response_format() -> Option<String> {
    Some(assessment_result_schema().to_string())
}

impl AssessmentRequest {
    /// Build a request with the default question mix and response format.
    pub fn new(
        curriculum_standard: impl Into<String>,
        learning_objectives: impl Into<String>,
        blooms_taxonomy_level: CognitiveLevel,
        toughness_level: DifficultyLevel,
        total_marks: u32,
        number_of_questions: u32,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            curriculum_standard: curriculum_standard.into(),
            learning_objectives: learning_objectives.into(),
            blooms_taxonomy_level,
            toughness_level,
            total_marks,
            number_of_questions,
            additional_prompts: None,
            mcq_percentage: default_mcq_percentage(),
            short_answer_percentage: default_short_answer_percentage(),
            long_answer_percentage: default_long_answer_percentage(),
            response_format: default_response_format(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_additional_prompts(mut self, prompts: impl Into<String>) -> Self {
        self.additional_prompts = Some(prompts.into());
        self
    }

    /// Set the question type mix. Each fraction must lie in [0, 1].
    pub fn with_question_mix(
        mut self,
        mcq: f64,
        short_answer: f64,
        long_answer: f64,
    ) -> Result<Self, ValidationError> {
        self.mcq_percentage = mcq;
        self.short_answer_percentage = short_answer;
        self.long_answer_percentage = long_answer;
        self.validate()?;
        Ok(self)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        let request: AssessmentRequest = serde_json::from_value(value)?;
        request.validate()?;
        Ok(request)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ValidationError> {
        let request: AssessmentRequest = serde_json::from_str(s)?;
        request.validate()?;
        Ok(request)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ValidationError> {
        let request: AssessmentRequest = toml::from_str(s)?;
        request.validate()?;
        Ok(request)
    }

    /// Check numeric bounds. Enum membership and required fields are already
    /// guaranteed by the type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        at_least("total_marks", self.total_marks, 1)?;
        at_least("number_of_questions", self.number_of_questions, 1)?;
        fraction("mcq_percentage", self.mcq_percentage)?;
        fraction("short_answer_percentage", self.short_answer_percentage)?;
        fraction("long_answer_percentage", self.long_answer_percentage)?;
        Ok(())
    }

    /// Flatten the request into template variables keyed by field name.
    ///
    /// Absent optional fields map to the empty string so templates can
    /// reference them unconditionally.
    pub fn template_vars(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("curriculum_standard".into(), self.curriculum_standard.clone());
        vars.insert("learning_objectives".into(), self.learning_objectives.clone());
        vars.insert(
            "blooms_taxonomy_level".into(),
            self.blooms_taxonomy_level.to_string(),
        );
        vars.insert("toughness_level".into(), self.toughness_level.to_string());
        vars.insert("total_marks".into(), self.total_marks.to_string());
        vars.insert(
            "number_of_questions".into(),
            self.number_of_questions.to_string(),
        );
        vars.insert(
            "additional_prompts".into(),
            self.additional_prompts.clone().unwrap_or_default(),
        );
        vars.insert("mcq_percentage".into(), self.mcq_percentage.to_string());
        vars.insert(
            "short_answer_percentage".into(),
            self.short_answer_percentage.to_string(),
        );
        vars.insert(
            "long_answer_percentage".into(),
            self.long_answer_percentage.to_string(),
        );
        vars.insert(
            "response_format".into(),
            self.response_format.clone().unwrap_or_default(),
        );
        vars
    }
}

fn at_least(field: &str, value: u32, min: u32) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::BelowMinimum {
            field: field.to_string(),
            min,
            value,
        });
    }
    Ok(())
}

fn fraction(field: &str, value: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 1.0,
            value,
        });
    }
    Ok(())
}
