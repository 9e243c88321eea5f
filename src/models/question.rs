// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// A question as it appears in a topic bank file.
///
/// Mistake and bookmark records embed a full copy of this struct, so a record
/// keeps working after the bank it came from is edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[validate(length(min = 1))]
    pub id: String,

    /// Question type, e.g. 'single'.
    /// Mapped from the field 'type' since `type` is a reserved keyword in Rust.
    #[serde(rename = "type", default)]
    pub question_type: String,

    /// The text of the question.
    pub stem: String,

    #[validate(length(min = 1), custom(function = validate_choices))]
    pub choices: Vec<Choice>,

    /// Explanation shown once the question is answered.
    #[serde(default)]
    pub analysis: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Question {
    /// The first choice flagged correct.
    pub fn correct_choice(&self) -> Option<&Choice> {
        self.choices.iter().find(|c| c.is_correct)
    }

    /// Whether `choice_id` names a choice flagged correct. Unknown ids are wrong.
    pub fn is_correct(&self, choice_id: &str) -> bool {
        self.choices
            .iter()
            .any(|c| c.id == choice_id && c.is_correct)
    }
}

fn validate_choices(choices: &[Choice]) -> Result<(), validator::ValidationError> {
    if !choices.iter().any(|c| c.is_correct) {
        return Err(validator::ValidationError::new("no_correct_choice"));
    }
    if choices.iter().any(|c| c.id.is_empty()) {
        return Err(validator::ValidationError::new("choice_id_empty"));
    }
    Ok(())
}

/// A question drawn into a mock exam, tagged with the topic it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub topic_id: String,
}

impl ExamQuestion {
    pub fn new(question: Question, topic_id: impl Into<String>) -> Self {
        Self {
            question,
            topic_id: topic_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.question.id
    }
}

/// Choice sent to the client while a question is still open (no correctness flag).
#[derive(Debug, Serialize)]
pub struct PublicChoice {
    pub id: String,
    pub text: String,
}

/// DTO for sending a question to the client (excludes correctness and analysis).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub stem: String,
    pub choices: Vec<PublicChoice>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            question_type: q.question_type.clone(),
            stem: q.stem.clone(),
            choices: q
                .choices
                .iter()
                .map(|c| PublicChoice {
                    id: c.id.clone(),
                    text: c.text.clone(),
                })
                .collect(),
        }
    }
}
