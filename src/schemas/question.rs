use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::db::models::Question;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[serde(alias = "questionText")]
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub(crate) question_text: String,
    #[serde(alias = "optionA")]
    #[validate(length(min = 1, message = "option_a must not be empty"))]
    pub(crate) option_a: String,
    #[serde(alias = "optionB")]
    #[validate(length(min = 1, message = "option_b must not be empty"))]
    pub(crate) option_b: String,
    #[serde(alias = "optionC")]
    #[validate(length(min = 1, message = "option_c must not be empty"))]
    pub(crate) option_c: String,
    #[serde(alias = "optionD")]
    #[validate(length(min = 1, message = "option_d must not be empty"))]
    pub(crate) option_d: String,
    #[serde(alias = "correctAnswer")]
    #[validate(custom(function = validate_answer_letter))]
    pub(crate) correct_answer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionUpdate {
    #[serde(default)]
    #[serde(alias = "questionText")]
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub(crate) question_text: Option<String>,
    #[serde(default)]
    #[serde(alias = "optionA")]
    pub(crate) option_a: Option<String>,
    #[serde(default)]
    #[serde(alias = "optionB")]
    pub(crate) option_b: Option<String>,
    #[serde(default)]
    #[serde(alias = "optionC")]
    pub(crate) option_c: Option<String>,
    #[serde(default)]
    #[serde(alias = "optionD")]
    pub(crate) option_d: Option<String>,
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    #[validate(custom(function = validate_answer_letter))]
    pub(crate) correct_answer: Option<String>,
}

/// Full question view for staff, answer key included.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: i64,
    pub(crate) exam_id: i64,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
    pub(crate) correct_answer: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            exam_id: question.exam_id,
            question_text: question.question_text,
            option_a: question.option_a,
            option_b: question.option_b,
            option_c: question.option_c,
            option_d: question.option_d,
            correct_answer: question.correct_answer,
        }
    }
}

/// What a student sees while taking the exam: the answer key stays server-side.
#[derive(Debug, Serialize)]
pub(crate) struct AttemptQuestionResponse {
    pub(crate) id: i64,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
}

impl AttemptQuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text,
            option_a: question.option_a,
            option_b: question.option_b,
            option_c: question.option_c,
            option_d: question.option_d,
        }
    }
}

fn validate_answer_letter(value: &str) -> Result<(), ValidationError> {
    if matches!(value, "A" | "B" | "C" | "D") {
        Ok(())
    } else {
        Err(ValidationError::new("correct_answer_must_be_one_of_a_b_c_d"))
    }
}
