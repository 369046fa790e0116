//! Quiz content and its validation rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question_text: String,
    pub answers: Vec<QuizAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizValidationError {
    #[error("a quiz needs at least one question")]
    Empty,
    #[error("question {0} needs at least two answers")]
    TooFewAnswers(usize),
    #[error("question {0} has no correct answer")]
    NoCorrectAnswer(usize),
}

/// Checks a quiz before it is sent to the backend: at least one question,
/// every question with at least two answers and at least one marked
/// correct. Question indices in errors are zero-based.
pub fn validate(questions: &[QuizQuestion]) -> Result<(), QuizValidationError> {
    if questions.is_empty() {
        return Err(QuizValidationError::Empty);
    }
    for (index, question) in questions.iter().enumerate() {
        if question.answers.len() < 2 {
            return Err(QuizValidationError::TooFewAnswers(index));
        }
        if !question.answers.iter().any(|a| a.is_correct) {
            return Err(QuizValidationError::NoCorrectAnswer(index));
        }
    }
    Ok(())
}
