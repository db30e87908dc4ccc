// src/models/question.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A submitted or correct answer.
///
/// Deserialized from plain JSON without a type tag: an array of strings is a
/// multi-select, a string is text, and numbers/booleans are scalars. Any
/// other shape is kept as `Other` and never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    MultiSelect(Vec<String>),
    Text(String),
    Bool(bool),
    Number(Number),
    Other(Value),
}

impl Answer {
    /// Text form used when comparing against a text answer.
    /// Multi-select answers have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Answer::Text(s) => Some(s.clone()),
            Answer::Number(n) => Some(n.to_string()),
            Answer::Bool(b) => Some(b.to_string()),
            Answer::MultiSelect(_) | Answer::Other(_) => None,
        }
    }
}

/// One test question as stored in content storage.
///
/// Everything besides the id and the correct answer (question text, type,
/// options, points) is prompt data passed through to clients untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,

    /// Absent or `null` makes the question unanswerable.
    #[serde(default)]
    pub correct_answer: Option<Answer>,

    #[serde(flatten)]
    pub prompt: Map<String, Value>,
}

/// The `test_questions.json` document for a module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSet {
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// DTO for sending a question to the client (excludes the correct answer).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub question_id: String,
    #[serde(flatten)]
    pub prompt: Map<String, Value>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            question_id: q.question_id.clone(),
            prompt: q.prompt.clone(),
        }
    }
}

/// Strips correct answers from a question set.
pub fn public_questions(questions: &[Question]) -> Vec<PublicQuestion> {
    questions.iter().map(PublicQuestion::from).collect()
}
