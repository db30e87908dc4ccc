// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::grading::{GradeDetail, SubmittedAnswer};

/// Represents the 'test_results' table in the database.
/// One immutable row per graded submission.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: String,

    /// Back-reference to the owning progress record.
    pub progress_id: String,

    pub module_id: String,
    pub score: i64,
    pub max_score: i64,

    /// `floor(score * 100 / max_score)`.
    pub percentage: i64,

    pub passed: bool,

    /// The raw submission, as received.
    pub answers: Json<Vec<SubmittedAnswer>>,

    pub detailed_results: Json<Vec<GradeDetail>>,

    /// 1-based, gapless per progress record.
    pub attempt_number: i64,

    pub completed_at: DateTime<Utc>,
}

/// DTO for submitting a module test.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitTestRequest {
    #[validate(length(min = 1, max = 500, message = "Submit between 1 and 500 answers."))]
    pub answers: Vec<SubmittedAnswer>,
}

/// DTO returned after a test has been graded.
#[derive(Debug, Serialize)]
pub struct TestResultResponse {
    pub status: &'static str,
    pub result_id: String,
    pub score: i64,
    pub max_score: i64,
    pub percentage: i64,
    pub passed: bool,
    pub detailed_results: Vec<GradeDetail>,
    pub attempt_number: i64,
    pub next_module_unlocked: Option<String>,
}
