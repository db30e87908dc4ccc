// src/models/progress.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use thiserror::Error;

use crate::models::question::Question;

/// Lifecycle of a user's advancement through one module.
///
/// `NotStarted` is never stored: it is the absence of a progress row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Testing,
    Completed,
    Failed,
}

impl ProgressStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Testing => "testing",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {operation} while module status is '{status}'")]
    InvalidState {
        operation: &'static str,
        status: ProgressStatus,
    },
}

/// Represents the 'user_progress' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Progress {
    pub id: String,
    pub user_id: i64,
    pub module_id: String,

    /// Lessons completed so far, `0..=total_lessons`.
    pub current_lesson: i64,

    /// Copied from the module when the progress is created.
    pub total_lessons: i64,

    pub status: ProgressStatus,

    /// Question set frozen when the module entered `testing`.
    pub test_questions: Option<Json<Vec<Question>>>,

    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to `lesson`; `entered_testing` is set when it was the last one.
    Lesson { lesson: i64, entered_testing: bool },
    /// No lessons left (an empty module); the test is now open.
    EnteredTesting,
}

impl Progress {
    /// Builds a fresh in-progress record for `(user_id, module_id)`.
    pub fn new(user_id: i64, module_id: &str, total_lessons: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            module_id: module_id.to_string(),
            current_lesson: 0,
            total_lessons: total_lessons.max(0),
            status: ProgressStatus::InProgress,
            test_questions: None,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Consumes the next lesson.
    ///
    /// Only valid while `in_progress`. Reaching `total_lessons` flips the
    /// status to `testing` in the same step.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, TransitionError> {
        if self.status != ProgressStatus::InProgress {
            return Err(TransitionError::InvalidState {
                operation: "advance lesson",
                status: self.status,
            });
        }

        let outcome = if self.current_lesson < self.total_lessons {
            self.current_lesson += 1;
            let entered_testing = self.current_lesson == self.total_lessons;
            Advance::Lesson {
                lesson: self.current_lesson,
                entered_testing,
            }
        } else {
            Advance::EnteredTesting
        };

        if self.current_lesson == self.total_lessons {
            self.status = ProgressStatus::Testing;
        }
        self.updated_at = now;

        Ok(outcome)
    }

    /// Applies a graded test outcome. Only valid while `testing`.
    pub fn record_outcome(
        &mut self,
        passed: bool,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if self.status != ProgressStatus::Testing {
            return Err(TransitionError::InvalidState {
                operation: "submit test",
                status: self.status,
            });
        }

        if passed {
            self.status = ProgressStatus::Completed;
            self.completed_at = Some(now);
        } else {
            self.status = ProgressStatus::Failed;
        }
        self.updated_at = now;

        Ok(())
    }

    /// Whole-number share of lessons consumed.
    pub fn progress_percentage(&self) -> i64 {
        if self.total_lessons > 0 {
            self.current_lesson * 100 / self.total_lessons
        } else {
            0
        }
    }

    pub fn frozen_questions(&self) -> &[Question] {
        self.test_questions
            .as_ref()
            .map(|q| q.0.as_slice())
            .unwrap_or_default()
    }
}

/// DTO for progress on a single module.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub module_id: String,
    pub current_lesson: i64,
    pub total_lessons: i64,
    pub status: ProgressStatus,
    pub progress_percentage: i64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Progress> for ProgressResponse {
    fn from(p: &Progress) -> Self {
        Self {
            module_id: p.module_id.clone(),
            current_lesson: p.current_lesson,
            total_lessons: p.total_lessons,
            status: p.status,
            progress_percentage: p.progress_percentage(),
            started_at: p.started_at,
            updated_at: p.updated_at,
            completed_at: p.completed_at,
        }
    }
}

/// DTO for the dashboard summary across all started modules.
#[derive(Debug, Serialize, Deserialize)]
pub struct OverallProgressResponse {
    pub total_modules: usize,
    pub completed_modules: usize,
    pub in_progress_modules: usize,
    /// Average passing percentage on a 10-point scale.
    pub average_grade: Option<f64>,
    pub modules: Vec<ProgressResponse>,
}
