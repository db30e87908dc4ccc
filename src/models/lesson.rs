// src/models/lesson.rs

use serde::{Deserialize, Serialize};

use crate::models::question::PublicQuestion;

/// A lesson body loaded from content storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonContent {
    pub module_id: String,
    pub lesson_number: i64,
    pub content: String,
    pub content_type: String,
}

/// Response of the lesson-advance endpoint, tagged by `status`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvanceResponse {
    Success {
        module_id: String,
        lesson_number: i64,
        total_lessons: i64,
        content: String,
        content_type: String,
        progress_percentage: i64,
    },
    ModuleCompleted {
        message: &'static str,
        test_available: bool,
        test_questions: Vec<PublicQuestion>,
    },
    Completed {
        message: &'static str,
        test_result_id: Option<String>,
    },
}
