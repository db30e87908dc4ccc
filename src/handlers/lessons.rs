// src/handlers/lessons.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        lesson::AdvanceResponse,
        progress::{Advance, Progress, ProgressStatus, TransitionError},
        question::public_questions,
    },
    services::{attempts, content::ContentService, progress},
    utils::jwt::Claims,
};

/// Moves the caller to the next lesson of a module, or opens the test.
///
/// * `in_progress`: returns the next lesson; the last lesson also flips the
///   progress to `testing` and freezes the module's question set.
/// * `testing`: returns the frozen questions without correct answers.
/// * `completed`: points at the latest attempt.
/// * `failed`: rejected, a failed module stays failed.
pub async fn next_lesson(
    State(pool): State<SqlitePool>,
    State(content): State<ContentService>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let mut progress = progress::require(&pool, user_id, &module_id).await?;

    let response = match progress.status {
        ProgressStatus::Completed => {
            let latest = attempts::latest_for_progress(&pool, &progress.id).await?;
            AdvanceResponse::Completed {
                message: "Module already completed",
                test_result_id: latest.map(|a| a.id),
            }
        }
        ProgressStatus::Testing => test_ready(&progress),
        ProgressStatus::InProgress => advance(&pool, &content, &mut progress).await?,
        status @ (ProgressStatus::Failed | ProgressStatus::NotStarted) => {
            return Err(TransitionError::InvalidState {
                operation: "advance lesson",
                status,
            }
            .into());
        }
    };

    Ok(Json(response))
}

async fn advance(
    pool: &SqlitePool,
    content: &ContentService,
    progress: &mut Progress,
) -> Result<AdvanceResponse, AppError> {
    let next_lesson = progress.current_lesson + 1;
    let lesson = if progress.current_lesson < progress.total_lessons {
        let lesson = content
            .lesson(&progress.module_id, next_lesson)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", next_lesson)))?;
        Some(lesson)
    } else {
        None
    };

    // Entering the test needs the question set before anything is written.
    let questions = if next_lesson >= progress.total_lessons {
        let questions = content
            .questions(&progress.module_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test questions not found".to_string()))?;
        Some(questions.as_ref().clone())
    } else {
        None
    };

    let step = progress::advance(pool, progress, questions).await?;

    Ok(match (step, lesson) {
        (Advance::Lesson { lesson: number, .. }, Some(lesson)) => AdvanceResponse::Success {
            module_id: progress.module_id.clone(),
            lesson_number: number,
            total_lessons: progress.total_lessons,
            content: lesson.content,
            content_type: lesson.content_type,
            progress_percentage: progress.progress_percentage(),
        },
        _ => test_ready(progress),
    })
}

fn test_ready(progress: &Progress) -> AdvanceResponse {
    AdvanceResponse::ModuleCompleted {
        message: "All lessons completed. Ready for test.",
        test_available: true,
        test_questions: public_questions(progress.frozen_questions()),
    }
}
