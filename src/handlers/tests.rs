// src/handlers/tests.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    grading::{grade, resolve_next_module},
    models::{
        attempt::{SubmitTestRequest, TestResultResponse},
        progress::{ProgressStatus, TransitionError},
        question::public_questions,
    },
    services::{attempts, progress},
    utils::jwt::Claims,
};

/// Returns the caller's frozen test questions without correct answers.
pub async fn get_test_questions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let progress = progress::require(&pool, claims.user_id()?, &module_id).await?;

    if progress.status != ProgressStatus::Testing {
        return Err(AppError::BadRequest(
            "Test not available. Complete all lessons first.".to_string(),
        ));
    }

    Ok(Json(serde_json::json!({
        "module_id": progress.module_id,
        "questions": public_questions(progress.frozen_questions()),
    })))
}

/// Grades a test submission.
///
/// * Grades against the question set frozen when the test opened.
/// * Records the outcome on the progress and appends the attempt in one
///   transaction; either both land or neither does.
/// * Adds an advisory next-module hint on a pass.
pub async fn submit_test(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<String>,
    Json(req): Json<SubmitTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut progress = progress::require(&pool, claims.user_id()?, &module_id).await?;

    if progress.status != ProgressStatus::Testing {
        return Err(TransitionError::InvalidState {
            operation: "submit test",
            status: progress.status,
        }
        .into());
    }

    let result = grade(
        &req.answers,
        progress.frozen_questions(),
        config.passing_threshold,
    )
    .inspect_err(|e| tracing::error!("Cannot grade module {}: {}", module_id, e))?;

    let mut tx = pool.begin().await?;
    progress::record_outcome(&mut tx, &mut progress, result.passed).await?;
    let attempt = attempts::record(&mut tx, &progress, &result, &req.answers).await?;
    tx.commit().await?;

    let next_module_unlocked = resolve_next_module(&module_id, result.passed);

    tracing::info!(
        "User {} submitted module {} test: {}% (passed: {})",
        progress.user_id,
        module_id,
        result.percentage,
        result.passed
    );

    Ok(Json(TestResultResponse {
        status: "test_completed",
        result_id: attempt.id,
        score: attempt.score,
        max_score: attempt.max_score,
        percentage: attempt.percentage,
        passed: attempt.passed,
        detailed_results: result.detailed_results,
        attempt_number: attempt.attempt_number,
        next_module_unlocked,
    }))
}

/// Returns one stored attempt, only to the user who owns it.
pub async fn get_test_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(result_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = attempts::find(&pool, &result_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test result not found".to_string()))?;

    let owner: Option<i64> = sqlx::query_scalar("SELECT user_id FROM user_progress WHERE id = ?1")
        .bind(&attempt.progress_id)
        .fetch_optional(&pool)
        .await?;

    if owner != Some(claims.user_id()?) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(Json(attempt))
}
