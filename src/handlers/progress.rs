// src/handlers/progress.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::progress::{OverallProgressResponse, ProgressResponse, ProgressStatus},
    services::{attempts, progress},
    utils::jwt::Claims,
};

/// Dashboard summary across every module the caller has started.
pub async fn get_overall_progress(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let all = progress::list_for_user(&pool, claims.user_id()?).await?;

    let completed_ids: Vec<String> = all
        .iter()
        .filter(|p| p.status == ProgressStatus::Completed)
        .map(|p| p.id.clone())
        .collect();
    let in_progress_modules = all
        .iter()
        .filter(|p| matches!(p.status, ProgressStatus::InProgress | ProgressStatus::Testing))
        .count();

    let average_grade = attempts::average_passing_percentage(&pool, &completed_ids)
        .await?
        .map(to_ten_point_scale);

    Ok(Json(OverallProgressResponse {
        total_modules: all.len(),
        completed_modules: completed_ids.len(),
        in_progress_modules,
        average_grade,
        modules: all.iter().map(ProgressResponse::from).collect(),
    }))
}

pub async fn get_module_progress(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let progress = progress::find(&pool, claims.user_id()?, &module_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Progress not found for this module".to_string()))?;

    Ok(Json(ProgressResponse::from(&progress)))
}

/// Attempt history for the caller's progress on a module.
pub async fn list_attempts(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let progress = progress::find(&pool, claims.user_id()?, &module_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Progress not found for this module".to_string()))?;

    Ok(Json(attempts::list_for_progress(&pool, &progress.id).await?))
}

/// Percentage (0-100) to a 0-10 grade with one decimal.
fn to_ten_point_scale(percentage: f64) -> f64 {
    percentage.round() / 10.0
}
