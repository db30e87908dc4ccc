// src/handlers/modules.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    services::{catalog, progress},
    utils::jwt::Claims,
};

pub async fn list_modules(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_modules(&pool, None).await?))
}

pub async fn get_module(
    State(pool): State<SqlitePool>,
    Path(module_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let module = catalog::find_module(&pool, &module_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Module not found".to_string()))?;

    Ok(Json(module))
}

/// Starts a module for the caller.
///
/// Calling it again returns the existing progress without resetting it.
pub async fn start_module(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let module = catalog::find_module(&pool, &module_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Module not found".to_string()))?;

    let (progress, created) = progress::start(&pool, user_id, &module).await?;

    let body = if created {
        json!({
            "status": "started",
            "message": "Module started successfully",
            "progress_id": progress.id,
        })
    } else {
        json!({
            "status": "already_started",
            "message": "Module already started",
            "progress_id": progress.id,
        })
    };

    Ok(Json(body))
}
