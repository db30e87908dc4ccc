// src/handlers/courses.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{error::AppError, models::course::CourseWithModules, services::catalog};

/// Lists active courses, each with its active modules in order.
pub async fn list_courses(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let courses = catalog::list_courses(&pool).await?;

    let mut result = Vec::with_capacity(courses.len());
    for course in courses {
        let modules = catalog::list_modules(&pool, Some(&course.id)).await?;
        result.push(CourseWithModules { course, modules });
    }

    Ok(Json(result))
}

/// Returns one active course with its modules.
pub async fn get_course(
    State(pool): State<SqlitePool>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let course = catalog::find_course(&pool, &course_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let modules = catalog::list_modules(&pool, Some(&course.id)).await?;

    Ok(Json(CourseWithModules { course, modules }))
}
