// src/services/attempts.rs

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool, types::Json};

use crate::{
    grading::{GradeResult, SubmittedAnswer},
    models::{attempt::Attempt, progress::Progress},
};

const ATTEMPT_COLUMNS: &str = r"
    id, progress_id, module_id, score, max_score, percentage, passed,
    answers, detailed_results, attempt_number, completed_at
";

/// Appends an immutable attempt for `progress`.
///
/// `attempt_number` is the count of existing attempts plus one. Run this in
/// the same transaction as `progress::record_outcome`, after it, so the count
/// is read while the progress row is locked.
pub async fn record(
    conn: &mut SqliteConnection,
    progress: &Progress,
    result: &GradeResult,
    submission: &[SubmittedAnswer],
) -> Result<Attempt, sqlx::Error> {
    let previous: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM test_results WHERE progress_id = ?1")
            .bind(&progress.id)
            .fetch_one(&mut *conn)
            .await?;

    let attempt = Attempt {
        id: uuid::Uuid::new_v4().to_string(),
        progress_id: progress.id.clone(),
        module_id: progress.module_id.clone(),
        score: i64::from(result.score),
        max_score: i64::from(result.max_score),
        percentage: i64::from(result.percentage),
        passed: result.passed,
        answers: Json(submission.to_vec()),
        detailed_results: Json(result.detailed_results.clone()),
        attempt_number: previous + 1,
        completed_at: Utc::now(),
    };

    sqlx::query(
        r"
        INSERT INTO test_results (
            id, progress_id, module_id, score, max_score, percentage, passed,
            answers, detailed_results, attempt_number, completed_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ",
    )
    .bind(&attempt.id)
    .bind(&attempt.progress_id)
    .bind(&attempt.module_id)
    .bind(attempt.score)
    .bind(attempt.max_score)
    .bind(attempt.percentage)
    .bind(attempt.passed)
    .bind(&attempt.answers)
    .bind(&attempt.detailed_results)
    .bind(attempt.attempt_number)
    .bind(attempt.completed_at)
    .execute(&mut *conn)
    .await?;

    tracing::info!(
        "Recorded attempt #{} for progress {} ({}/{}, passed: {})",
        attempt.attempt_number,
        attempt.progress_id,
        attempt.score,
        attempt.max_score,
        attempt.passed
    );

    Ok(attempt)
}

pub async fn find(pool: &SqlitePool, attempt_id: &str) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM test_results WHERE id = ?1"
    ))
    .bind(attempt_id)
    .fetch_optional(pool)
    .await
}

/// Attempt history for one progress record, oldest first.
pub async fn list_for_progress(
    pool: &SqlitePool,
    progress_id: &str,
) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM test_results WHERE progress_id = ?1 ORDER BY attempt_number"
    ))
    .bind(progress_id)
    .fetch_all(pool)
    .await
}

pub async fn latest_for_progress(
    pool: &SqlitePool,
    progress_id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM test_results WHERE progress_id = ?1 ORDER BY attempt_number DESC LIMIT 1"
    ))
    .bind(progress_id)
    .fetch_optional(pool)
    .await
}

/// Mean percentage over passing attempts of the given progress records.
pub async fn average_passing_percentage(
    pool: &SqlitePool,
    progress_ids: &[String],
) -> Result<Option<f64>, sqlx::Error> {
    if progress_ids.is_empty() {
        return Ok(None);
    }

    let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
        "SELECT AVG(percentage) FROM test_results WHERE passed = 1 AND progress_id IN (",
    );
    let mut separated = builder.separated(",");
    for id in progress_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    builder
        .build_query_scalar::<Option<f64>>()
        .fetch_one(pool)
        .await
}
