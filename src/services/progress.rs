// src/services/progress.rs

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::{
        course::Module,
        progress::{Advance, Progress, ProgressStatus, TransitionError},
        question::Question,
    },
};

const PROGRESS_COLUMNS: &str = r"
    id, user_id, module_id, current_lesson, total_lessons, status,
    test_questions, started_at, updated_at, completed_at
";

/// Loads the caller's progress on a module, if any.
pub async fn find(
    pool: &SqlitePool,
    user_id: i64,
    module_id: &str,
) -> Result<Option<Progress>, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = ?1 AND module_id = ?2"
    ))
    .bind(user_id)
    .bind(module_id)
    .fetch_optional(pool)
    .await
}

/// Like `find`, but a missing record is `NotFound`.
pub async fn require(
    pool: &SqlitePool,
    user_id: i64,
    module_id: &str,
) -> Result<Progress, AppError> {
    find(pool, user_id, module_id).await?.ok_or_else(|| {
        AppError::NotFound("Module not started. Please start the module first.".to_string())
    })
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Progress>, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = ?1 ORDER BY started_at, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Starts `module` for `user_id`.
///
/// Idempotent: an existing record is returned untouched. The boolean is
/// `true` only when this call created the record.
pub async fn start(
    pool: &SqlitePool,
    user_id: i64,
    module: &Module,
) -> Result<(Progress, bool), sqlx::Error> {
    let fresh = Progress::new(user_id, &module.id, module.total_lessons, Utc::now());

    let inserted = sqlx::query(
        r"
        INSERT INTO user_progress (
            id, user_id, module_id, current_lesson, total_lessons, status,
            started_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(user_id, module_id) DO NOTHING
        ",
    )
    .bind(&fresh.id)
    .bind(fresh.user_id)
    .bind(&fresh.module_id)
    .bind(fresh.current_lesson)
    .bind(fresh.total_lessons)
    .bind(fresh.status)
    .bind(fresh.started_at)
    .bind(fresh.updated_at)
    .execute(pool)
    .await?
    .rows_affected()
        == 1;

    let progress = find(pool, user_id, &module.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    if inserted {
        tracing::info!(
            "User {} started module {} ({} lessons)",
            user_id,
            module.id,
            module.total_lessons
        );
    }

    Ok((progress, inserted))
}

/// Applies `Progress::advance` and persists it.
///
/// The update only matches the state the transition was computed from, so a
/// concurrent advance on the same record turns into `Conflict` instead of
/// skipping a lesson. `questions` must be supplied whenever the advance enters
/// `testing`; they become the frozen question set for grading.
pub async fn advance(
    pool: &SqlitePool,
    progress: &mut Progress,
    questions: Option<Vec<Question>>,
) -> Result<Advance, AppError> {
    let previous_lesson = progress.current_lesson;
    let step = progress.advance(Utc::now())?;

    if progress.status == ProgressStatus::Testing {
        progress.test_questions = questions.map(Json);
    }

    let updated = sqlx::query(
        r"
        UPDATE user_progress
        SET current_lesson = ?1, status = ?2, test_questions = ?3, updated_at = ?4
        WHERE id = ?5 AND status = ?6 AND current_lesson = ?7
        ",
    )
    .bind(progress.current_lesson)
    .bind(progress.status)
    .bind(&progress.test_questions)
    .bind(progress.updated_at)
    .bind(&progress.id)
    .bind(ProgressStatus::InProgress)
    .bind(previous_lesson)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Progress was updated concurrently, please retry".to_string(),
        ));
    }

    if progress.status == ProgressStatus::Testing {
        tracing::info!(
            "Progress {} entered testing for module {}",
            progress.id,
            progress.module_id
        );
    }

    Ok(step)
}

/// Applies `Progress::record_outcome` inside the caller's transaction.
///
/// Must be the first write of the submission transaction: the conditional
/// update takes the write lock on the progress row, which serializes attempt
/// numbering for that record. A submission that lost the race sees zero
/// affected rows and fails with `InvalidState`.
pub async fn record_outcome(
    conn: &mut SqliteConnection,
    progress: &mut Progress,
    passed: bool,
) -> Result<(), AppError> {
    progress.record_outcome(passed, Utc::now())?;

    let updated = sqlx::query(
        r"
        UPDATE user_progress
        SET status = ?1, completed_at = ?2, updated_at = ?3
        WHERE id = ?4 AND status = ?5
        ",
    )
    .bind(progress.status)
    .bind(progress.completed_at)
    .bind(progress.updated_at)
    .bind(&progress.id)
    .bind(ProgressStatus::Testing)
    .execute(&mut *conn)
    .await?;

    if updated.rows_affected() == 0 {
        let current: Option<ProgressStatus> =
            sqlx::query_scalar("SELECT status FROM user_progress WHERE id = ?1")
                .bind(&progress.id)
                .fetch_optional(&mut *conn)
                .await?;

        return Err(TransitionError::InvalidState {
            operation: "submit test",
            status: current.unwrap_or(ProgressStatus::NotStarted),
        }
        .into());
    }

    Ok(())
}
