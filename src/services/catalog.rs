// src/services/catalog.rs

use std::path::Path;

use sqlx::SqlitePool;

use crate::models::course::{Catalog, Course, Module};

const MODULE_COLUMNS: &str =
    "id, course_id, title, description, total_lessons, order_index, is_active";

/// Looks up an active module; inactive modules are treated as missing.
pub async fn find_module(pool: &SqlitePool, module_id: &str) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        "SELECT {MODULE_COLUMNS} FROM modules WHERE id = ?1 AND is_active = 1"
    ))
    .bind(module_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_modules(
    pool: &SqlitePool,
    course_id: Option<&str>,
) -> Result<Vec<Module>, sqlx::Error> {
    let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
        "SELECT {MODULE_COLUMNS} FROM modules WHERE is_active = 1"
    ));
    if let Some(course_id) = course_id {
        builder.push(" AND course_id = ").push_bind(course_id);
    }
    builder.push(" ORDER BY order_index, id");

    builder.build_query_as::<Module>().fetch_all(pool).await
}

pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, title, description, order_index, is_active FROM courses WHERE is_active = 1 ORDER BY order_index, id",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_course(pool: &SqlitePool, course_id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, title, description, order_index, is_active FROM courses WHERE id = ?1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

/// Upserts every course and module of `catalog` in one transaction.
pub async fn seed(pool: &SqlitePool, catalog: &Catalog) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for course in &catalog.courses {
        sqlx::query(
            r"
            INSERT INTO courses (id, title, description, order_index, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                order_index = excluded.order_index,
                is_active = excluded.is_active
            ",
        )
        .bind(&course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.order_index)
        .bind(course.is_active)
        .execute(&mut *tx)
        .await?;

        for module in &course.modules {
            sqlx::query(
                r"
                INSERT INTO modules (
                    id, course_id, title, description, total_lessons, order_index, is_active
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    course_id = excluded.course_id,
                    title = excluded.title,
                    description = excluded.description,
                    total_lessons = excluded.total_lessons,
                    order_index = excluded.order_index,
                    is_active = excluded.is_active
                ",
            )
            .bind(&module.id)
            .bind(&course.id)
            .bind(&module.title)
            .bind(&module.description)
            .bind(i64::from(module.total_lessons))
            .bind(module.order_index)
            .bind(module.is_active)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Seeds `<content_root>/catalog.json` when present.
pub async fn seed_from_dir(
    pool: &SqlitePool,
    content_root: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = content_root.join("catalog.json");
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No catalog at {}, skipping seed", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let catalog: Catalog = serde_json::from_str(&raw)?;
    seed(pool, &catalog).await?;

    tracing::info!(
        "Seeded {} course(s) from {}",
        catalog.courses.len(),
        path.display()
    );
    Ok(())
}
