// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub is_active: bool,
}

/// Represents the 'modules' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub course_id: Option<String>,
    pub title: String,
    pub description: Option<String>,

    /// Number of lessons before the module test opens.
    pub total_lessons: i64,

    pub order_index: i64,
    pub is_active: bool,
}

/// Aggregated course with its ordered modules.
#[derive(Debug, Serialize)]
pub struct CourseWithModules {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<Module>,
}

/// `catalog.json` document seeded at startup.
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub courses: Vec<CatalogCourse>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogCourse {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub modules: Vec<CatalogModule>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub total_lessons: u32,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}
