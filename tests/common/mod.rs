// tests/common/mod.rs

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use lms_backend::{
    config::Config,
    db,
    models::course::{Catalog, CatalogCourse, CatalogModule},
    routes,
    services::{
        catalog,
        content::{ContentService, LocalContentStore},
    },
    state::AppState,
};
use serde_json::Value;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub content_root: PathBuf,
    pub client: reqwest::Client,
}

/// Fresh in-memory database with the schema applied.
///
/// A single connection that never expires keeps the in-memory database alive.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    db::migrate(&pool).await.expect("Failed to migrate database");
    pool
}

pub fn temp_content_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("lms_content_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("Failed to create content root");
    root
}

/// Writes `lesson_NN.md` files 1..=count for a module.
pub fn write_lessons(root: &PathBuf, module_id: &str, count: i64) {
    let dir = root.join("lessons").join(module_id);
    std::fs::create_dir_all(&dir).unwrap();
    for n in 1..=count {
        std::fs::write(
            dir.join(format!("lesson_{:02}.md", n)),
            format!("# {} lesson {}", module_id, n),
        )
        .unwrap();
    }
}

pub fn write_questions(root: &PathBuf, module_id: &str, questions: Value) {
    let dir = root.join("tests").join(module_id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("test_questions.json"),
        serde_json::to_string(&serde_json::json!({ "questions": questions })).unwrap(),
    )
    .unwrap();
}

pub async fn seed_module(pool: &SqlitePool, module_id: &str, total_lessons: u32) {
    let catalog = Catalog {
        courses: vec![CatalogCourse {
            id: "python".to_string(),
            title: "Python".to_string(),
            description: None,
            order_index: 0,
            is_active: true,
            modules: vec![CatalogModule {
                id: module_id.to_string(),
                title: format!("{} title", module_id),
                description: None,
                total_lessons,
                order_index: 0,
                is_active: true,
            }],
        }],
    };
    catalog::seed(pool, &catalog).await.expect("Failed to seed module");
}

/// App state over an in-memory database and a temporary content directory.
pub async fn test_state() -> (AppState, PathBuf) {
    let pool = test_pool().await;
    let content_root = temp_content_root();

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        content_root: content_root.clone(),
        content_cache_ttl_secs: 3600,
        passing_threshold: 0.7,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        allowed_origins: vec!["http://localhost:3000".to_string()],
    };

    let content = ContentService::new(
        Arc::new(LocalContentStore::new(&content_root)),
        Duration::from_secs(config.content_cache_ttl_secs),
    );

    let state = AppState {
        pool,
        config,
        content,
    };
    (state, content_root)
}

/// Spawns the app on a random port.
pub async fn spawn_app() -> TestApp {
    let (state, content_root) = test_state().await;
    let pool = state.pool.clone();
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        content_root,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    /// Registers a fresh user and returns a bearer token.
    pub async fn login_new_user(&self) -> String {
        let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
        let password = "password123";

        let register = self
            .client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Register failed");
        assert_eq!(register.status().as_u16(), 201);

        let login: Value = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        login["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn post(&self, token: &str, path: &str, body: Option<Value>) -> reqwest::Response {
        let mut request = self.client.post(self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
