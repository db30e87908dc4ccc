// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, courses, lessons, modules, progress, tests},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public register/login routes and a health check.
/// * Everything else behind the JWT middleware.
/// * Global Trace and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let protected_routes = Router::new()
        .route("/courses", get(courses::list_courses))
        .route("/courses/{course_id}", get(courses::get_course))
        .route("/modules", get(modules::list_modules))
        .route("/modules/{module_id}", get(modules::get_module))
        .route("/modules/{module_id}/start", post(modules::start_module))
        .route("/modules/{module_id}/next", post(lessons::next_lesson))
        .route(
            "/modules/{module_id}/test",
            get(tests::get_test_questions).post(tests::submit_test),
        )
        .route("/tests/results/{result_id}", get(tests::get_test_result))
        .route("/progress", get(progress::get_overall_progress))
        .route("/progress/{module_id}", get(progress::get_module_progress))
        .route("/progress/{module_id}/attempts", get(progress::list_attempts))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .nest("/api/v1", api)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
