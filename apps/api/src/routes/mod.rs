pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::contact::handlers as contact;
use crate::content::handlers as content;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Content API
        .route("/api/v1/content", get(content::handle_get_page))
        .route("/api/v1/content/hero", get(content::handle_get_hero))
        .route("/api/v1/content/about", get(content::handle_get_about))
        .route(
            "/api/v1/content/experiences",
            get(content::handle_get_experiences),
        )
        .route("/api/v1/content/skills", get(content::handle_get_skills))
        .route(
            "/api/v1/content/projects",
            get(content::handle_get_projects),
        )
        .route(
            "/api/resume/download",
            get(content::handle_resume_download),
        )
        // Contact API
        .route("/api/v1/contact", post(contact::handle_contact))
        .with_state(state)
}
