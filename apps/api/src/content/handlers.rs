use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::content::loader::PageContent;
use crate::content::models::{About, Experience, Hero, Project, SkillCategory};
use crate::errors::AppError;
use crate::state::AppState;

const RESUME_FILE: &str = "resume.pdf";

#[derive(Debug, Deserialize)]
pub struct ProjectFilter {
    pub featured: Option<bool>,
}

/// GET /api/v1/content
pub async fn handle_get_page(State(state): State<AppState>) -> Result<Json<PageContent>, AppError> {
    Ok(Json(state.content.load_page().await?))
}

/// GET /api/v1/content/hero
pub async fn handle_get_hero(State(state): State<AppState>) -> Result<Json<Hero>, AppError> {
    state
        .content
        .load_hero()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Hero section not found".to_string()))
}

/// GET /api/v1/content/about
pub async fn handle_get_about(State(state): State<AppState>) -> Result<Json<About>, AppError> {
    state
        .content
        .load_about()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("About section not found".to_string()))
}

/// GET /api/v1/content/experiences
pub async fn handle_get_experiences(
    State(state): State<AppState>,
) -> Result<Json<Vec<Experience>>, AppError> {
    Ok(Json(state.content.load_experiences().await?))
}

/// GET /api/v1/content/skills
pub async fn handle_get_skills(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillCategory>>, AppError> {
    Ok(Json(state.content.load_skill_categories().await?))
}

/// GET /api/v1/content/projects?featured=true
pub async fn handle_get_projects(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.content.load_projects(filter.featured).await?))
}

/// GET /api/resume/download
///
/// Serves the PDF produced by the external resume renderer.
pub async fn handle_resume_download(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let path = state.config.public_dir.join(RESUME_FILE);
    let pdf = match tokio::fs::read(&path).await {
        Ok(pdf) => Bytes::from(pdf),
        Err(e) => {
            tracing::error!("Error serving resume from {}: {e}", path.display());
            return Err(AppError::NotFound(
                "Resume not found. Generate the PDF into the public directory first.".to_string(),
            ));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"resume.pdf\"",
            ),
            (header::CACHE_CONTROL, "public, max-age=3600, s-maxage=3600"),
        ],
        pdf,
    ))
}
