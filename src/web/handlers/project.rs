//! Project handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::db::{ProjectDetails, ProjectRepository, ProjectSummary, UserRepository};
use crate::web::dto::{ApiResponse, CreateProjectRequest, CreatedResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// GET /api/projects - All published projects, most recently changed first.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProjectSummary>>>, ApiError> {
    let projects = ProjectRepository::new(state.db.pool()).list_all().await?;
    Ok(Json(ApiResponse::new(projects)))
}

/// GET /api/projects/:id - Project details. Counts as a view.
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProjectDetails>>, ApiError> {
    let repo = ProjectRepository::new(state.db.pool());

    if !repo.record_view(&id).await? {
        return Err(ApiError::not_found("Project not found"));
    }

    let details = repo
        .get_details(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    Ok(Json(ApiResponse::new(details)))
}

/// POST /api/projects - Publish a project owned by the signed-in user.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ApiError> {
    let owner = UserRepository::new(state.db.pool())
        .get_by_email(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let (project, collaborators) = req.into_new_project(owner.id.clone());
    let id = ProjectRepository::new(state.db.pool())
        .create(&project, &collaborators)
        .await?;
    tracing::info!(user_id = %owner.id, project_id = %id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CreatedResponse { id })),
    ))
}
