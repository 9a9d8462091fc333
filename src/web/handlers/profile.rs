//! Profile handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::db::{ProfileData, ProfileRepository, ProfileUpdate, User, UserRepository};
use crate::web::dto::{ApiResponse, UpdateProfileRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

async fn session_user(state: &AppState, email: &str) -> Result<User, ApiError> {
    UserRepository::new(state.db.pool())
        .get_by_email(email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

async fn load_profile(state: &AppState, user_id: &str) -> Result<ProfileData, ApiError> {
    ProfileRepository::new(state.db.pool())
        .get_profile_data(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /api/profile/me - Profile of the signed-in user.
pub async fn get_my_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let user = session_user(&state, &claims.sub).await?;
    let profile = load_profile(&state, &user.id).await?;
    Ok(Json(ApiResponse::new(profile)))
}

/// PUT /api/profile/me - Update the signed-in user's profile.
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let user = session_user(&state, &claims.sub).await?;

    let update: ProfileUpdate = req.into();
    ProfileRepository::new(state.db.pool())
        .upsert(&user.id, &update)
        .await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    let profile = load_profile(&state, &user.id).await?;
    Ok(Json(ApiResponse::new(profile)))
}

/// GET /api/users/:id/profile - Public profile of any user.
pub async fn get_user_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let profile = load_profile(&state, &user_id).await?;
    Ok(Json(ApiResponse::new(profile)))
}
