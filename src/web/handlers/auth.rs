//! Authentication handlers.

use axum::{extract::State, Extension, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::auth::{authenticate, update_credential, Argon2Hasher, CredentialHasher};
use crate::db::{User, UserRepository};
use crate::web::dto::{
    ApiJson, ApiResponse, LoginRequest, LoginResponse, MessageResponse, UpdatePasswordRequest,
    UserInfo, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, JwtClaims, RateLimitState};
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database pool handle.
    pub db: Database,
    /// Password hasher, run on the blocking pool.
    pub hasher: Arc<dyn CredentialHasher>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
}

impl AppState {
    /// Create a new application state with the production hasher.
    pub fn new(db: Database, jwt_secret: &str, access_expiry: u64) -> Self {
        Self {
            db,
            hasher: Arc::new(Argon2Hasher::new()),
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry: access_expiry,
        }
    }

    /// Replace the password hasher.
    pub fn with_hasher(mut self, hasher: Arc<dyn CredentialHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user.email.clone(),
            name: user.name.clone(),
            role: user.role.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}

/// POST /api/auth/login - Exchange email and password for an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = authenticate(&repo, &state.hasher, &req.email, &req.password).await?;

    let access_token = state.generate_access_token(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(ApiResponse::new(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.access_token_expiry,
        user: UserInfo::from(&user),
    })))
}

/// POST /api/auth/protected/updatePassword - Change the caller's password.
///
/// The session is resolved before the body is parsed, so an unauthenticated
/// call is rejected without looking at the payload. Attempts are counted
/// against the session identity rather than the network address.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Extension(limits): Extension<Arc<RateLimitState>>,
    ApiJson(req): ApiJson<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !limits.check_credential_change(&claims.sub) {
        tracing::warn!(identity = %claims.sub, "Password change rate limit exceeded");
        return Err(ApiError::too_many_requests(
            "Too many attempts. Please try again later.",
        ));
    }

    let repo = UserRepository::new(state.db.pool());
    update_credential(&repo, &state.hasher, Some(&claims.sub), req.into()).await?;

    Ok(Json(ApiResponse::new(MessageResponse::new(
        "Password updated successfully",
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::web::middleware::JwtState;

    #[tokio::test]
    async fn test_generate_access_token_round_trip() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(&NewUser::new("Asha", "asha@ku.edu.np", "unused"))
            .await
            .unwrap();

        let state = AppState::new(db.clone(), "test-secret", 600);
        let token = state.generate_access_token(&user).unwrap();

        let claims = JwtState::new("test-secret").verify(&token).unwrap();
        assert_eq!(claims.sub, "asha@ku.edu.np");
        assert_eq!(claims.name, "Asha");
        assert_eq!(claims.role, "student");
        assert_eq!(claims.exp - claims.iat, 600);
    }
}
