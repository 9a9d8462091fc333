//! Body extractors and custom validators for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::auth::validation::validate_university_email;
use crate::web::error::ApiError;

/// A JSON extractor whose rejection is an `INVALID_REQUEST` API error.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e.body_text())))?;
        Ok(ApiJson(value))
    }
}

/// A JSON extractor that validates the request body.
///
/// Field-level failures are reported in the error `details` map.
///
/// ```ignore
/// async fn create_project(
///     ValidatedJson(payload): ValidatedJson<CreateProjectRequest>,
/// ) -> Result<Json<ApiResponse<CreatedResponse>>, ApiError> {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ApiJson(value) = ApiJson::<T>::from_request(req, state).await?;
        value.validate().map_err(ApiError::from_validation_errors)?;
        Ok(ValidatedJson(value))
    }
}

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Validate list entries stored in a comma separated column.
///
/// A comma inside an entry would split it in two on the next read.
pub fn no_commas_in_entries(values: &[String]) -> Result<(), validator::ValidationError> {
    if values.iter().any(|value| value.contains(',')) {
        return Err(validator::ValidationError::new("no_commas_in_entries")
            .with_message("Entries must not contain commas".into()));
    }
    Ok(())
}

/// Validate that an email belongs to a university domain.
pub fn university_email(value: &str) -> Result<(), validator::ValidationError> {
    validate_university_email(value).map_err(|e| {
        validator::ValidationError::new("university_email").with_message(e.to_string().into())
    })
}
