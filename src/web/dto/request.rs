//! Request DTOs for the Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{
    no_commas_in_entries, no_control_chars, not_empty_trimmed, university_email,
};
use crate::auth::CredentialUpdateRequest;
use crate::db::{NewCollaborator, NewProject, ProfileUpdate};

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// University email address.
    #[validate(custom(function = "university_email"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password change request.
///
/// Both fields are optional at the wire level so that an absent field is
/// reported by the credential workflow as a missing field rather than a
/// malformed body.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// Current password.
    pub current_password: Option<String>,
    /// Requested new password.
    pub new_password: Option<String>,
}

impl std::fmt::Debug for UpdatePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdatePasswordRequest")
            .field("current_password", &self.current_password.as_ref().map(|_| "***"))
            .field("new_password", &self.new_password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl From<UpdatePasswordRequest> for CredentialUpdateRequest {
    fn from(req: UpdatePasswordRequest) -> Self {
        CredentialUpdateRequest {
            current_credential: req.current_password,
            new_credential: req.new_password,
        }
    }
}

/// Profile update request. Absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate, Default)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100), custom(function = "no_control_chars"))]
    pub title: Option<String>,
    #[validate(length(max = 100), custom(function = "no_control_chars"))]
    pub department: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 500))]
    pub education: Option<String>,
    #[validate(length(max = 100), custom(function = "no_control_chars"))]
    pub location: Option<String>,
    #[validate(length(max = 50))]
    pub orcid_id: Option<String>,
    #[validate(url)]
    pub google_scholar: Option<String>,
    #[validate(length(max = 20), custom(function = "no_commas_in_entries"))]
    pub research_interests: Option<Vec<String>>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            title: req.title,
            department: req.department,
            bio: req.bio,
            website: req.website,
            education: req.education,
            location: req.location,
            orcid_id: req.orcid_id,
            google_scholar: req.google_scholar,
            research_interests: req.research_interests.map(|interests| {
                interests
                    .into_iter()
                    .map(|i| i.trim().to_string())
                    .filter(|i| !i.is_empty())
                    .collect()
            }),
        }
    }
}

/// Collaborator entry in a project submission.
#[derive(Debug, Deserialize, Validate)]
pub struct CollaboratorRequest {
    pub user_id: Option<String>,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub role: String,
    #[validate(email)]
    pub email: String,
}

/// Project submission request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub title: String,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 10000))]
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub categories: Vec<String>,
    #[validate(length(max = 30))]
    #[serde(default)]
    pub technologies: Vec<String>,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub semester: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub field_of_study: String,
    #[validate(url)]
    pub github_link: Option<String>,
    #[validate(url)]
    pub report_link: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub collaborators: Vec<CollaboratorRequest>,
}

impl CreateProjectRequest {
    /// Split into storage records owned by `user_id`.
    pub fn into_new_project(self, user_id: String) -> (NewProject, Vec<NewCollaborator>) {
        let collaborators = self
            .collaborators
            .into_iter()
            .map(|c| NewCollaborator {
                user_id: c.user_id,
                name: c.name.trim().to_string(),
                role: c.role,
                email: c.email,
            })
            .collect();

        let project = NewProject {
            user_id,
            title: self.title.trim().to_string(),
            description: self.description,
            abstract_text: self.abstract_text,
            tags: self.tags,
            semester: self.semester,
            field_of_study: self.field_of_study,
            technologies: self.technologies,
            categories: self.categories,
            github_link: self.github_link,
            report_link: self.report_link,
        };

        (project, collaborators)
    }
}
