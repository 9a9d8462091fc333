//! User profile repository for KURCH.

use serde::Serialize;

use super::DbPool;
use crate::{KurchError, Result};

/// University every profile belongs to.
pub const UNIVERSITY_NAME: &str = "Kathmandu University";

/// Joined user + profile row as stored.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    name: Option<String>,
    email: String,
    title: Option<String>,
    department: Option<String>,
    bio: Option<String>,
    website: Option<String>,
    education: Option<String>,
    location: Option<String>,
    orcid_id: Option<String>,
    google_scholar: Option<String>,
    research_interests: Option<String>,
}

/// Public profile view of a user.
///
/// Missing profile fields are rendered as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub title: String,
    pub university: String,
    pub location: String,
    pub education: String,
    pub bio: String,
    pub research_interests: Vec<String>,
    pub department: String,
    pub google_scholar: String,
    pub website: String,
    pub orcid: String,
}

impl From<ProfileRow> for ProfileData {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "User".to_string()),
            email: row.email,
            title: row.title.unwrap_or_default(),
            university: UNIVERSITY_NAME.to_string(),
            location: row.location.unwrap_or_default(),
            education: row.education.unwrap_or_default(),
            bio: row.bio.unwrap_or_default(),
            research_interests: split_interests(row.research_interests.as_deref()),
            department: row.department.unwrap_or_default(),
            google_scholar: row.google_scholar.unwrap_or_default(),
            website: row.website.unwrap_or_default(),
            orcid: row.orcid_id.unwrap_or_default(),
        }
    }
}

/// Split a comma separated interest list, dropping blank entries.
fn split_interests(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Profile fields to write. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub title: Option<String>,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub education: Option<String>,
    pub location: Option<String>,
    pub orcid_id: Option<String>,
    pub google_scholar: Option<String>,
    pub research_interests: Option<Vec<String>>,
}

/// Repository for user profiles.
pub struct ProfileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new ProfileRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get the profile view for a user ID.
    ///
    /// Returns None if the user doesn't exist. A user without a profile
    /// row still gets a view with empty fields.
    pub async fn get_profile_data(&self, user_id: &str) -> Result<Option<ProfileData>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT u.id, u.name, u.email, p.title, p.department, p.bio, p.website,
                    p.education, p.location, p.orcid_id, p.google_scholar, p.research_interests
             FROM users u
             LEFT JOIN user_profile p ON p.user_id = u.id
             WHERE u.id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| KurchError::Database(e.to_string()))?;

        Ok(row.map(ProfileData::from))
    }

    /// Create or update the profile row for a user.
    pub async fn upsert(&self, user_id: &str, update: &ProfileUpdate) -> Result<()> {
        let interests = update
            .research_interests
            .as_ref()
            .map(|list| list.join(", "));

        sqlx::query(
            "INSERT INTO user_profile (user_id, title, department, bio, website, education,
                                       location, orcid_id, google_scholar, research_interests)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                title = COALESCE(excluded.title, title),
                department = COALESCE(excluded.department, department),
                bio = COALESCE(excluded.bio, bio),
                website = COALESCE(excluded.website, website),
                education = COALESCE(excluded.education, education),
                location = COALESCE(excluded.location, location),
                orcid_id = COALESCE(excluded.orcid_id, orcid_id),
                google_scholar = COALESCE(excluded.google_scholar, google_scholar),
                research_interests = COALESCE(excluded.research_interests, research_interests),
                updated_at = datetime('now')",
        )
        .bind(user_id)
        .bind(&update.title)
        .bind(&update.department)
        .bind(&update.bio)
        .bind(&update.website)
        .bind(&update.education)
        .bind(&update.location)
        .bind(&update.orcid_id)
        .bind(&update.google_scholar)
        .bind(interests)
        .execute(self.pool)
        .await
        .map_err(|e| KurchError::Database(e.to_string()))?;

        Ok(())
    }
}
