//! Project and collaborator repository for KURCH.
//!
//! Tags, categories and technologies are stored as JSON arrays in text
//! columns and decoded on read.

use serde::Serialize;

use super::DbPool;
use crate::{KurchError, Result};

const PROJECT_COLUMNS: &str = "id, user_id, title, description, abstract AS abstract_text, tags, \
     semester, field_of_study, technologies, categories, views, forks, likes, shares, \
     github_link, report_link, created_at, updated_at";

/// Project row as stored.
#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: String,
    user_id: String,
    title: String,
    description: String,
    abstract_text: String,
    tags: String,
    semester: String,
    field_of_study: String,
    technologies: String,
    categories: String,
    views: i64,
    forks: i64,
    likes: i64,
    shares: i64,
    github_link: Option<String>,
    report_link: Option<String>,
    created_at: String,
    updated_at: Option<String>,
}

/// Collaborator on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Collaborator {
    #[serde(skip)]
    pub id: String,
    pub user_id: Option<String>,
    #[serde(skip)]
    pub project_id: String,
    pub name: String,
    pub role: String,
    pub email: String,
}

/// Collaborator as shown in project listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollaboratorSummary {
    pub name: String,
}

/// Project as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub technologies: Vec<String>,
    pub semester: String,
    pub field_of_study: String,
    pub updated_at: Option<String>,
    pub collaborators: Vec<CollaboratorSummary>,
}

/// Full project details.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub technologies: Vec<String>,
    pub semester: String,
    pub field_of_study: String,
    pub views: i64,
    pub forks: i64,
    pub likes: i64,
    pub shares: i64,
    pub github_link: String,
    pub report_link: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub collaborators: Vec<Collaborator>,
}

/// Data for publishing a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub abstract_text: String,
    pub tags: Vec<String>,
    pub semester: String,
    pub field_of_study: String,
    pub technologies: Vec<String>,
    pub categories: Vec<String>,
    pub github_link: Option<String>,
    pub report_link: Option<String>,
}

/// Data for adding a collaborator to a project.
#[derive(Debug, Clone)]
pub struct NewCollaborator {
    pub user_id: Option<String>,
    pub name: String,
    pub role: String,
    pub email: String,
}

fn decode_list(field: &str, raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| KurchError::Corrupt(format!("project {field} is not a JSON string array: {e}")))
}

fn encode_list(list: &[String]) -> Result<String> {
    serde_json::to_string(list).map_err(|e| KurchError::Corrupt(e.to_string()))
}

/// Repository for projects and their collaborators.
pub struct ProjectRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ProjectRepository<'a> {
    /// Create a new ProjectRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Publish a project together with its collaborators.
    ///
    /// The project and all collaborator rows are written in one transaction.
    /// Returns the new project ID.
    pub async fn create(
        &self,
        project: &NewProject,
        collaborators: &[NewCollaborator],
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO project (id, user_id, title, description, abstract, tags, semester,
                                  field_of_study, technologies, categories, github_link,
                                  report_link, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))",
        )
        .bind(&id)
        .bind(&project.user_id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.abstract_text)
        .bind(encode_list(&project.tags)?)
        .bind(&project.semester)
        .bind(&project.field_of_study)
        .bind(encode_list(&project.technologies)?)
        .bind(encode_list(&project.categories)?)
        .bind(&project.github_link)
        .bind(&project.report_link)
        .execute(&mut *tx)
        .await
        .map_err(|e| KurchError::Database(e.to_string()))?;

        for collaborator in collaborators {
            sqlx::query(
                "INSERT INTO project_collaborators (id, user_id, project_id, name, role, email)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&collaborator.user_id)
            .bind(&id)
            .bind(&collaborator.name)
            .bind(&collaborator.role)
            .bind(&collaborator.email)
            .execute(&mut *tx)
            .await
            .map_err(|e| KurchError::Database(e.to_string()))?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// List collaborators of a project.
    pub async fn list_collaborators(&self, project_id: &str) -> Result<Vec<Collaborator>> {
        let collaborators = sqlx::query_as::<_, Collaborator>(
            "SELECT id, user_id, project_id, name, role, email
             FROM project_collaborators WHERE project_id = ? ORDER BY created_at, rowid",
        )
        .bind(project_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| KurchError::Database(e.to_string()))?;

        Ok(collaborators)
    }

    /// List all projects with their collaborators, most recently updated first.
    pub async fn list_all(&self) -> Result<Vec<ProjectSummary>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM project
             ORDER BY COALESCE(updated_at, created_at) DESC, rowid DESC"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| KurchError::Database(e.to_string()))?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            let collaborators = self
                .list_collaborators(&row.id)
                .await?
                .into_iter()
                .map(|c| CollaboratorSummary { name: c.name })
                .collect();

            projects.push(ProjectSummary {
                tags: decode_list("tags", &row.tags)?,
                categories: decode_list("categories", &row.categories)?,
                technologies: decode_list("technologies", &row.technologies)?,
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                description: row.description,
                semester: row.semester,
                field_of_study: row.field_of_study,
                updated_at: row.updated_at,
                collaborators,
            });
        }

        Ok(projects)
    }

    /// Get full details for a project.
    pub async fn get_details(&self, id: &str) -> Result<Option<ProjectDetails>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = ?");
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| KurchError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let collaborators = self.list_collaborators(&row.id).await?;

        Ok(Some(ProjectDetails {
            tags: decode_list("tags", &row.tags)?,
            categories: decode_list("categories", &row.categories)?,
            technologies: decode_list("technologies", &row.technologies)?,
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            abstract_text: row.abstract_text,
            semester: row.semester,
            field_of_study: row.field_of_study,
            views: row.views,
            forks: row.forks,
            likes: row.likes,
            shares: row.shares,
            github_link: row.github_link.unwrap_or_default(),
            report_link: row.report_link.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            collaborators,
        }))
    }

    /// Increment the view counter of a project.
    ///
    /// Returns false if the project doesn't exist.
    pub async fn record_view(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE project SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| KurchError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
