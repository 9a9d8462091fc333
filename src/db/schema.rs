//! Database schema and migrations for KURCH.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded; the schema_version table tracks which have been applied.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Users table
    r#"
CREATE TABLE users (
    id              TEXT PRIMARY KEY,            -- UUID v4
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash   TEXT,                        -- Argon2 PHC string, NULL for external-provider accounts
    provider        TEXT NOT NULL DEFAULT 'credentials',
    profile_pic     TEXT,
    role            TEXT NOT NULL DEFAULT 'student',  -- 'student', 'faculty', 'admin'
    is_verified     INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_role ON users(role);
"#,
    // v2: Optional per-user profile
    r#"
CREATE TABLE user_profile (
    user_id             TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    title               TEXT,
    department          TEXT,
    bio                 TEXT,
    website             TEXT,
    education           TEXT,
    location            TEXT,
    orcid_id            TEXT,
    google_scholar      TEXT,
    research_interests  TEXT,                    -- comma separated
    created_at          TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v3: Projects and their collaborators
    r#"
CREATE TABLE project (
    id              TEXT PRIMARY KEY,            -- UUID v4
    user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    abstract        TEXT NOT NULL,
    tags            TEXT NOT NULL,               -- JSON array of strings
    semester        TEXT NOT NULL,
    field_of_study  TEXT NOT NULL,
    technologies    TEXT NOT NULL,               -- JSON array of strings
    categories      TEXT NOT NULL,               -- JSON array of strings
    views           INTEGER NOT NULL DEFAULT 0,
    forks           INTEGER NOT NULL DEFAULT 0,
    likes           INTEGER NOT NULL DEFAULT 0,
    shares          INTEGER NOT NULL DEFAULT 0,
    github_link     TEXT,
    report_link     TEXT,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at      TEXT
);

CREATE INDEX idx_project_user_id ON project(user_id);

CREATE TABLE project_collaborators (
    id          TEXT PRIMARY KEY,                -- UUID v4
    user_id     TEXT,
    project_id  TEXT NOT NULL REFERENCES project(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    role        TEXT NOT NULL,
    email       TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_project_collaborators_project_id ON project_collaborators(project_id);
"#,
];
