//! Shared helpers for Web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use kurch::config::WebConfig;
use kurch::db::{NewUser, User, UserRepository};
use kurch::web::handlers::AppState;
use kurch::web::middleware::{JwtClaims, JwtState, RateLimitState};
use kurch::web::router::{create_health_router, create_router};
use kurch::{Argon2Hasher, CredentialHasher, Database};

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// A test API with direct access to its database.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub hasher: Arc<Argon2Hasher>,
}

/// Create a test configuration with generous rate limits.
pub fn create_test_config() -> WebConfig {
    WebConfig {
        cors_origins: vec![],
        jwt_secret: JWT_SECRET.to_string(),
        jwt_access_token_expiry_secs: 900,
        auth_rate_limit: 1000,
        api_rate_limit: 1000,
        trust_proxy_headers: false,
    }
}

/// Test configuration with the given credential and API quotas.
pub fn create_test_config_with_limits(auth_rate_limit: u32, api_rate_limit: u32) -> WebConfig {
    WebConfig {
        auth_rate_limit,
        api_rate_limit,
        ..create_test_config()
    }
}

/// Create a test server with an in-memory database and a low-cost hasher.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_config(create_test_config()).await
}

/// Create a test server from the given web configuration.
pub async fn create_test_app_with_config(config: WebConfig) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let hasher = Arc::new(Argon2Hasher::with_cost(8, 1, 1).expect("valid Argon2 params"));

    let app_state = Arc::new(
        AppState::new(
            db.clone(),
            &config.jwt_secret,
            config.jwt_access_token_expiry_secs,
        )
        .with_hasher(hasher.clone()),
    );
    let jwt_state = Arc::new(JwtState::new(&config.jwt_secret));
    let rate_limit = Arc::new(
        RateLimitState::new(config.auth_rate_limit, config.api_rate_limit)
            .with_trusted_proxy_headers(config.trust_proxy_headers),
    );

    let router = create_router(app_state, jwt_state, rate_limit, &config.cors_origins)
        .merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, db, hasher }
}

impl TestApp {
    /// Insert a user with a local password.
    pub async fn seed_user(&self, name: &str, email: &str, password: &str) -> User {
        let hash = self.hasher.hash(password).expect("hash password");
        UserRepository::new(self.db.pool())
            .create(&NewUser::new(name, email, hash))
            .await
            .expect("create user")
    }

    /// Insert a user that signs in through an external provider.
    pub async fn seed_external_user(&self, name: &str, email: &str) -> User {
        UserRepository::new(self.db.pool())
            .create(&NewUser::external(name, email, "google"))
            .await
            .expect("create user")
    }

    /// Stored password hash for an email.
    pub async fn stored_hash(&self, email: &str) -> Option<String> {
        UserRepository::new(self.db.pool())
            .get_password_hash(email)
            .await
            .expect("read password hash")
    }

    /// Whether the stored hash for `email` verifies `password`.
    pub async fn password_matches(&self, email: &str, password: &str) -> bool {
        match self.stored_hash(email).await {
            Some(hash) => self.hasher.verify(password, &hash).expect("verify"),
            None => false,
        }
    }
}

/// Mint a valid access token for any email, registered or not.
pub fn token_for(email: &str) -> String {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = JwtClaims {
        sub: email.to_string(),
        name: "Test".to_string(),
        role: "student".to_string(),
        iat: now,
        exp: now + 900,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}

/// Authorization header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
