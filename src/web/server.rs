//! Web server for KURCH.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{ServerConfig, WebConfig};
use crate::{Database, KurchError, Result};

use super::handlers::AppState;
use super::middleware::{JwtState, RateLimitState};
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(server: &ServerConfig, web: &WebConfig, db: Database) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| {
                KurchError::Config(format!(
                    "invalid listen address {}:{}: {e}",
                    server.host, server.port
                ))
            })?;

        let app_state = AppState::new(db, &web.jwt_secret, web.jwt_access_token_expiry_secs);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state: Arc::new(JwtState::new(&web.jwt_secret)),
            rate_limit: Arc::new(
                RateLimitState::new(web.auth_rate_limit, web.api_rate_limit)
                    .with_trusted_proxy_headers(web.trust_proxy_headers),
            ),
            cors_origins: web.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn bind(self) -> std::io::Result<(TcpListener, Router)> {
        let router = create_router(
            self.app_state,
            self.jwt_state,
            self.rate_limit.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;
        self.rate_limit.start_cleanup_task();

        tracing::info!("Web server listening on http://{}", listener.local_addr()?);
        Ok((listener, router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for tests binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_configs() -> (ServerConfig, WebConfig) {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let web = WebConfig {
            jwt_secret: "test-secret-key".to_string(),
            ..Default::default()
        };
        (server, web)
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let (server_config, web_config) = test_configs();
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&server_config, &web_config, db).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_web_server_rejects_bad_host() {
        let (mut server_config, web_config) = test_configs();
        server_config.host = "not a host".to_string();
        let db = Database::open_in_memory().await.unwrap();

        assert!(matches!(
            WebServer::new(&server_config, &web_config, db),
            Err(KurchError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let (server_config, web_config) = test_configs();
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&server_config, &web_config, db).unwrap();
        let addr = server.run_with_addr().await.unwrap();
        assert_ne!(addr.port(), 0);

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("OK"));
    }
}
