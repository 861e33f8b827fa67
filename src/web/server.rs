//! Web server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::mailing::{transport_for, MailTransport};
use crate::{Database, MassmailError, Result};

use super::handlers::AppState;
use super::middleware::JwtState;
use super::router::{create_health_router, create_router};

/// Web server for the mailing service.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// JWT state.
    jwt_state: Arc<JwtState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server using the transport selected in `[mail]`.
    pub fn new(config: &Config, db: Arc<Database>) -> Result<Self> {
        let transport = transport_for(config.mail.backend);
        Self::with_transport(config, db, transport)
    }

    /// Create a new web server with an explicit mail transport.
    pub fn with_transport(
        config: &Config,
        db: Arc<Database>,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self> {
        let web = &config.web;
        let addr = format!("{}:{}", web.host, web.port)
            .parse()
            .map_err(|e| MassmailError::Config(format!("invalid web server address: {e}")))?;

        let app_state = AppState::new(db, &web.jwt_secret, web.jwt_access_token_expiry_secs)
            .with_cache_ttl(config.cache.ttl_secs)
            .with_transport(transport, &config.mail.from_address)
            .with_admin_usernames(&web.admin_usernames);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state: Arc::new(JwtState::new(&web.jwt_secret)),
            cors_origins: web.cors_origins.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn into_router(self) -> axum::Router {
        create_router(self.app_state, self.jwt_state, &self.cors_origins)
            .merge(create_health_router())
            .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.into_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.into_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
