//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the security components from validated configuration
//! - Create the Axum router with session and protected routes
//! - Wire up middleware (request ID, tracing, timeout, request gate)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::directory::UserDirectory;
use crate::error::StartupError;
use crate::http::gate::{request_gate, RequestGate};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::security::{AllowList, PayloadCipher, RateLimiter, TokenManager};
use crate::session::handlers::{login, logout, profile, public_media, refresh, send_verification};
use crate::session::SessionService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: RequestGate,
    pub sessions: Arc<SessionService>,
    pub cipher: Arc<PayloadCipher>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server from a validated configuration.
    ///
    /// Fails if the key or signing secret cannot be used.
    pub fn new(config: GatewayConfig, directory: Arc<dyn UserDirectory>) -> Result<Self, StartupError> {
        let cipher = Arc::new(PayloadCipher::from_base64(&config.security.encryption_key)?);
        let tokens = Arc::new(TokenManager::from_config(&config.security)?);
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        let allow_list = Arc::new(AllowList::from_config(&config.allow_list));

        let gate = RequestGate::new(allow_list, limiter, tokens.clone(), directory.clone());
        let sessions = Arc::new(SessionService::new(tokens, directory, config.cookies.clone()));

        let state = AppState {
            gate,
            sessions,
            cipher,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/login/send-verification", post(send_verification))
            .route("/api/auth/refresh", post(refresh))
            .route("/api/auth/logout", post(logout))
            .route("/api/user/profile", get(profile))
            .route("/api/media/public/{*file}", get(public_media))
            .layer(middleware::from_fn_with_state(state.gate.clone(), request_gate))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            allow_list = ?self.config.allow_list.fragments,
            rate_capacity = self.config.rate_limit.capacity,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
