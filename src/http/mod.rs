//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers)
//!     → request.rs (request ID, trace span)
//!     → gate.rs (allow-list, rate limit, bearer token)
//!     → session handlers / protected handlers
//!     → response.rs (encrypt sensitive bodies)
//!     → Send to client
//! ```

pub mod gate;
pub mod request;
pub mod response;
pub mod server;

pub use gate::{AuthenticatedUser, GateDecision, RequestGate};
pub use request::X_REQUEST_ID;
pub use response::{seal, Encrypted};
pub use server::{AppState, HttpServer};

use crate::error::GatewayError;

/// Run a possibly blocking closure off the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, GatewayError>
where
    F: FnOnce() -> Result<T, GatewayError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!(error = %e, "Blocking task failed");
        GatewayError::Internal
    })?
}
