//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate, token and cipher code produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters per gate decision, token kind, cipher op)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached by the HTTP layer and shows up in trace spans
//! - Metrics are cheap (atomic increments) and no-ops until a recorder is
//!   installed, so unit tests need no setup

pub mod logging;
pub mod metrics;
