//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build security components → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: a missing key or secret stops startup before binding
//! - The listener is bound last so traffic only arrives when ready

pub mod shutdown;

pub use shutdown::Shutdown;
