//! Orchestration layer
//!
//! Holds the scarce resources (HTTP pool, session file) and runs one command
//! end to end. Dependencies only point downward:
//!
//! ```text
//! orchestrator::App (one CLI command)
//!     ↓
//! workflow::ReviewFlow (load / decide / finalize for one role)
//!     ↓
//! services (session / profile / submissions / role lists / files)
//!     ↓
//! clients::AgmsClient (one method per endpoint)
//!     ↓
//! infrastructure (Backend: HttpExecutor, token storage)
//! ```

pub mod app;

pub use app::{App, Command};
