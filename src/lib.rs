//! # AGMS client
//!
//! Client side of the graduation management system: session handling,
//! role-conditioned review of graduation submissions and list finalization.
//! All business rules are enforced again by the backend.
//!
//! ## Layers
//!
//! ### ① Infrastructure
//! - `infrastructure/` - owns the HTTP pool and the cookie file, exposes capabilities only
//! - `Backend` - "send one request"; `HttpExecutor` is the reqwest implementation
//!
//! ### ② Clients
//! - `clients/` - `AgmsClient`, one typed method per REST endpoint
//!
//! ### ③ Services
//! - `services/` - single capabilities: session, profile, submission loading
//!   with GPA enrichment, subordinate lists, attachments, form validation
//!
//! ### ④ Workflow
//! - `workflow/` - `ReviewFlow`, one role-parameterized context:
//!   load -> approve / decline -> finalize
//! - `FinalizationGate` - subordinates finalized and nothing left undecided
//!
//! ### ⑤ Orchestration
//! - `orchestrator/` - `App`, wires everything together for one CLI command

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

pub use clients::{AgmsClient, RoleEndpoints};
pub use config::Config;
pub use error::{AppError, Result};
pub use infrastructure::{Backend, HttpExecutor};
pub use models::{Role, Status, Submission};
pub use orchestrator::{App, Command};
pub use workflow::{Decision, FinalizationState, ReviewCtx, ReviewFlow};
