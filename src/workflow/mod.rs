pub mod finalization;
pub mod review_ctx;
pub mod review_flow;
pub mod tracked;
pub mod transitions;

pub use finalization::{FinalizationGate, FinalizationState, FinalizeBlock, GateVerdict};
pub use review_ctx::ReviewCtx;
pub use review_flow::{Decision, DecisionTicket, FlowLoad, ReviewEntry, ReviewFlow};
pub use tracked::Tracked;
pub use transitions::RoleStages;
