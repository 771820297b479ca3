//! Finalization gate
//!
//! A role may finalize its list only when every subordinate list is finalized
//! AND nothing in scope is still waiting on this role's decision.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::models::{RoleList, Submission};
use crate::workflow::RoleStages;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeBlock {
    SubordinatesNotFinalized { names: Vec<String> },
    UndecidedSubmissions { count: usize },
    DecisionsInFlight { count: usize },
}

impl fmt::Display for FinalizeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalizeBlock::SubordinatesNotFinalized { names } => write!(
                f,
                "all subordinate lists must be finalized first (waiting on: {})",
                names.join(", ")
            ),
            FinalizeBlock::UndecidedSubmissions { count } => write!(
                f,
                "{} submission(s) must be approved or rejected before finalizing",
                count
            ),
            FinalizeBlock::DecisionsInFlight { count } => {
                write!(f, "{} decision(s) are still waiting on the backend", count)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateVerdict {
    pub blocks: Vec<FinalizeBlock>,
}

impl GateVerdict {
    pub fn is_open(&self) -> bool {
        self.blocks.is_empty()
    }
}

pub struct FinalizationGate;

impl FinalizationGate {
    /// Pure function of the loaded lists and submissions
    pub fn evaluate(
        stages: &RoleStages,
        lists: &[RoleList],
        submissions: &[Submission],
        decisions_in_flight: usize,
    ) -> GateVerdict {
        let mut blocks = Vec::new();

        let unfinalized: Vec<String> = lists
            .iter()
            .filter(|l| !l.is_finalized)
            .map(|l| {
                if l.subordinate_name.is_empty() {
                    format!("#{}", l.subordinate_id)
                } else {
                    l.subordinate_name.clone()
                }
            })
            .collect();
        if !unfinalized.is_empty() {
            blocks.push(FinalizeBlock::SubordinatesNotFinalized { names: unfinalized });
        }

        let undecided = submissions
            .iter()
            .filter(|s| stages.awaits_decision(s.status))
            .count();
        if undecided > 0 {
            blocks.push(FinalizeBlock::UndecidedSubmissions { count: undecided });
        }

        if decisions_in_flight > 0 {
            blocks.push(FinalizeBlock::DecisionsInFlight {
                count: decisions_in_flight,
            });
        }

        GateVerdict { blocks }
    }
}

/// Finalization state of one role's list. There is no way back from `Finalized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizationState {
    Open,
    PendingFinalization,
    Finalized { at: Option<DateTime<Utc>> },
}

impl FinalizationState {
    pub fn is_finalized(&self) -> bool {
        matches!(self, FinalizationState::Finalized { .. })
    }
}
