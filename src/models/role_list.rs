use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::submission::{null_as_default, parse_timestamp};
use crate::models::{Role, Submission};

/// One subordinate's finalization flag as reported by the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubordinateStatus {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, alias = "finalized", deserialize_with = "null_as_default")]
    pub is_finalized: bool,
    #[serde(default)]
    pub finalized_at: Option<String>,
}

/// Aggregate view of one subordinate's submissions, counted client-side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleList {
    pub subordinate_id: i64,
    pub subordinate_name: String,
    pub subordinate_role: Role,
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    pub is_finalized: bool,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl RoleList {
    /// Counts from the subordinate's point of view: pending = still waiting on
    /// its decision, rejected = its own rejection, approved = at or past its approval.
    pub fn derive(status: &SubordinateStatus, subordinate_role: Role, submissions: &[Submission]) -> Self {
        let mut list = Self::empty(status, subordinate_role);
        list.total = submissions.len();

        if let Some(stages) = crate::workflow::RoleStages::for_role(subordinate_role) {
            for s in submissions {
                if s.status == stages.input {
                    list.pending += 1;
                } else if s.status == stages.rejected {
                    list.rejected += 1;
                } else if s.status.stage() >= stages.approved.stage() {
                    // includes rejections further up the chain
                    list.approved += 1;
                }
            }
        }
        list
    }

    /// Flags only; used when the subordinate's submissions could not be fetched
    pub fn empty(status: &SubordinateStatus, subordinate_role: Role) -> Self {
        Self {
            subordinate_id: status.id,
            subordinate_name: status.name.clone(),
            subordinate_role,
            total: 0,
            approved: 0,
            rejected: 0,
            pending: 0,
            is_finalized: status.is_finalized,
            finalized_at: status.finalized_at.as_deref().and_then(parse_timestamp),
        }
    }
}

/// `GET /api/submissions/my-list/finalized`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedFlag {
    #[serde(default, alias = "finalized", deserialize_with = "null_as_default")]
    pub is_finalized: bool,
    #[serde(default)]
    pub finalized_at: Option<String>,
}

impl FinalizedFlag {
    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at.as_deref().and_then(parse_timestamp)
    }
}
