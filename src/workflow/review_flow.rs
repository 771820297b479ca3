//! Review flow - workflow layer
//!
//! One role-parameterized workflow context for every reviewing role:
//! load -> approve / decline -> finalize.
//!
//! Local state only moves to a confirmed value after the backend accepts the
//! call. A failed call rolls back and the error goes to the caller.

use chrono::Utc;
use tracing::{info, warn};

use crate::clients::AgmsClient;
use crate::error::{Result, WorkflowError};
use crate::infrastructure::Backend;
use crate::models::{Role, RoleList, Status, Submission};
use crate::services::{Availability, EnrichmentStats, RoleListLoader, SubmissionLoader};
use crate::workflow::finalization::{FinalizationGate, FinalizationState, GateVerdict};
use crate::workflow::{ReviewCtx, RoleStages, Tracked};

/// A submission plus the tri-state of its status
#[derive(Debug, Clone)]
pub struct ReviewEntry {
    /// `submission.status` always holds the last confirmed status
    pub submission: Submission,
    pub decision: Tracked<Status>,
}

impl ReviewEntry {
    fn new(submission: Submission) -> Self {
        let decision = Tracked::new(submission.status);
        Self {
            submission,
            decision,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline { reason: String },
}

/// A decision that has been applied as pending and awaits the backend's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTicket {
    pub submission_id: i64,
    pub target: Status,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLoad {
    pub availability: Availability,
    pub enrichment: EnrichmentStats,
    pub subordinate_lists: usize,
}

pub struct ReviewFlow {
    ctx: ReviewCtx,
    stages: Option<RoleStages>,
    entries: Vec<ReviewEntry>,
    lists: Vec<RoleList>,
    finalization: FinalizationState,
    last_finalize_error: Option<String>,
}

impl ReviewFlow {
    pub fn new(ctx: ReviewCtx) -> Self {
        let stages = RoleStages::for_role(ctx.role);
        Self {
            ctx,
            stages,
            entries: Vec::new(),
            lists: Vec::new(),
            finalization: FinalizationState::Open,
            last_finalize_error: None,
        }
    }

    /// Seed with already-loaded data
    pub fn with_data(ctx: ReviewCtx, submissions: Vec<Submission>, lists: Vec<RoleList>) -> Self {
        let mut flow = Self::new(ctx);
        flow.replace_submissions(submissions);
        flow.lists = lists;
        flow
    }

    pub fn with_finalization(mut self, state: FinalizationState) -> Self {
        self.finalization = state;
        self
    }

    // ========== loading ==========

    /// Submissions, subordinate lists and the list's finalized flag
    pub async fn load<B: Backend>(
        &mut self,
        client: &AgmsClient<B>,
        loader: &SubmissionLoader,
    ) -> Result<FlowLoad> {
        if self.ctx.missing_scope() {
            warn!("{} no scope id in profile, list cannot be requested", self.ctx);
            self.replace_submissions(Vec::new());
            return Ok(FlowLoad {
                availability: Availability::Unavailable,
                enrichment: EnrichmentStats::default(),
                subordinate_lists: 0,
            });
        }

        let loaded = loader.load(client, &self.ctx).await?;
        self.replace_submissions(loaded.submissions);

        if self.ctx.role.is_reviewer() {
            self.lists = RoleListLoader::new(loader).load(client, self.ctx.role).await?;
            self.refresh_finalized(client).await?;
        }

        Ok(FlowLoad {
            availability: loaded.availability,
            enrichment: loaded.enrichment,
            subordinate_lists: self.lists.len(),
        })
    }

    /// Seed the finalization state from the backend. Only moves Open -> Finalized.
    pub async fn refresh_finalized<B: Backend>(&mut self, client: &AgmsClient<B>) -> Result<()> {
        match client.list_finalized().await {
            Ok(flag) if flag.is_finalized => {
                if self.finalization == FinalizationState::Open {
                    self.finalization = FinalizationState::Finalized {
                        at: flag.finalized_at(),
                    };
                }
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn replace_submissions(&mut self, submissions: Vec<Submission>) {
        self.entries = submissions.into_iter().map(ReviewEntry::new).collect();
    }

    // ========== views ==========

    pub fn ctx(&self) -> &ReviewCtx {
        &self.ctx
    }

    pub fn role(&self) -> Role {
        self.ctx.role
    }

    pub fn entries(&self) -> &[ReviewEntry] {
        &self.entries
    }

    pub fn entry(&self, submission_id: i64) -> Option<&ReviewEntry> {
        self.entries.iter().find(|e| e.submission.id == submission_id)
    }

    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.entries.iter().map(|e| &e.submission)
    }

    pub fn lists(&self) -> &[RoleList] {
        &self.lists
    }

    pub fn finalization(&self) -> FinalizationState {
        self.finalization
    }

    pub fn is_list_finalized(&self) -> bool {
        self.finalization.is_finalized()
    }

    pub fn last_finalize_error(&self) -> Option<&str> {
        self.last_finalize_error.as_deref()
    }

    pub fn decisions_in_flight(&self) -> usize {
        self.entries.iter().filter(|e| e.decision.is_pending()).count()
    }

    /// Submissions still waiting on this role
    pub fn awaiting_decision(&self) -> impl Iterator<Item = &Submission> {
        let stages = self.stages;
        self.submissions()
            .filter(move |s| stages.is_some_and(|st| st.awaits_decision(s.status)))
    }

    // ========== finalization gate ==========

    pub fn verdict(&self) -> Result<GateVerdict> {
        let stages = self.stages()?;
        let submissions: Vec<Submission> = self.submissions().cloned().collect();
        Ok(FinalizationGate::evaluate(
            &stages,
            &self.lists,
            &submissions,
            self.decisions_in_flight(),
        ))
    }

    pub fn can_finalize(&self) -> bool {
        self.finalization == FinalizationState::Open
            && self.verdict().map(|v| v.is_open()).unwrap_or(false)
    }

    fn stages(&self) -> Result<RoleStages> {
        self.stages
            .ok_or_else(|| WorkflowError::RoleCannotDecide(self.ctx.role).into())
    }

    // ========== decisions ==========

    pub async fn approve<B: Backend>(&mut self, client: &AgmsClient<B>, submission_id: i64) -> Result<Status> {
        let ticket = self.begin_decision(submission_id, Decision::Approve)?;
        let outcome = client.approve(submission_id).await;
        self.settle(ticket, outcome)
    }

    pub async fn decline<B: Backend>(
        &mut self,
        client: &AgmsClient<B>,
        submission_id: i64,
        reason: &str,
    ) -> Result<Status> {
        let ticket = self.begin_decision(
            submission_id,
            Decision::Decline {
                reason: reason.to_string(),
            },
        )?;
        let outcome = client.reject(submission_id, reason.trim()).await;
        self.settle(ticket, outcome)
    }

    /// Check the decision and mark the entry pending
    pub fn begin_decision(&mut self, submission_id: i64, decision: Decision) -> Result<DecisionTicket> {
        let stages = self.stages()?;
        match self.finalization {
            FinalizationState::Finalized { .. } => return Err(WorkflowError::AlreadyFinalized.into()),
            FinalizationState::PendingFinalization => return Err(WorkflowError::FinalizeInFlight.into()),
            FinalizationState::Open => {}
        }

        let (approve, reason) = match decision {
            Decision::Approve => (true, None),
            Decision::Decline { reason } => {
                let reason = reason.trim().to_string();
                if reason.is_empty() {
                    return Err(WorkflowError::EmptyReason.into());
                }
                (false, Some(reason))
            }
        };

        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.submission.id == submission_id)
            .ok_or(WorkflowError::SubmissionNotFound(submission_id))?;

        // checked against the last confirmed status, even while one is in flight
        let from = *entry.decision.confirmed();
        let target = stages.outcome(approve);
        if !from.can_transition_to(target) {
            return Err(WorkflowError::InvalidTransition { from, to: target }.into());
        }

        if !entry.decision.begin(target) {
            return Err(WorkflowError::DecisionInFlight(submission_id).into());
        }
        Ok(DecisionTicket {
            submission_id,
            target,
            reason,
        })
    }

    /// Apply the backend's answer: confirm on success, roll back on failure
    pub fn settle(&mut self, ticket: DecisionTicket, outcome: Result<()>) -> Result<Status> {
        let ctx = self.ctx.to_string();
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.submission.id == ticket.submission_id)
            .ok_or(WorkflowError::SubmissionNotFound(ticket.submission_id))?;

        match outcome {
            Ok(()) => {
                entry.decision.confirm();
                entry.submission.status = ticket.target;
                if ticket.reason.is_some() {
                    entry.submission.rejection_reason = ticket.reason;
                }
                info!("{} submission {} -> {}", ctx, ticket.submission_id, ticket.target);
                Ok(ticket.target)
            }
            Err(e) => {
                entry.decision.fail(e.to_string());
                warn!(
                    "{} submission {} stays {}: {}",
                    ctx, ticket.submission_id, entry.submission.status, e
                );
                Err(e)
            }
        }
    }

    // ========== finalize ==========

    /// Lock this role's list. Marked finalized only when the backend confirms.
    pub async fn finalize_list<B: Backend>(&mut self, client: &AgmsClient<B>) -> Result<FinalizationState> {
        let path = self
            .ctx
            .finalize_path()
            .ok_or(WorkflowError::RoleCannotDecide(self.ctx.role))?;

        match self.finalization {
            FinalizationState::Finalized { .. } => return Err(WorkflowError::AlreadyFinalized.into()),
            FinalizationState::PendingFinalization => return Err(WorkflowError::FinalizeInFlight.into()),
            FinalizationState::Open => {}
        }

        let verdict = self.verdict()?;
        if !verdict.is_open() {
            return Err(WorkflowError::FinalizeBlocked(verdict.blocks).into());
        }

        self.finalization = FinalizationState::PendingFinalization;
        match client.finalize(&path).await {
            Ok(message) => {
                self.finalization = FinalizationState::Finalized {
                    at: Some(Utc::now()),
                };
                self.last_finalize_error = None;
                info!(
                    "{} list finalized{}",
                    self.ctx,
                    message.map(|m| format!(": {m}")).unwrap_or_default()
                );
                Ok(self.finalization)
            }
            Err(e) => {
                self.finalization = FinalizationState::Open;
                self.last_finalize_error = Some(e.to_string());
                warn!("{} finalize refused, list stays open: {}", self.ctx, e);
                Err(e)
            }
        }
    }

    /// Department secretary locks one advisor's list
    pub async fn finalize_subordinate<B: Backend>(
        &mut self,
        client: &AgmsClient<B>,
        advisor_id: i64,
    ) -> Result<()> {
        if self.ctx.role != Role::DepartmentSecretary {
            return Err(WorkflowError::RoleCannotDecide(self.ctx.role).into());
        }
        let list = self
            .lists
            .iter()
            .find(|l| l.subordinate_id == advisor_id)
            .ok_or(WorkflowError::SubordinateNotFound(advisor_id))?;
        if list.is_finalized {
            return Err(WorkflowError::AlreadyFinalized.into());
        }

        client.finalize_advisor(advisor_id).await?;

        if let Some(list) = self.lists.iter_mut().find(|l| l.subordinate_id == advisor_id) {
            list.is_finalized = true;
            list.finalized_at = Some(Utc::now());
        }
        info!("{} advisor list {} finalized", self.ctx, advisor_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn submission(id: i64, status: Status) -> Submission {
        Submission {
            id,
            student_number: format!("{id}"),
            student_name: format!("Student {id}"),
            submitted_at: Utc::now(),
            content: String::new(),
            status,
            advisor_comment: None,
            department_comment: None,
            dean_comment: None,
            student_affairs_comment: None,
            rejection_reason: None,
            files: Vec::new(),
            gpa: None,
        }
    }

    fn advisor_flow(statuses: &[Status]) -> ReviewFlow {
        let subs = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| submission(i as i64 + 1, *s))
            .collect();
        ReviewFlow::with_data(ReviewCtx::new(Role::Advisor, Some("7".to_string())), subs, Vec::new())
    }

    #[test]
    fn pending_decision_blocks_a_second_one_and_the_gate() {
        let mut flow = advisor_flow(&[Status::Pending]);
        let ticket = flow.begin_decision(1, Decision::Approve).unwrap();
        assert_eq!(ticket.target, Status::ApprovedByAdvisor);
        assert!(matches!(
            flow.begin_decision(1, Decision::Approve),
            Err(crate::AppError::Workflow(WorkflowError::DecisionInFlight(1)))
        ));
        assert!(matches!(
            flow.begin_decision(1, Decision::Decline { reason: "late".to_string() }),
            Err(crate::AppError::Workflow(WorkflowError::DecisionInFlight(1)))
        ));
        assert_eq!(flow.decisions_in_flight(), 1);
        assert!(!flow.can_finalize());
        // confirmed status untouched while pending
        assert_eq!(flow.entry(1).unwrap().submission.status, Status::Pending);
    }

    #[test]
    fn failed_settle_rolls_back() {
        let mut flow = advisor_flow(&[Status::Pending]);
        let ticket = flow
            .begin_decision(1, Decision::Decline { reason: "missing credits".to_string() })
            .unwrap();
        let err = flow
            .settle(ticket, Err(ApiError::Timeout { endpoint: "PUT x".to_string() }.into()))
            .unwrap_err();
        assert!(matches!(err, crate::AppError::Api(ApiError::Timeout { .. })));

        let entry = flow.entry(1).unwrap();
        assert_eq!(entry.submission.status, Status::Pending);
        assert_eq!(entry.submission.rejection_reason, None);
        assert!(entry.decision.failure().is_some());
    }

    #[test]
    fn decided_submissions_cannot_be_decided_again() {
        let mut flow = advisor_flow(&[Status::ApprovedByAdvisor, Status::RejectedByAdvisor]);
        for id in [1, 2] {
            assert!(matches!(
                flow.begin_decision(id, Decision::Approve),
                Err(crate::AppError::Workflow(WorkflowError::InvalidTransition { .. }))
            ));
        }
        assert!(flow.can_finalize());
    }

    #[test]
    fn blank_reason_and_unknown_ids_are_refused() {
        let mut flow = advisor_flow(&[Status::Pending]);
        assert!(matches!(
            flow.begin_decision(1, Decision::Decline { reason: "  ".to_string() }),
            Err(crate::AppError::Workflow(WorkflowError::EmptyReason))
        ));
        assert!(matches!(
            flow.begin_decision(99, Decision::Approve),
            Err(crate::AppError::Workflow(WorkflowError::SubmissionNotFound(99)))
        ));
    }

    #[test]
    fn students_do_not_review() {
        let mut flow = ReviewFlow::with_data(
            ReviewCtx::new(Role::Student, Some("290201001".to_string())),
            vec![submission(1, Status::Pending)],
            Vec::new(),
        );
        assert!(flow.begin_decision(1, Decision::Approve).is_err());
        assert!(!flow.can_finalize());
    }

    #[test]
    fn finalized_list_locks_decisions() {
        let mut flow = advisor_flow(&[Status::Pending])
            .with_finalization(FinalizationState::Finalized { at: None });
        assert!(matches!(
            flow.begin_decision(1, Decision::Approve),
            Err(crate::AppError::Workflow(WorkflowError::AlreadyFinalized))
        ));
    }
}
