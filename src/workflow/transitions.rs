//! Per-role transition table

use crate::models::{Role, Status};

/// What one reviewing role sees and may produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleStages {
    pub role: Role,
    /// Status of submissions waiting on this role
    pub input: Status,
    pub approved: Status,
    pub rejected: Status,
}

impl RoleStages {
    const TABLE: [RoleStages; 4] = [
        RoleStages {
            role: Role::Advisor,
            input: Status::Pending,
            approved: Status::ApprovedByAdvisor,
            rejected: Status::RejectedByAdvisor,
        },
        RoleStages {
            role: Role::DepartmentSecretary,
            input: Status::ApprovedByAdvisor,
            approved: Status::ApprovedByDept,
            rejected: Status::RejectedByDept,
        },
        RoleStages {
            role: Role::DeansOffice,
            input: Status::ApprovedByDept,
            approved: Status::ApprovedByDean,
            rejected: Status::RejectedByDean,
        },
        RoleStages {
            role: Role::StudentAffairs,
            input: Status::ApprovedByDean,
            approved: Status::GraduationApproved,
            rejected: Status::StudentAffairsRejected,
        },
    ];

    /// `None` for students, who do not review
    pub fn for_role(role: Role) -> Option<Self> {
        Self::TABLE.into_iter().find(|s| s.role == role)
    }

    /// Target status of a decision
    pub fn outcome(&self, approve: bool) -> Status {
        if approve {
            self.approved
        } else {
            self.rejected
        }
    }

    /// Still waiting on this role
    pub fn awaits_decision(&self, status: Status) -> bool {
        status == self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_edges_are_legal_transitions() {
        for role in Role::ALL {
            match RoleStages::for_role(role) {
                Some(stages) => {
                    assert!(stages.input.can_transition_to(stages.approved), "{role}");
                    assert!(stages.input.can_transition_to(stages.rejected), "{role}");
                }
                None => assert_eq!(role, Role::Student),
            }
        }
    }

    #[test]
    fn each_role_consumes_the_previous_approval() {
        let mut role = Role::StudentAffairs;
        while let Some(sub) = role.subordinate() {
            let upper = RoleStages::for_role(role).unwrap();
            let lower = RoleStages::for_role(sub).unwrap();
            assert_eq!(upper.input, lower.approved);
            role = sub;
        }
    }
}
