//! Submission status chain
//!
//! ```text
//! NOT_SUBMITTED -> PENDING -> APPROVED_BY_ADVISOR -> APPROVED_BY_DEPT -> APPROVED_BY_DEAN -> GRADUATION_APPROVED
//!                       \-> REJECTED_BY_ADVISOR  \-> REJECTED_BY_DEPT  \-> REJECTED_BY_DEAN  \-> STUDENT_AFFAIRS_REJECTED
//! ```
//!
//! Movement is forward-only and every rejection ends the cycle.

use std::fmt;

use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    NotSubmitted,
    Pending,
    ApprovedByAdvisor,
    RejectedByAdvisor,
    ApprovedByDept,
    RejectedByDept,
    ApprovedByDean,
    RejectedByDean,
    GraduationApproved,
    StudentAffairsRejected,
}

static WIRE_NAMES: phf::Map<&'static str, Status> = phf_map! {
    "NOT_SUBMITTED" => Status::NotSubmitted,
    "PENDING" => Status::Pending,
    "APPROVED_BY_ADVISOR" => Status::ApprovedByAdvisor,
    "REJECTED_BY_ADVISOR" => Status::RejectedByAdvisor,
    "APPROVED_BY_DEPT" => Status::ApprovedByDept,
    "APPROVED_BY_DEPARTMENT" => Status::ApprovedByDept,
    "REJECTED_BY_DEPT" => Status::RejectedByDept,
    "REJECTED_BY_DEPARTMENT" => Status::RejectedByDept,
    "APPROVED_BY_DEAN" => Status::ApprovedByDean,
    "REJECTED_BY_DEAN" => Status::RejectedByDean,
    "GRADUATION_APPROVED" => Status::GraduationApproved,
    "STUDENT_AFFAIRS_REJECTED" => Status::StudentAffairsRejected,
};

impl Status {
    pub const ALL: [Status; 10] = [
        Status::NotSubmitted,
        Status::Pending,
        Status::ApprovedByAdvisor,
        Status::RejectedByAdvisor,
        Status::ApprovedByDept,
        Status::RejectedByDept,
        Status::ApprovedByDean,
        Status::RejectedByDean,
        Status::GraduationApproved,
        Status::StudentAffairsRejected,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Status::NotSubmitted => "NOT_SUBMITTED",
            Status::Pending => "PENDING",
            Status::ApprovedByAdvisor => "APPROVED_BY_ADVISOR",
            Status::RejectedByAdvisor => "REJECTED_BY_ADVISOR",
            Status::ApprovedByDept => "APPROVED_BY_DEPT",
            Status::RejectedByDept => "REJECTED_BY_DEPT",
            Status::ApprovedByDean => "APPROVED_BY_DEAN",
            Status::RejectedByDean => "REJECTED_BY_DEAN",
            Status::GraduationApproved => "GRADUATION_APPROVED",
            Status::StudentAffairsRejected => "STUDENT_AFFAIRS_REJECTED",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        WIRE_NAMES.get(name.trim().to_ascii_uppercase().as_str()).copied()
    }

    /// Position on the chain; both outcomes of one review step share a stage
    pub fn stage(self) -> u8 {
        match self {
            Status::NotSubmitted => 0,
            Status::Pending => 1,
            Status::ApprovedByAdvisor | Status::RejectedByAdvisor => 2,
            Status::ApprovedByDept | Status::RejectedByDept => 3,
            Status::ApprovedByDean | Status::RejectedByDean => 4,
            Status::GraduationApproved | Status::StudentAffairsRejected => 5,
        }
    }

    pub fn is_rejection(self) -> bool {
        matches!(
            self,
            Status::RejectedByAdvisor
                | Status::RejectedByDept
                | Status::RejectedByDean
                | Status::StudentAffairsRejected
        )
    }

    /// No further movement is defined
    pub fn is_terminal(self) -> bool {
        self.is_rejection() || self == Status::GraduationApproved
    }

    /// The only statuses reachable in one step
    pub fn successors(self) -> &'static [Status] {
        match self {
            Status::NotSubmitted => &[Status::Pending],
            Status::Pending => &[Status::ApprovedByAdvisor, Status::RejectedByAdvisor],
            Status::ApprovedByAdvisor => &[Status::ApprovedByDept, Status::RejectedByDept],
            Status::ApprovedByDept => &[Status::ApprovedByDean, Status::RejectedByDean],
            Status::ApprovedByDean => &[Status::GraduationApproved, Status::StudentAffairsRejected],
            _ => &[],
        }
    }

    pub fn can_transition_to(self, next: Status) -> bool {
        self.successors().contains(&next)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Status::from_wire(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown status: {raw}")))
    }
}
