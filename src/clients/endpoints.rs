//! REST paths of the AGMS backend

use crate::models::Role;

pub const LOGIN: &str = "/api/auth/login";
pub const LOGOUT: &str = "/api/auth/logout";
pub const PASSWORD_RESET: &str = "/api/auth/navigate-to-reset-password";
pub const USER_PROFILE: &str = "/api/users/profile";
pub const STUDENT_PROFILE: &str = "/api/students/profile";
pub const SUBORDINATE_STATUS: &str = "/api/submissions/subordinate-status";
pub const MY_LIST_FINALIZED: &str = "/api/submissions/my-list/finalized";

pub fn student(student_number: &str) -> String {
    format!("/api/students/{student_number}")
}

pub fn student_record(student_number: &str) -> String {
    format!("/api/ubys/student/{student_number}/complete")
}

pub fn approve(submission_id: i64) -> String {
    format!("/api/submissions/{submission_id}/approve")
}

pub fn reject(submission_id: i64) -> String {
    format!("/api/submissions/{submission_id}/reject")
}

pub fn finalize_advisor(advisor_id: i64) -> String {
    format!("/api/submissions/advisor/{advisor_id}/finalize")
}

pub fn submission_files(submission_id: i64) -> String {
    format!("/api/files/submission/{submission_id}")
}

pub fn upload_file(submission_id: i64) -> String {
    format!("/api/files/upload/{submission_id}")
}

pub fn download_file(file_id: &str) -> String {
    format!("/api/files/download/{file_id}")
}

pub fn delete_file(file_id: &str) -> String {
    format!("/api/files/{file_id}")
}

/// Per-role path templates; `{id}` is replaced with the role's scope identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEndpoints {
    pub list: String,
    pub finalize: Option<String>,
}

impl RoleEndpoints {
    pub fn new(list: impl Into<String>, finalize: Option<&str>) -> Self {
        Self {
            list: list.into(),
            finalize: finalize.map(str::to_string),
        }
    }

    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Student => Self::new("/api/submissions/student/{id}/latest", None),
            Role::Advisor => Self::new(
                "/api/submissions/advisor/{id}",
                Some("/api/submissions/finalize-my-list"),
            ),
            Role::DepartmentSecretary => Self::new(
                "/api/submissions/department/{id}",
                Some("/api/submissions/my-submissions/finalize"),
            ),
            Role::DeansOffice => Self::new(
                "/api/submissions/dean/{id}",
                Some("/api/submissions/my-submissions/finalize"),
            ),
            Role::StudentAffairs => Self::new(
                "/api/submissions/my-submissions",
                Some("/api/submissions/my-submissions/finalize"),
            ),
        }
    }

    pub fn list_path(&self, scope_id: Option<&str>) -> String {
        fill(&self.list, scope_id)
    }

    pub fn finalize_path(&self, scope_id: Option<&str>) -> Option<String> {
        self.finalize.as_deref().map(|t| fill(t, scope_id))
    }

    /// Template needs a scope identifier
    pub fn needs_scope(&self) -> bool {
        self.list.contains("{id}")
    }
}

fn fill(template: &str, scope_id: Option<&str>) -> String {
    template.replace("{id}", scope_id.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_fill_scope() {
        let advisor = RoleEndpoints::for_role(Role::Advisor);
        assert_eq!(advisor.list_path(Some("42")), "/api/submissions/advisor/42");
        assert_eq!(
            advisor.finalize_path(Some("42")).as_deref(),
            Some("/api/submissions/finalize-my-list")
        );
        assert!(advisor.needs_scope());

        let affairs = RoleEndpoints::for_role(Role::StudentAffairs);
        assert!(!affairs.needs_scope());
        assert_eq!(RoleEndpoints::for_role(Role::Student).finalize, None);
    }
}
