use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// User roles known to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Advisor,
    DepartmentSecretary,
    DeansOffice,
    StudentAffairs,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Student,
        Role::Advisor,
        Role::DepartmentSecretary,
        Role::DeansOffice,
        Role::StudentAffairs,
    ];

    /// Name used on the wire and inside token claims
    pub fn wire_name(self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Advisor => "ADVISOR",
            Role::DepartmentSecretary => "DEPARTMENT_SECRETARY",
            Role::DeansOffice => "DEANS_OFFICE",
            Role::StudentAffairs => "STUDENT_AFFAIRS",
        }
    }

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Advisor => "Advisor",
            Role::DepartmentSecretary => "Department Secretary",
            Role::DeansOffice => "Dean's Office",
            Role::StudentAffairs => "Student Affairs",
        }
    }

    /// Parse a wire name, case-insensitive; a leading `ROLE_` prefix is tolerated
    pub fn from_wire(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        Role::ALL.into_iter().find(|r| r.wire_name() == bare)
    }

    /// Role whose lists this role waits on before it may finalize
    pub fn subordinate(self) -> Option<Role> {
        match self {
            Role::Student | Role::Advisor => None,
            Role::DepartmentSecretary => Some(Role::Advisor),
            Role::DeansOffice => Some(Role::DepartmentSecretary),
            Role::StudentAffairs => Some(Role::DeansOffice),
        }
    }

    /// Roles that approve or decline submissions
    pub fn is_reviewer(self) -> bool {
        !matches!(self, Role::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Role::from_wire(&raw).ok_or_else(|| serde::de::Error::custom(format!("unknown role: {raw}")))
    }
}
