use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::models::Role;

/// Session user merged with role-specific profile fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Profile {
    fields: Map<String, JsonValue>,
}

impl Profile {
    pub fn new(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }

    /// `fetched` wins on key collision
    pub fn merged(session_user: Map<String, JsonValue>, fetched: Map<String, JsonValue>) -> Self {
        let mut fields = session_user;
        fields.extend(fetched);
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(JsonValue::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    pub fn role(&self) -> Option<Role> {
        self.get_str("role").and_then(Role::from_wire)
    }

    pub fn display_name(&self) -> String {
        if let Some(name) = self.get_str("name").or_else(|| self.get_str("fullName")) {
            return name.to_string();
        }
        match (self.get_str("firstName"), self.get_str("lastName")) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_string(),
            _ => self.email().unwrap_or("unknown user").to_string(),
        }
    }

    pub fn student_number(&self) -> Option<String> {
        self.id_like("studentNumber")
    }

    /// Identifier that scopes this role's submission list
    pub fn scope_id(&self, role: Role) -> Option<String> {
        let keys: &[&str] = match role {
            Role::Student => &["studentNumber"],
            Role::Advisor => &["advisorId", "id"],
            Role::DepartmentSecretary => &["departmentId", "id"],
            Role::DeansOffice => &["facultyId", "deanId", "id"],
            Role::StudentAffairs => &["id"],
        };
        keys.iter().find_map(|k| self.id_like(k))
    }

    fn id_like(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
