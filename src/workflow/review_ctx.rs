//! Review context
//!
//! Which role is working, over which scope, through which endpoints

use std::fmt::Display;

use crate::clients::RoleEndpoints;
use crate::models::{Profile, Role};

#[derive(Debug, Clone)]
pub struct ReviewCtx {
    pub role: Role,
    /// advisor / department / faculty id, or student number for students
    pub scope_id: Option<String>,
    pub endpoints: RoleEndpoints,
}

impl ReviewCtx {
    pub fn new(role: Role, scope_id: Option<String>) -> Self {
        Self {
            role,
            scope_id,
            endpoints: RoleEndpoints::for_role(role),
        }
    }

    pub fn from_profile(role: Role, profile: &Profile) -> Self {
        Self::new(role, profile.scope_id(role))
    }

    /// Replace the default path templates
    pub fn with_endpoints(mut self, endpoints: RoleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn list_path(&self) -> String {
        self.endpoints.list_path(self.scope_id.as_deref())
    }

    pub fn finalize_path(&self) -> Option<String> {
        self.endpoints.finalize_path(self.scope_id.as_deref())
    }

    /// The template needs an id and none was resolved
    pub fn missing_scope(&self) -> bool {
        self.endpoints.needs_scope() && self.scope_id.is_none()
    }
}

impl Display for ReviewCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.scope_id {
            Some(id) => write!(f, "[{} #{}]", self.role, id),
            None => write!(f, "[{}]", self.role),
        }
    }
}
