use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{AuthError, Result};
use crate::models::Role;

/// Claims read from the JWT payload. Only `exp` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default, alias = "userId", alias = "id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SessionClaims {
    /// Decode the payload segment. The signature is not checked; the backend does that.
    pub fn decode(token: &str) -> Result<Self> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
            _ => return Err(malformed("expected three dot-separated segments")),
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| malformed(&format!("payload is not base64url: {e}")))?;
        serde_json::from_slice(&bytes).map_err(|e| malformed(&format!("payload is not claims JSON: {e}")))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// `exp` at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::from_wire)
    }

    /// Minimal user object used when the profile endpoint is unavailable
    pub fn session_user(&self) -> Map<String, JsonValue> {
        let mut user = Map::new();
        if let Some(sub) = &self.sub {
            user.insert("email".to_string(), JsonValue::String(sub.clone()));
        }
        if let Some(role) = self.role() {
            user.insert("role".to_string(), JsonValue::String(role.wire_name().to_string()));
        }
        if let Some(id) = self.user_id {
            user.insert("id".to_string(), JsonValue::from(id));
        }
        if let Some(name) = &self.name {
            user.insert("name".to_string(), JsonValue::String(name.clone()));
        }
        user
    }
}

fn malformed(reason: &str) -> crate::AppError {
    AuthError::MalformedToken {
        reason: reason.to_string(),
    }
    .into()
}

/// Build an unsigned token around `claims`; handy for fakes and tests
pub fn encode_unsigned(claims: &JsonValue) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_payload_claims() {
        let token = encode_unsigned(&json!({
            "sub": "kaya@iyte.edu.tr",
            "role": "ROLE_ADVISOR",
            "exp": 1_900_000_000,
            "userId": 12
        }));
        let claims = SessionClaims::decode(&token).unwrap();
        assert_eq!(claims.role(), Some(Role::Advisor));
        assert_eq!(claims.user_id, Some(12));
        assert!(!claims.is_expired_at(Utc.timestamp_opt(1_800_000_000, 0).unwrap()));
        assert!(claims.is_expired_at(Utc.timestamp_opt(1_900_000_000, 0).unwrap()));
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "abc", "a.b", "a.!!!.c", "a.e30.c.d"] {
            let err = SessionClaims::decode(token).unwrap_err();
            assert!(err.is_unauthorized(), "{token}");
        }
    }

    #[test]
    fn session_user_carries_known_claims() {
        let claims = SessionClaims {
            sub: Some("ada@std.iyte.edu.tr".to_string()),
            role: Some("STUDENT".to_string()),
            exp: 0,
            iat: None,
            user_id: None,
            name: None,
        };
        let user = claims.session_user();
        assert_eq!(user["email"], "ada@std.iyte.edu.tr");
        assert_eq!(user["role"], "STUDENT");
        assert!(!user.contains_key("id"));
    }
}
