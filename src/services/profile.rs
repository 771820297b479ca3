//! Role profile loader

use serde_json::{Map, Value as JsonValue};
use tracing::{error, info, warn};

use crate::clients::AgmsClient;
use crate::error::Result;
use crate::infrastructure::Backend;
use crate::models::{Profile, Role, SessionClaims};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    Fetched,
    /// Built from the token claims only
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ProfileLoad {
    pub profile: Profile,
    pub source: ProfileSource,
}

pub struct ProfileLoader;

impl ProfileLoader {
    /// Fetch the role's profile and merge it over the session user.
    /// Never fails: 401 and every other error fall back to the session user.
    pub async fn load<B: Backend>(client: &AgmsClient<B>, claims: &SessionClaims) -> ProfileLoad {
        let session_user = claims.session_user();
        let role = claims.role();

        let fetched = match role {
            Some(Role::Student) => client.student_profile().await,
            _ => client.user_profile().await,
        };

        match fetched {
            Ok(fields) => {
                info!("profile loaded for {}", role.map(Role::label).unwrap_or("unknown role"));
                ProfileLoad {
                    profile: Profile::merged(session_user, fields),
                    source: ProfileSource::Fetched,
                }
            }
            Err(e) if e.is_unauthorized() => {
                warn!("profile request unauthorized, using session user");
                Self::fallback(session_user)
            }
            Err(e) => {
                error!("profile request failed, using session user: {}", e);
                Self::fallback(session_user)
            }
        }
    }

    fn fallback(session_user: Map<String, JsonValue>) -> ProfileLoad {
        ProfileLoad {
            profile: Profile::new(session_user),
            source: ProfileSource::Fallback,
        }
    }

    /// Registrar transcript record for a student
    pub async fn load_student_record<B: Backend>(
        client: &AgmsClient<B>,
        student_number: &str,
    ) -> Result<JsonValue> {
        client.student_record(student_number).await
    }
}
