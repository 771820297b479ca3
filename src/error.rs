use thiserror::Error;

use crate::models::{Role, Status};
use crate::services::validation::FieldError;
use crate::workflow::FinalizeBlock;

/// Boxed source error carried by transport and parse failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication and session errors
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    /// Backend call errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    /// Form validation errors, one entry per offending field
    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),
    /// Approval workflow errors
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),
    /// Configuration errors
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Local file errors (cookie jar, remembered email)
    #[error("file error: {0}")]
    File(#[from] FileError),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Authentication and session errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token stored
    #[error("no session token")]
    MissingToken,
    /// Token could not be decoded
    #[error("malformed session token: {reason}")]
    MalformedToken { reason: String },
    /// Token `exp` claim is in the past
    #[error("session token expired")]
    Expired,
    /// Backend answered 401
    #[error("unauthorized ({endpoint})")]
    Unauthorized { endpoint: String },
    /// Login call succeeded at transport level but returned no token
    #[error("login rejected: {message}")]
    LoginRejected { message: String },
}

/// Backend call errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure
    #[error("request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: BoxError,
    },
    /// Request exceeded its deadline
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },
    /// Backend answered 404
    #[error("not found: {endpoint}")]
    NotFound { endpoint: String },
    /// Any other non-success status
    #[error("bad response from {endpoint}: status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// Body did not match the expected shape
    #[error("could not parse response from {endpoint}: {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: BoxError,
    },
}

/// Approval workflow errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("role {0} cannot make decisions")]
    RoleCannotDecide(Role),
    #[error("submission {0} is not in scope")]
    SubmissionNotFound(i64),
    #[error("illegal transition {from} -> {to}")]
    InvalidTransition { from: Status, to: Status },
    #[error("a decision for submission {0} is already in flight")]
    DecisionInFlight(i64),
    #[error("a rejection reason is required")]
    EmptyReason,
    #[error("list cannot be finalized: {}", join_blocks(.0))]
    FinalizeBlocked(Vec<FinalizeBlock>),
    #[error("list is already finalized")]
    AlreadyFinalized,
    #[error("finalization already in flight")]
    FinalizeInFlight,
    #[error("subordinate {0} is not in this role's lists")]
    SubordinateNotFound(i64),
}

fn join_blocks(blocks: &[FinalizeBlock]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var_name} = '{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    #[error("cannot read config file {path}: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Local file errors
#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot delete {path}: {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== Convenience constructors ==========

impl AppError {
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    pub fn json_parse_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// True for a 401 from the backend or a locally detected bad session
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AppError::Auth(
                AuthError::Unauthorized { .. }
                    | AuthError::MissingToken
                    | AuthError::Expired
                    | AuthError::MalformedToken { .. }
            )
        )
    }

    /// True when the backend has no such resource (endpoint not deployed yet, or no record)
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Api(ApiError::NotFound { .. }))
    }
}

/// Library result type
pub type Result<T> = std::result::Result<T, AppError>;
