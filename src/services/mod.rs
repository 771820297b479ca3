pub mod files;
pub mod profile;
pub mod role_lists;
pub mod session;
pub mod submissions;
pub mod validation;

pub use files::FileService;
pub use profile::{ProfileLoad, ProfileLoader, ProfileSource};
pub use role_lists::RoleListLoader;
pub use session::{SessionState, SessionStore};
pub use submissions::{Availability, EnrichmentStats, SubmissionLoader, SubmissionsLoad};
pub use validation::{FieldError, LoginForm};
