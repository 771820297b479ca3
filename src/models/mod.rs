pub mod profile;
pub mod role;
pub mod role_list;
pub mod session;
pub mod status;
pub mod submission;

pub use profile::Profile;
pub use role::Role;
pub use role_list::{FinalizedFlag, RoleList, SubordinateStatus};
pub use session::SessionClaims;
pub use status::Status;
pub use submission::{RawSubmission, Submission, SubmissionFile};
