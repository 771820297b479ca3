pub mod agms_client;
pub mod endpoints;

pub use agms_client::{AgmsClient, LoginResponse};
pub use endpoints::RoleEndpoints;
