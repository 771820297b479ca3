pub mod backend;
pub mod http_executor;
pub mod token_storage;

pub use backend::{ApiRequest, ApiResponse, Backend, FilePart, Method};
pub use http_executor::HttpExecutor;
pub use token_storage::{FileCookieStore, MemoryTokenStorage, RememberedEmailStore, TokenStorage};
