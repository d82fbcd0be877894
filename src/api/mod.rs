pub mod client;
pub mod endpoints;
pub mod error;
pub mod payloads;
pub mod session;

pub use client::SessionClient;
pub use error::{ApiError, ApiResult, FailureKind};
