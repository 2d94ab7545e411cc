//! HTTP middleware components.

pub mod logging;
pub mod security_headers;
pub mod trace_id;
pub mod user_auth;

pub use security_headers::security_headers_middleware;
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
pub use user_auth::{require_user_auth, UserAuth};
