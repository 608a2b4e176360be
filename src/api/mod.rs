//! HTTP API for the intake service.
//!
//! The browser front-end is a thin renderer: every intake action is a
//! JSON request and every response carries the full session view. Calls
//! to third-party services go through this API so their credentials stay
//! server-side. Routes are nested under `/api/` behind a middleware stack:
//! Rate Limit → Access Log → Handler.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::{api_router, api_router_with_ctx};
pub use server::{start_api_server, ApiServer, ServerError, ServerInfo};
pub use types::ApiContext;
