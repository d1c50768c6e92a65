//! HTTP middleware and extractors for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//!
//! Authentication is per-handler via the [`RequireAuth`], [`RequireAdmin`]
//! and [`RequireSuperAdmin`] extractors.

pub mod auth;
pub mod client_ip;
pub mod request_id;

pub use auth::{RequireAdmin, RequireAuth, RequireSuperAdmin};
pub use client_ip::ClientIp;
pub use request_id::request_id_middleware;
