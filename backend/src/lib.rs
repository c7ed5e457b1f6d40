//! Backend library modules.
//!
//! The domain core holds the travel intent and identity rules behind ports;
//! `inbound` adapts HTTP onto those ports and `outbound` supplies the
//! PostgreSQL, in-memory and credential adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
