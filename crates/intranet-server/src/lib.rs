//! HTTP surface of the intranet application.
//!
//! Reads are served through the cache layer, writes go to the repositories
//! and invalidate the affected caches. The cleanup sweep runs for the
//! lifetime of the server and can be inspected under `/admin/cache`.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod routes;
pub mod server;
pub mod services;

pub use config::{AppConfig, LoggingConfig, ServerConfig};
pub use error::ServiceError;
pub use observability::init_tracing;
pub use server::{AppState, IntranetServer, ServerBuilder, build_app};
pub use services::Services;
