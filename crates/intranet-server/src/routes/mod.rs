//! API routes modules.
//!
//! Organized by functionality:
//! - `cache_admin` - Cache statistics, manual sweeps and flushes

pub mod cache_admin;
