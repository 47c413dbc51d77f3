//! Cache administration endpoints.
//!
//! - `GET  /admin/cache/stats`   per-cache statistics in registration order
//! - `POST /admin/cache/cleanup` runs one sweep now and returns its report
//! - `POST /admin/cache/clear`   drops every entry of every cache

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRef, State},
    routing::{get, post},
};
use indexmap::IndexMap;
use intranet_cache::{CacheStats, CleanupRegistry, CleanupReport};
use serde::Serialize;
use tracing::{info, warn};

use crate::server::AppState;

#[derive(Clone)]
pub struct CacheAdminState {
    pub registry: Arc<CleanupRegistry>,
}

impl FromRef<AppState> for CacheAdminState {
    fn from_ref(app_state: &AppState) -> Self {
        Self {
            registry: app_state.caches.registry.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub sweep_running: bool,
    pub caches: IndexMap<String, CacheStats>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub cleared_caches: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/cache/stats", get(cache_stats))
        .route("/admin/cache/cleanup", post(run_cleanup))
        .route("/admin/cache/clear", post(clear_caches))
}

pub async fn cache_stats(State(state): State<CacheAdminState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        sweep_running: state.registry.is_running(),
        caches: state.registry.all_stats(),
    })
}

pub async fn run_cleanup(State(state): State<CacheAdminState>) -> Json<CleanupReport> {
    let report = state.registry.run_cleanup();
    let failed = report.failed().count();
    if failed > 0 {
        warn!(failed, "Manual cache sweep finished with failures");
    } else {
        info!(deleted = report.total_deleted, "Manual cache sweep finished");
    }
    Json(report)
}

pub async fn clear_caches(State(state): State<CacheAdminState>) -> Json<ClearResponse> {
    let cleared_caches = state.registry.clear_all();
    info!(cleared_caches, "All caches cleared on request");
    Json(ClearResponse { cleared_caches })
}
