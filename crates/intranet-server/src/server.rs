use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use intranet_cache::{CacheLayer, Repositories};
use tower_http::trace::TraceLayer;

use crate::{bootstrap, config::AppConfig, handlers, routes, services::Services};

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub caches: Arc<CacheLayer>,
    pub services: Services,
}

impl AppState {
    /// Builds the cache layer and services over the given repositories.
    /// The cleanup sweep is not started here.
    pub fn new(config: AppConfig, repositories: &Repositories) -> Self {
        let caches = Arc::new(CacheLayer::new(repositories, &config.cache));
        let services = Services::new(repositories, caches.clone());
        Self {
            config: Arc::new(config),
            caches,
            services,
        }
    }
}

pub struct IntranetServer {
    addr: SocketAddr,
    app: Router,
    caches: Arc<CacheLayer>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        // Users
        .route(
            "/users/{user_id}",
            get(handlers::get_user).patch(handlers::update_user),
        )
        .route("/users/{user_id}/role", post(handlers::switch_role))
        .route("/users/{user_id}/roles", put(handlers::set_roles))
        .route("/users/{user_id}/branches", put(handlers::set_branches))
        .route("/users/{user_id}/language", get(handlers::get_language))
        .route(
            "/users/{user_id}/organization",
            get(handlers::get_organization),
        )
        .route("/users/{user_id}/branch", get(handlers::get_active_branch))
        // Onboarding
        .route(
            "/users/{user_id}/onboarding",
            get(handlers::get_onboarding).put(handlers::update_onboarding),
        )
        .route(
            "/users/{user_id}/onboarding/complete",
            post(handlers::complete_onboarding),
        )
        // Saved filters
        .route(
            "/users/{user_id}/filters/{table_id}",
            get(handlers::list_filters),
        )
        .route(
            "/users/{user_id}/filter-groups/{table_id}",
            get(handlers::list_filter_groups),
        )
        .route("/filters", post(handlers::save_filter))
        .route(
            "/filters/{filter_id}",
            get(handlers::get_filter).delete(handlers::delete_filter),
        )
        // Notification settings
        .route(
            "/users/{user_id}/notification-settings",
            get(handlers::get_user_settings).put(handlers::update_user_settings),
        )
        .route(
            "/notification-settings",
            get(handlers::get_system_settings).put(handlers::update_system_settings),
        )
        .merge(routes::cache_admin::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    repositories: Option<Repositories>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            repositories: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Serve from these repositories instead of a fresh in-memory store.
    pub fn with_repositories(mut self, repositories: Repositories) -> Self {
        self.repositories = Some(repositories);
        self
    }

    pub fn build(self) -> anyhow::Result<IntranetServer> {
        let repositories = match self.repositories {
            Some(repositories) => repositories,
            None => bootstrap::memory_repositories(&self.config)?.1,
        };
        let state = AppState::new(self.config, &repositories);
        let caches = state.caches.clone();

        Ok(IntranetServer {
            addr: self.addr,
            app: build_app(state),
            caches,
        })
    }
}

impl IntranetServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        self.caches.start();
        let served = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        self.caches.stop();
        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
