//! HTTP API server for the identity service.
//!
//! A thin adapter around the application core: route binding, request
//! decoding, token issuance, and the outbox recovery sweep. All business
//! behavior lives in the application and domain crates.

pub mod config;
pub mod error;
pub mod routes;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use application::IdentityService;
use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use outbox::{
    InMemoryOutboxStore, LoggingPublisher, OutboxRelay, OutboxStore, Publisher, RetryPolicy,
};
use store::{InMemoryIdentityStore, UnitOfWork, UserReadStore, UserRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::users::AppState;
use token::JwtTokenProvider;

/// Application state over the in-memory backend.
pub type DefaultState = AppState<InMemoryIdentityStore, InMemoryOutboxStore, LoggingPublisher>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, O, P>(
    state: Arc<AppState<S, O, P>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    S: UserRepository + UserReadStore + UnitOfWork + Send + Sync + 'static,
    O: OutboxStore + 'static,
    P: Publisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users", post(routes::users::create::<S, O, P>))
        .route("/users", get(routes::users::list::<S, O, P>))
        .route(
            "/users/by-email/{email}",
            get(routes::users::get_by_email::<S, O, P>),
        )
        .route(
            "/users/{id}/deactivate",
            post(routes::users::deactivate::<S, O, P>),
        )
        .route(
            "/users/{id}/activate",
            post(routes::users::activate::<S, O, P>),
        )
        .route("/login", post(routes::users::login::<S, O, P>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the in-memory backend.
///
/// Also returns the store so callers (tests, the recovery sweep) can
/// reach the shared outbox.
pub fn create_default_state(config: &Config) -> (Arc<DefaultState>, InMemoryIdentityStore) {
    let store = InMemoryIdentityStore::new();
    let relay = Arc::new(OutboxRelay::new(
        store.outbox(),
        LoggingPublisher::new(),
        RetryPolicy::default(),
    ));
    let service = IdentityService::new(store.clone(), relay);

    let state = Arc::new(AppState {
        service,
        tokens: JwtTokenProvider::new(&config.jwt_secret),
    });
    (state, store)
}

/// Spawns the outbox recovery sweep.
///
/// Every `interval`, pending rows older than `threshold` are republished.
/// The first pass runs immediately, catching up rows stranded by a crash
/// before this process started.
pub fn spawn_outbox_sweeper<O, P>(
    relay: Arc<OutboxRelay<O, P>>,
    interval: Duration,
    threshold: chrono::Duration,
) -> tokio::task::JoinHandle<()>
where
    O: OutboxStore + 'static,
    P: Publisher + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match relay.sweep(threshold).await {
                Ok(summary) if summary.sent > 0 || summary.dead_lettered > 0 => {
                    tracing::info!(
                        sent = summary.sent,
                        dead_lettered = summary.dead_lettered,
                        "outbox recovery sweep completed"
                    );
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::error!(%error, "outbox recovery sweep failed");
                }
            }
        }
    })
}
