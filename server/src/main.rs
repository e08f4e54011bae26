#![forbid(unsafe_code)]
//! FaceVault HTTP server.
//!
//! Exposes:
//! - `GET /live`: process liveness
//! - `GET /ready`: readiness (face document writable)
//! - `POST /api/register`: enroll an embedding under a name
//! - `POST /api/recognize`: best match for an embedding
//! - `GET /api/faces`: identities with sample counts
//! - `GET /api/faces/samples`: every stored sample
//! - `POST /api/faces/rename`, `POST /api/faces/delete`: identity management
//! - `POST /api/clear`, `POST /api/reload`: whole-store operations

use std::time::Duration;

use anyhow::{Context, Result};
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request};
use axum::routing::{get, post};
use axum::Router;
use facevault_core::FaceRegistry;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing_subscriber::EnvFilter;

mod config;
mod env_utils;
mod errors;
mod handler_utils;
mod handlers;
mod handlers_health;
mod models;
mod state;
mod tls;

use crate::config::AppConfig;
use crate::errors::handle_middleware_error;
use crate::handlers::{
    clear_faces, delete_identity, list_identities, list_samples, live, ready, recognize_face,
    register_face, reload_faces, rename_identity,
};
use crate::state::AppState;
use crate::tls::TlsRuntimeConfig;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let tls = TlsRuntimeConfig::from_env().context("invalid TLS configuration")?;
    let bind = config.bind;

    let registry = FaceRegistry::open(config.registry_config()).with_context(|| {
        format!(
            "failed to initialize face document at {}",
            config.db_path().display()
        )
    })?;
    let state = AppState::new(config.clone(), registry);
    let app = build_app(state);

    tracing::info!(
        %bind,
        db_path = %config.db_path().display(),
        match_threshold = config.match_threshold,
        expected_dimension = config.expected_dimension,
        sync_on_write = config.sync_on_write,
        timeout_ms = config.request_timeout_ms,
        max_body_bytes = config.max_body_bytes,
        max_concurrency = config.max_concurrency,
        tls = tls.is_some(),
        "facevault server started"
    );

    match tls {
        Some(tls) => {
            tracing::info!(
                cert_path = %tls.cert_path().display(),
                key_path = %tls.key_path().display(),
                "serving over TLS"
            );
            let rustls = tls.rustls_config().await?;
            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            });

            axum_server::bind_rustls(bind, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("server exited unexpectedly")?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind server socket on {bind}"))?;

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("server exited unexpectedly")?;
        }
    }

    Ok(())
}

fn build_app(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let config = state.config.clone();
    let timeout = Duration::from_millis(config.request_timeout_ms);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(timeout))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrency))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<_>| {
                    let request_id = request
                        .headers()
                        .get(&request_id_header)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id
                    )
                })
                .on_response(DefaultOnResponse::new().latency_unit(LatencyUnit::Millis)),
        );

    Router::new()
        .route("/live", get(live))
        .route("/ready", get(ready))
        .route("/api/register", post(register_face))
        .route("/api/recognize", post(recognize_face))
        .route("/api/faces", get(list_identities))
        .route("/api/faces/samples", get(list_samples))
        .route("/api/faces/rename", post(rename_identity))
        .route("/api/faces/delete", post(delete_identity))
        .route("/api/clear", post(clear_faces))
        .route("/api/reload", post(reload_faces))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(middleware)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(error) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("failed to initialize tracing subscriber: {error}");
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(error) => tracing::error!(%error, "failed to install Ctrl-C handler"),
    }
}

#[cfg(test)]
mod tests;
