use crate::{password::Hasher, store::UserStore};
use anyhow::{Context, Result};
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware,
    response::IntoResponse,
};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, debug, info, info_span};
use ulid::Ulid;

pub mod error;
pub mod gate;
pub mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;
pub mod state;

pub use openapi::openapi;
pub use state::{AuthConfig, AuthState};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application router around an existing state.
///
/// The restricted path filter wraps every route, including the fallback.
#[must_use]
pub fn app(state: Arc<AuthState>) -> Router {
    let (router, _openapi) = openapi::api_router().split_for_parts();
    router
        .fallback(not_found)
        .layer(middleware::from_fn(gate::restricted_paths))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, users: Arc<dyn UserStore>, config: AuthConfig) -> Result<()> {
    let state = Arc::new(
        AuthState::new(config, users, Hasher::default()).context("Invalid auth configuration")?,
    );

    if state.sessions().ttl().is_some() {
        spawn_session_sweeper(state.clone());
    }

    let app = app(state);

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Periodically evict idle sessions so abandoned cookies do not pile up.
fn spawn_session_sweeper(state: Arc<AuthState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = state.sessions().purge_expired().await;
            if purged > 0 {
                debug!(purged, "expired sessions evicted");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
