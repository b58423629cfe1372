//! Router construction and server lifecycle.

use crate::config::Settings;
use crate::handlers::{
    app::index,
    download::download_latest,
    generate::generate,
    health::{health_check, readiness_check},
    metrics::metrics,
    session::session_info,
};
use crate::models::visitor::visitor_middleware;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Interval between idle-session sweeps.
const EVICTION_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

pub fn build_router(state: AppState) -> Router {
    // Multipart framing needs a little headroom on top of the file itself.
    let body_limit = state
        .settings
        .server
        .max_upload_bytes
        .saturating_add(64 * 1024);

    // Only visitor-facing routes carry the visitor cookie.
    let pages = Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/download", get(download_latest))
        .route("/api/session", get(session_info))
        .route_layer(from_fn_with_state(state.clone(), visitor_middleware));

    Router::new()
        .merge(pages)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Periodically drop sessions idle for longer than the cookie lifetime.
fn spawn_session_eviction(state: &AppState) {
    let sessions = state.sessions.clone();
    let max_idle = state.settings.session_idle();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            interval.tick().await;
            sessions.evict_idle(max_idle);
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Bind the listener and build state. Port 0 picks a random port.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let state = AppState::from_settings(settings)?;
        Self::with_state(state).await
    }

    /// Bind a listener for prebuilt state.
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        let address = format!("{}:{}", state.settings.server.host, state.settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            provider = state.generator.provider_name(),
            model = %state.settings.generation.model,
            initial_credits = state.settings.credits.initial,
            "predictor-service configured"
        );

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT or SIGTERM.
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        spawn_session_eviction(&self.state);
        let app = build_router(self.state);

        tracing::info!("Starting predictor-service on port {}", self.port);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("Server error: {}", e);
                AppError::from(e)
            })
    }
}
