//! Sign-in service for the coaching front end.
//!
//! Implements the redirect-based OAuth flow and exposes the current session
//! under `/api/auth/*` in the same shape the front end expects from a
//! next-auth deployment. When `COACHING_STATIC_DIR` is set, the built front
//! end is served from the same origin so the session cookie stays first-party.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod auth;
pub mod config;
pub mod error;
pub mod oauth;
pub mod sessions;
pub mod state;

use auth::{callback_handler, providers_handler, session_handler, signin_handler, signout_handler};
use config::Config;
use error::AppError;
use state::State;

pub fn router(state: Arc<State>) -> Router {
    let api = Router::new()
        .route("/api/auth/providers", get(providers_handler))
        .route("/api/auth/signin/:provider", get(signin_handler))
        .route("/api/auth/callback/:provider", get(callback_handler))
        .route("/api/auth/session", get(session_handler))
        .route("/api/auth/signout", post(signout_handler));

    let app = match &state.config.static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

pub async fn start_server() -> Result<(), AppError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading configuration...");
    let config = Config::load()?;
    for provider in &config.providers {
        info!("Provider enabled: {}", provider.name);
    }

    let address = format!("0.0.0.0:{}", config.port);
    let state = State::new(config);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
