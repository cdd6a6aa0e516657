use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use server_api::{handle_intent, DispatchContext};
use shared::{
    domain::IntentEvent,
    error::{ApiError, ErrorCode},
    protocol::{WebhookRequest, WebhookResponse},
};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, resolve_canvas_url};

const MAX_REQUEST_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let canvas_url = resolve_canvas_url(&settings)?;
    info!(%canvas_url, "canvas page configured");

    let state = AppState {
        dispatch: DispatchContext::new(canvas_url),
    };
    let app = build_router(Arc::new(state), settings.public_dir.as_deref());

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "fulfillment webhook listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn build_router(state: Arc<AppState>, public_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/fulfillment", post(fulfillment))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state);

    match public_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving canvas page");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn fulfillment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, (StatusCode, Json<ApiError>)> {
    let event = IntentEvent::from(&req);
    let fulfillment = handle_intent(&state.dispatch, &event).map_err(|e| {
        warn!(intent = %event.name, error = %e, "intent dispatch failed");
        (status_for(e.code), Json(e))
    })?;

    info!(
        intent = %event.name,
        expect_user_response = fulfillment.expect_user_response,
        has_canvas = fulfillment.canvas.is_some(),
        "intent fulfilled"
    );
    Ok(Json(fulfillment.into()))
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::UnknownIntent => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
