//! HTTP server for the broadcast overlay
//!
//! Serves the overlay directory (HTML plus the published `data.json`) so a
//! browser source in the streaming software can load it, and a live JSON view
//! of the same data.

use crate::overlay::OverlayData;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    let overlay_dir = state.config.overlay_dir.clone();

    Router::new()
        .route("/api/overlay", get(live_overlay))
        .fallback_service(ServeDir::new(overlay_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/overlay
///
/// Same document as `data.json`, computed from the in-memory state.
async fn live_overlay(State(state): State<AppState>) -> Json<OverlayData> {
    let round_end = !state.current_round().await.is_open();
    Json(state.overlay_snapshot(round_end).await)
}

/// Bind and serve until the process exits
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Overlay available on http://{}", addr);

    axum::serve(listener, router(state)).await
}
