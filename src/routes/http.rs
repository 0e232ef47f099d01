// Handlers: version, dashboard view, range selection, retry, error dismissal, shard panel.
// Refreshes triggered from a request run in the background; the response carries the
// view with `loading: true`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::api_client::StatusApi;
use crate::dashboard::{DashboardView, RefreshTicket};
use crate::models::{ShardPanel, TimeRange};
use crate::version::{NAME, VERSION};

/// GET /version — service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/status — current dashboard view for the active range.
pub(super) async fn status_handler<A: StatusApi + 'static>(
    State(state): State<AppState<A>>,
) -> Json<DashboardView> {
    Json(state.dashboard.view().await)
}

/// PUT /api/status/range/{range} — switch range (24h, 7d, 30d, all) and reload.
pub(super) async fn select_range_handler<A: StatusApi + 'static>(
    State(state): State<AppState<A>>,
    Path(range): Path<String>,
) -> Response {
    let range: TimeRange = match range.parse() {
        Ok(r) => r,
        Err(msg) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response();
        }
    };
    state.dashboard.set_range(range).await;
    let ticket = state.dashboard.begin_refresh().await;
    spawn_refresh(&state, ticket);
    (StatusCode::ACCEPTED, Json(state.dashboard.view().await)).into_response()
}

/// POST /api/status/retry — manual retry from the error panel.
pub(super) async fn retry_handler<A: StatusApi + 'static>(
    State(state): State<AppState<A>>,
) -> impl IntoResponse {
    tracing::info!("manual retry requested");
    let ticket = state.dashboard.begin_refresh().await;
    spawn_refresh(&state, ticket);
    (StatusCode::ACCEPTED, Json(state.dashboard.view().await))
}

/// DELETE /api/status/error — dismiss the error panel.
pub(super) async fn dismiss_error_handler<A: StatusApi + 'static>(
    State(state): State<AppState<A>>,
) -> Json<DashboardView> {
    state.dashboard.dismiss_error().await;
    Json(state.dashboard.view().await)
}

/// GET /api/shards — live shard panel (summary + one row per shard).
pub(super) async fn shards_handler<A: StatusApi + 'static>(
    State(state): State<AppState<A>>,
) -> Json<ShardPanel> {
    Json(state.dashboard.shard_panel().await)
}

fn spawn_refresh<A: StatusApi + 'static>(state: &AppState<A>, ticket: RefreshTicket) {
    let dashboard = state.dashboard.clone();
    tokio::spawn(async move {
        dashboard.complete_refresh(ticket).await;
    });
}
