// HTTP routes consumed by the status page

mod http;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::{Any, CorsLayer};

use crate::api_client::StatusApi;
use crate::dashboard::StatusDashboard;

pub(crate) struct AppState<A> {
    pub(crate) dashboard: Arc<StatusDashboard<A>>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            dashboard: self.dashboard.clone(),
        }
    }
}

pub fn app<A>(dashboard: Arc<StatusDashboard<A>>) -> Router
where
    A: StatusApi + 'static,
{
    let state = AppState { dashboard };
    Router::new()
        .route("/", get(|| async { "Evelina status API" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/status", get(http::status_handler::<A>)) // GET /api/status
        .route(
            "/api/status/range/{range}",
            put(http::select_range_handler::<A>),
        ) // PUT /api/status/range/{range}
        .route("/api/status/retry", post(http::retry_handler::<A>)) // POST /api/status/retry
        .route(
            "/api/status/error",
            delete(http::dismiss_error_handler::<A>),
        ) // DELETE /api/status/error
        .route("/api/shards", get(http::shards_handler::<A>)) // GET /api/shards
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
