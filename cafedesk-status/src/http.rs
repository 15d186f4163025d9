/**
 * HTTP API - Read side of the live computers table
 *
 * ROUTES:
 * - GET /health         liveness
 * - GET /system/health  poll counters and row totals (JSON)
 * - GET /computers      current `<tbody>` of the computers table (HTML)
 *
 * The synchronizer is the only writer of the table; handlers lock it just
 * long enough to render.
 */

use crate::health::{HealthTracker, SyncHealth};
use crate::state::Shared;
use crate::view::TableView;
use axum::response::Html;
use axum::{extract::State, routing::get, Json, Router};

#[derive(Clone)]
pub struct AppState {
    pub view: Shared<TableView>,
    pub health: HealthTracker,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/computers", get(get_computers))
        .with_state(app_state)
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<SyncHealth> {
    Json(app.health.get_health())
}

// GET /computers
async fn get_computers(State(app): State<AppState>) -> Html<String> {
    let html = app.view.lock().render_html();
    Html(html)
}
