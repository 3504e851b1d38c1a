use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/seeds", get(handlers::get_seeds))
        .route("/api/metrics", get(handlers::get_metrics))
        .route(
            "/api/upload",
            post(handlers::upload_csv).delete(handlers::clear_upload),
        )
        .route(
            "/api/targets",
            get(handlers::get_targets).put(handlers::put_targets),
        )
        .route("/api/timeline", get(handlers::get_timeline))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/network", get(handlers::get_network))
        .route("/api/curves", get(handlers::get_curves))
        .route("/api/integrations", get(handlers::get_integrations))
        .with_state(state)
}
