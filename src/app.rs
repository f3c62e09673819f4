use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(handlers::get_state))
        .route("/api/today", get(handlers::get_today))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/habits", post(handlers::add_habit))
        .route("/api/habits/:name", delete(handlers::remove_habit))
        .route("/api/toggle", post(handlers::toggle))
        .route("/api/reset-today", post(handlers::reset_today))
        .route("/api/clear", post(handlers::clear_all))
        .route("/api/export", get(handlers::export))
        .route("/api/import", post(handlers::import))
        .route("/api/recover", post(handlers::recover))
        .with_state(state)
}
