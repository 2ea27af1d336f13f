use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/days/:date/entries/:kind", post(handlers::add_entry_form))
        .route(
            "/days/:date/entries/:kind/:id/delete",
            post(handlers::delete_entry_form),
        )
        .route("/days/:date/clear", post(handlers::clear_day_form))
        .route("/days/:date/export.csv", get(handlers::export_csv))
        .route(
            "/api/days/:date",
            get(handlers::get_day).delete(handlers::clear_day),
        )
        .route("/api/days/:date/entries/:kind", post(handlers::add_entry))
        .route(
            "/api/days/:date/entries/:kind/:id",
            delete(handlers::delete_entry),
        )
        .with_state(state)
}
