// Control surface routes
use crate::presentation::app_state::AppState;
use crate::presentation::handlers;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_check))
        .route(
            "/dashboard",
            get(handlers::get_dashboard).delete(handlers::delete_dashboard),
        )
        .route("/dashboard/save", post(handlers::save_dashboard))
        .route("/dashboard/viewport", post(handlers::resize_viewport))
        .route("/dashboard/widgets", post(handlers::add_widget))
        .route("/dashboard/widgets/:id", delete(handlers::remove_widget))
        .route("/dashboard/widgets/:id/refresh", post(handlers::refresh_widget))
        .route("/dashboard/widgets/:id/position", put(handlers::move_widget))
        .route("/dashboard/widgets/:id/size", put(handlers::resize_widget))
        .route("/dashboard/widgets/:id/configure", get(handlers::configure_widget))
        .route("/dashboard/widgets/:id/render", get(handlers::render_widget))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
