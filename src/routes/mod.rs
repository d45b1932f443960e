//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The shape collection is served at `/shapes` and mirrored under `/api` so
//! both base-path conventions used by map clients resolve. CORS is open; the
//! store has no authentication.

pub mod shapes;

use axum::Router;
use axum::http::Method;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

fn shape_routes() -> Router<AppState> {
    Router::new()
        .route("/shapes", get(shapes::list_shapes).post(shapes::create_shape))
        .route(
            "/shapes/{id}",
            get(shapes::get_shape)
                .put(shapes::update_shape)
                .delete(shapes::delete_shape),
        )
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(shape_routes())
        .nest("/api", shape_routes())
        .route("/healthz", get(shapes::healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
