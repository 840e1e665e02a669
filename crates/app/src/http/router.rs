use axum::Router;
use axum::http::Method;
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};

use crate::http::ServeState;
use crate::http::routes::comments;

pub fn build(state: ServeState) -> Router {
    // The widget is a browser component in the original deployment; the
    // fixture keeps the API callable cross-origin.
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(Any)
        .allow_headers(Any);
    Router::new()
        .route("/api/comments", get(comments::list).post(comments::create))
        .route(
            "/api/comments/{id}",
            put(comments::update).delete(comments::remove),
        )
        .layer(cors)
        .with_state(state)
}
