use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod auth;
pub mod users;
pub mod works;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router. Every request passes through actor
/// resolution; gating happens inside the services.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(crate::openapi::openapi_json));

    let catalogue = Router::new()
        .route("/", get(works::landing))
        .route("/works", get(works::list).post(works::create))
        .route("/works/new", get(works::new_form))
        .route("/works/:id", get(works::show).patch(works::update).put(works::update).delete(works::destroy))
        .route("/works/:id/edit", get(works::edit_form))
        .route("/works/:id/upvote", post(works::upvote));

    let accounts = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/logout", delete(auth::logout))
        .route("/users", get(users::list))
        .route("/users/:id", get(users::show));

    public
        .merge(catalogue)
        .merge(accounts)
        .layer(middleware::from_fn_with_state(state.clone(), auth::resolve_actor))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
