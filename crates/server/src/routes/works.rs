use axum::{
    extract::{Path, State},
    Extension, Json,
};
use service::auth::Actor;
use service::errors::ServiceError;
use service::works::domain::{Landing, Work, WorkDetail, WorkForm, WorkPayload};

use crate::errors::{ApiError, FlashRedirect};
use crate::routes::auth::ServerState;

/// Gate first, then parse. An id that does not parse can never exist, so it
/// is reported like any unknown id.
fn work_id(raw: &str, actor: &Actor) -> Result<i32, ApiError> {
    actor.require_user()?;
    raw.parse::<i32>().map_err(|_| ServiceError::not_found("work").into())
}

#[utoipa::path(get, path = "/", tag = "works", responses((status = 200, description = "Spotlight and top works per category")))]
pub async fn landing(State(state): State<ServerState>) -> Result<Json<Landing>, ApiError> {
    Ok(Json(state.works.landing().await?))
}

#[utoipa::path(get, path = "/works", tag = "works", responses((status = 200, description = "All works ordered by id")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Work>>, ApiError> {
    Ok(Json(state.works.list().await?))
}

#[utoipa::path(get, path = "/works/new", tag = "works", responses((status = 200, description = "Blank form"), (status = 302, description = "Guest")))]
pub async fn new_form(State(state): State<ServerState>, Extension(actor): Extension<Actor>) -> Result<Json<WorkForm>, ApiError> {
    Ok(Json(state.works.new_form(&actor).await?))
}

/// A missing or unparsable body counts as an empty payload, so guests are
/// still redirected and members get a validation error.
#[utoipa::path(
    post, path = "/works", tag = "works",
    request_body = crate::openapi::WorkPayloadDoc,
    responses(
        (status = 302, description = "Created", body = crate::openapi::FlashDoc),
        (status = 400, description = "Missing title or invalid category")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    body: Option<Json<WorkPayload>>,
) -> Result<FlashRedirect, ApiError> {
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    let (_, outcome) = state.works.create(&payload, &actor).await?;
    Ok(outcome.into())
}

#[utoipa::path(
    get, path = "/works/{id}", tag = "works",
    params(("id" = i32, Path, description = "Work id")),
    responses((status = 200, description = "Work with its votes"), (status = 404, description = "Not Found"))
)]
pub async fn show(State(state): State<ServerState>, Extension(actor): Extension<Actor>, Path(raw): Path<String>) -> Result<Json<WorkDetail>, ApiError> {
    let id = work_id(&raw, &actor)?;
    Ok(Json(state.works.show(id, &actor).await?))
}

#[utoipa::path(
    get, path = "/works/{id}/edit", tag = "works",
    params(("id" = i32, Path, description = "Work id")),
    responses((status = 200, description = "Prefilled form"), (status = 404, description = "Not Found"))
)]
pub async fn edit_form(State(state): State<ServerState>, Extension(actor): Extension<Actor>, Path(raw): Path<String>) -> Result<Json<WorkForm>, ApiError> {
    let id = work_id(&raw, &actor)?;
    Ok(Json(state.works.edit_form(id, &actor).await?))
}

#[utoipa::path(
    patch, path = "/works/{id}", tag = "works",
    params(("id" = i32, Path, description = "Work id")),
    request_body = crate::openapi::WorkPayloadDoc,
    responses(
        (status = 302, description = "Updated", body = crate::openapi::FlashDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(raw): Path<String>,
    body: Option<Json<WorkPayload>>,
) -> Result<FlashRedirect, ApiError> {
    let id = work_id(&raw, &actor)?;
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    let (_, outcome) = state.works.update(id, &payload, &actor).await?;
    Ok(outcome.into())
}

#[utoipa::path(
    delete, path = "/works/{id}", tag = "works",
    params(("id" = i32, Path, description = "Work id")),
    responses((status = 302, description = "Destroyed", body = crate::openapi::FlashDoc), (status = 404, description = "Not Found"))
)]
pub async fn destroy(State(state): State<ServerState>, Extension(actor): Extension<Actor>, Path(raw): Path<String>) -> Result<FlashRedirect, ApiError> {
    let id = work_id(&raw, &actor)?;
    Ok(state.works.destroy(id, &actor).await?.into())
}

/// Unknown ids are not an error here: the service redirects to the list.
#[utoipa::path(
    post, path = "/works/{id}/upvote", tag = "works",
    params(("id" = i32, Path, description = "Work id")),
    responses((status = 302, description = "Vote recorded, duplicate, or no such work", body = crate::openapi::FlashDoc))
)]
pub async fn upvote(State(state): State<ServerState>, Extension(actor): Extension<Actor>, Path(raw): Path<String>) -> Result<FlashRedirect, ApiError> {
    actor.require_user()?;
    let id = raw.parse::<i32>().unwrap_or(-1);
    Ok(state.works.upvote(id, &actor).await?.into())
}
