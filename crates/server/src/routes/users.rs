use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use service::auth::domain::AuthUser;
use service::errors::ServiceError;
use service::works::domain::Vote;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub user: AuthUser,
    pub votes: Vec<Vote>,
}

#[utoipa::path(get, path = "/users", tag = "users", responses((status = 200, description = "All users")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<AuthUser>>, ApiError> {
    Ok(Json(state.auth.list_users().await?))
}

#[utoipa::path(
    get, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, description = "User and the votes they cast"), (status = 404, description = "Not Found"))
)]
pub async fn show(State(state): State<ServerState>, Path(raw): Path<String>) -> Result<Json<UserDetail>, ApiError> {
    let id = raw.parse::<i32>().map_err(|_| ServiceError::not_found("user"))?;
    let user = state.auth.get_user(id).await?;
    let votes = state.works.votes_by_user(user.id).await?;
    Ok(Json(UserDetail { user, votes }))
}
