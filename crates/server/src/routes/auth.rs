use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service::auth::{domain::LoginInput, Actor, AuthService};
use service::works::WorksService;

use crate::errors::{ApiError, FlashRedirect};

pub const AUTH_COOKIE: &str = "auth_token";
pub const LOGGED_OUT: &str = "Successfully logged out!";

#[derive(Clone)]
pub struct ServerState {
    pub works: Arc<WorksService>,
    pub auth: Arc<AuthService>,
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Attach the request's `Actor` as an extension. The `Authorization: Bearer`
/// header wins over the `auth_token` cookie. Missing or unverifiable tokens
/// mean a guest; this layer never rejects.
pub async fn resolve_actor(State(state): State<ServerState>, jar: CookieJar, mut req: Request, next: Next) -> Response {
    let token = bearer(req.headers()).or_else(|| jar.get(AUTH_COOKIE).map(|c| c.value().to_string()));
    let actor = token.map(|t| state.auth.resolve(&t)).unwrap_or_default();
    if let Actor::User(u) = &actor {
        tracing::debug!(user_id = u.id, path = %req.uri().path(), "actor_resolved");
    }
    req.extensions_mut().insert(actor);
    next.run(req).await
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 302, description = "Logged in, session cookie set", body = crate::openapi::FlashDoc), (status = 400, description = "Blank username")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, FlashRedirect), ApiError> {
    let session = state.auth.login(input).await?;
    let message = session.greeting();
    Ok((jar.add(session_cookie(session.token)), FlashRedirect::to_root(message)))
}

#[utoipa::path(delete, path = "/logout", tag = "auth", responses((status = 302, description = "Session cookie removed", body = crate::openapi::FlashDoc)))]
pub async fn logout(jar: CookieJar) -> (CookieJar, FlashRedirect) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), FlashRedirect::to_root(LOGGED_OUT))
}
