use axum::Json;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String }

/// Body of every redirect response.
#[derive(ToSchema)]
pub struct FlashDoc { pub location: String, pub message: String }

#[derive(ToSchema)]
pub struct WorkPayloadDoc {
    pub title: String,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    /// One of `album`, `book`, `movie`.
    pub category: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::works::landing,
        crate::routes::works::list,
        crate::routes::works::new_form,
        crate::routes::works::create,
        crate::routes::works::show,
        crate::routes::works::edit_form,
        crate::routes::works::update,
        crate::routes::works::destroy,
        crate::routes::works::upvote,
        crate::routes::users::list,
        crate::routes::users::show,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            FlashDoc,
            WorkPayloadDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "works"),
        (name = "users")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
