use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::admins::{AdminList, CreateAdminRequest, UpdateAdminRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Admin,
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admins))
        .route("/", post(create_admin))
        .route("/{id}", put(update_admin))
        .route("/{id}", delete(delete_admin))
}

#[utoipa::path(
    get,
    path = "/api/admins",
    responses(
        (status = 200, description = "List admin accounts (superadmin only)", body = ApiResponse<AdminList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn list_admins(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AdminList>>> {
    let resp = admin_service::list_admins(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admins",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = ApiResponse<Admin>),
        (status = 400, description = "Email exists"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn create_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Admin>>)> {
    let resp = admin_service::create_admin(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admins/{id}",
    params(
        ("id" = Uuid, Path, description = "Admin ID")
    ),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Admin updated", body = ApiResponse<Admin>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn update_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAdminRequest>,
) -> AppResult<Json<ApiResponse<Admin>>> {
    let resp = admin_service::update_admin(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    params(
        ("id" = Uuid, Path, description = "Admin ID")
    ),
    responses(
        (status = 200, description = "Admin deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_admin(&state, &user, id).await?;
    Ok(Json(resp))
}
