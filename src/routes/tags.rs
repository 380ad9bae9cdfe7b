use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::{
    dto::tags::{CreateTagRequest, TagList, TagSaleRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Tag, TagKind},
    response::ApiResponse,
    services::tag_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_tag))
        .route("/categories", get(list_categories))
        .route("/collections", get(list_collections))
        .route("/name/{name}", get(get_tag))
        .route("/name/{name}", delete(delete_tag))
        .route("/add-sale", post(add_sale))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = ApiResponse<Tag>),
        (status = 400, description = "Duplicate name or bad kind"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTagRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Tag>>)> {
    let resp = tag_service::create_tag(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(get, path = "/api/tags/categories", tag = "Tags")]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<TagList>>> {
    let resp = tag_service::list_by_kind(&state, TagKind::Category).await?;
    Ok(Json(resp))
}

#[utoipa::path(get, path = "/api/tags/collections", tag = "Tags")]
pub async fn list_collections(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<TagList>>> {
    let resp = tag_service::list_by_kind(&state, TagKind::Collection).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tags/name/{name}",
    params(
        ("name" = String, Path, description = "Tag name")
    ),
    responses(
        (status = 200, description = "Tag", body = ApiResponse<Tag>),
        (status = 404, description = "Tag not found"),
    ),
    tag = "Tags"
)]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Tag>>> {
    let resp = tag_service::get_by_name(&state, &name).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tags/name/{name}",
    params(
        ("name" = String, Path, description = "Tag name")
    ),
    responses(
        (status = 200, description = "Tag deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Tag not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = tag_service::delete_tag(&state, &user, &name).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tags/add-sale",
    request_body = TagSaleRequest,
    responses(
        (status = 200, description = "Sale updated", body = ApiResponse<Tag>),
        (status = 400, description = "Sale percentage out of range"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Tag not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn add_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TagSaleRequest>,
) -> AppResult<Json<ApiResponse<Tag>>> {
    let resp = tag_service::add_sale(&state, &user, payload).await?;
    Ok(Json(resp))
}
