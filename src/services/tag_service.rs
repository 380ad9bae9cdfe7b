use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::tags::{CreateTagRequest, TagList, TagSaleRequest},
    entity::tags::{ActiveModel, Column, Entity as Tags, Model as TagModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Tag, TagKind},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_by_kind(state: &AppState, kind: TagKind) -> AppResult<ApiResponse<TagList>> {
    let items = Tags::find()
        .filter(Column::Kind.eq(kind.as_str()))
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(tag_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Tags",
        TagList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_by_name(state: &AppState, name: &str) -> AppResult<ApiResponse<Tag>> {
    let tag = Tags::find()
        .filter(Column::Name.eq(name))
        .one(&state.orm)
        .await?;
    let tag = match tag {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Tag", tag_from_entity(tag), None))
}

pub async fn create_tag(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTagRequest,
) -> AppResult<ApiResponse<Tag>> {
    ensure_staff(user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Tag name is required".into()));
    }
    let kind = TagKind::parse(&payload.kind)
        .ok_or_else(|| AppError::BadRequest("Tag kind must be category or collection".into()))?;
    let sale_percentage = payload.sale_percentage.unwrap_or(0);
    validate_sale(sale_percentage)?;

    let existing = Tags::find()
        .filter(Column::Name.eq(payload.name.trim()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Tag already exists".into()));
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        kind: Set(kind.as_str().to_string()),
        sale_percentage: Set(sale_percentage),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let tag = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "tag_create",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": tag.id, "name": tag.name })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Tag created",
        tag_from_entity(tag),
        Some(Meta::empty()),
    ))
}

pub async fn delete_tag(
    state: &AppState,
    user: &AuthUser,
    name: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;

    let tag = Tags::find()
        .filter(Column::Name.eq(name))
        .one(&state.orm)
        .await?;
    let tag = match tag {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let tag_id = tag.id;
    // Products referencing the tag are detached by the FK (ON DELETE SET NULL).
    tag.delete(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "tag_delete",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": tag_id, "name": name })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Tag deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn add_sale(
    state: &AppState,
    user: &AuthUser,
    payload: TagSaleRequest,
) -> AppResult<ApiResponse<Tag>> {
    ensure_staff(user)?;
    validate_sale(payload.sale_percentage)?;

    let tag = Tags::find()
        .filter(Column::Name.eq(payload.name.as_str()))
        .one(&state.orm)
        .await?;
    let tag = match tag {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = tag.into();
    active.sale_percentage = Set(payload.sale_percentage);
    active.updated_at = Set(Utc::now().into());
    let tag = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "tag_sale_update",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": tag.id, "sale": tag.sale_percentage })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Sale updated",
        tag_from_entity(tag),
        Some(Meta::empty()),
    ))
}

fn validate_sale(pct: i32) -> Result<(), AppError> {
    if !(0..=100).contains(&pct) {
        return Err(AppError::BadRequest(
            "Sale percentage must be between 0 and 100".into(),
        ));
    }
    Ok(())
}

fn tag_from_entity(model: TagModel) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        // Kind is constrained to category/collection at the API boundary.
        kind: TagKind::parse(&model.kind).unwrap_or(TagKind::Category),
        sale_percentage: model.sale_percentage,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
