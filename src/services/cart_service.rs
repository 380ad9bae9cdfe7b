use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartLine, CartList, UpdateCartItemRequest},
    entity::{
        cart_items::{
            ActiveModel as CartActive, Column as CartCol, Entity as CartItems,
            Model as CartItemModel,
        },
        products::{Entity as Products, Model as ProductModel},
        tags,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::product_service::{load_tag_map, product_from_entity},
    state::AppState,
};

pub async fn list_cart(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = CartItems::find()
        .filter(CartCol::UserId.eq(user.id))
        .order_by_desc(CartCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
    let products: HashMap<Uuid, ProductModel> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        Products::find()
            .filter(crate::entity::products::Column::Id.is_in(product_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };
    let product_models: Vec<ProductModel> = products.values().cloned().collect();
    let tag_map = load_tag_map(&state.orm, &product_models).await?;

    // Cart rows cascade away with their product, so a missing product here
    // only happens mid-delete; such lines are dropped from the view.
    let items = rows
        .into_iter()
        .filter_map(|row| {
            let product = products.get(&row.product_id)?.clone();
            Some(build_line(row, product, &tag_map))
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartLine>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    let Some(product) = product else {
        return Err(AppError::BadRequest("product not found".to_string()));
    };

    let Some(variant) = product.colors.0.iter().find(|c| c.name == payload.color) else {
        return Err(AppError::BadRequest(format!(
            "color \"{}\" not available",
            payload.color
        )));
    };
    if !variant.sizes.iter().any(|s| s.size == payload.size) {
        return Err(AppError::BadRequest(format!(
            "size \"{}\" not available in color \"{}\"",
            payload.size, payload.color
        )));
    }

    let existing = CartItems::find()
        .filter(CartCol::UserId.eq(user.id))
        .filter(CartCol::ProductId.eq(payload.product_id))
        .filter(CartCol::Color.eq(payload.color.as_str()))
        .filter(CartCol::Size.eq(payload.size.as_str()))
        .one(&state.orm)
        .await?;

    // Same variant twice merges into one line by summing quantities.
    let row = if let Some(item) = existing {
        let quantity = item.quantity + payload.quantity;
        let mut active: CartActive = item.into();
        active.quantity = Set(quantity);
        active.update(&state.orm).await?
    } else {
        CartActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            product_id: Set(payload.product_id),
            color: Set(payload.color.clone()),
            size: Set(payload.size.clone()),
            quantity: Set(payload.quantity),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({
            "product_id": payload.product_id,
            "color": payload.color,
            "size": payload.size,
            "quantity": row.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let tag_map = load_tag_map(&state.orm, std::slice::from_ref(&product)).await?;
    Ok(ApiResponse::success(
        "OK",
        build_line(row, product, &tag_map),
        None,
    ))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartLine>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let item = CartItems::find_by_id(id)
        .filter(CartCol::UserId.eq(user.id))
        .one(&state.orm)
        .await?;
    let Some(item) = item else {
        return Err(AppError::NotFound);
    };

    let product_id = item.product_id;
    let mut active: CartActive = item.into();
    active.quantity = Set(payload.quantity);
    let row = active.update(&state.orm).await?;

    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let Some(product) = product else {
        return Err(AppError::NotFound);
    };
    let tag_map = load_tag_map(&state.orm, std::slice::from_ref(&product)).await?;

    Ok(ApiResponse::success(
        "OK",
        build_line(row, product, &tag_map),
        None,
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::UserId.eq(user.id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "cart_item_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn build_line(
    row: CartItemModel,
    product: ProductModel,
    tag_map: &HashMap<Uuid, tags::Model>,
) -> CartLine {
    CartLine {
        id: row.id,
        product: product_from_entity(product, tag_map),
        color: row.color,
        size: row.size,
        quantity: row.quantity,
    }
}
