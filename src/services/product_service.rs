use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::tags,
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{ColorVariants, ImageList, Product, TagKind},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    // Category/collection filters come in as tag names; an unknown name
    // matches nothing rather than erroring, like the original storefront.
    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        match find_tag(&state.orm, category, TagKind::Category).await? {
            Some(tag) => condition = condition.add(Column::CategoryId.eq(tag.id)),
            None => {
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: vec![] },
                    Some(Meta::new(page, limit, 0)),
                ));
            }
        }
    }

    if let Some(collection) = query.collection.as_ref().filter(|s| !s.is_empty()) {
        match find_tag(&state.orm, collection, TagKind::Collection).await? {
            Some(tag) => condition = condition.add(Column::CollectionId.eq(tag.id)),
            None => {
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: vec![] },
                    Some(Meta::new(page, limit, 0)),
                ));
            }
        }
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let tag_map = load_tag_map(&state.orm, &models).await?;
    let items = models
        .into_iter()
        .map(|m| product_from_entity(m, &tag_map))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let model = Products::find_by_id(id).one(&state.orm).await?;
    let model = match model {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    let tag_map = load_tag_map(&state.orm, std::slice::from_ref(&model)).await?;
    Ok(ApiResponse::success(
        "Product",
        product_from_entity(model, &tag_map),
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    if payload.price < 0 {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }
    let sale_percentage = payload.sale_percentage.unwrap_or(0);
    validate_sale(sale_percentage)?;
    validate_colors(&payload.colors)?;

    let category_id = resolve_tag_id(state, payload.category.as_deref(), TagKind::Category).await?;
    let collection_id =
        resolve_tag_id(state, payload.collection.as_deref(), TagKind::Collection).await?;

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        sale_percentage: Set(sale_percentage),
        images: Set(ImageList(payload.images)),
        colors: Set(ColorVariants(payload.colors)),
        category_id: Set(category_id),
        collection_id: Set(collection_id),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let tag_map = load_tag_map(&state.orm, std::slice::from_ref(&product)).await?;
    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product, &tag_map),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Product name is required".into()));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("Price cannot be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(sale_percentage) = payload.sale_percentage {
        validate_sale(sale_percentage)?;
        active.sale_percentage = Set(sale_percentage);
    }
    if let Some(images) = payload.images {
        active.images = Set(ImageList(images));
    }
    if let Some(colors) = payload.colors {
        validate_colors(&colors)?;
        active.colors = Set(ColorVariants(colors));
    }
    // An empty string detaches the tag; absence leaves it untouched.
    if let Some(category) = payload.category {
        let tag_id = resolve_tag_id(state, Some(category.as_str()), TagKind::Category).await?;
        active.category_id = Set(tag_id);
    }
    if let Some(collection) = payload.collection {
        let tag_id = resolve_tag_id(state, Some(collection.as_str()), TagKind::Collection).await?;
        active.collection_id = Set(tag_id);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let tag_map = load_tag_map(&state.orm, std::slice::from_ref(&product)).await?;
    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product, &tag_map),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
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

fn validate_colors(colors: &[crate::models::ColorVariant]) -> Result<(), AppError> {
    for color in colors {
        if color.name.trim().is_empty() {
            return Err(AppError::BadRequest("Color name is required".into()));
        }
        for size in &color.sizes {
            if size.stock < 0 {
                return Err(AppError::BadRequest("Stock cannot be negative".into()));
            }
        }
    }
    Ok(())
}

async fn find_tag<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    kind: TagKind,
) -> AppResult<Option<tags::Model>> {
    let tag = tags::Entity::find()
        .filter(tags::Column::Name.eq(name))
        .filter(tags::Column::Kind.eq(kind.as_str()))
        .one(conn)
        .await?;
    Ok(tag)
}

/// Tag names on create/update must already exist (the tags table is the
/// single source of category/collection names). Empty string means "none".
async fn resolve_tag_id(
    state: &AppState,
    name: Option<&str>,
    kind: TagKind,
) -> AppResult<Option<Uuid>> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    match find_tag(&state.orm, name, kind).await? {
        Some(tag) => Ok(Some(tag.id)),
        None => Err(AppError::BadRequest(format!(
            "Unknown {} \"{name}\"",
            kind.as_str()
        ))),
    }
}

/// Load the tags referenced by a batch of products, keyed by id.
pub async fn load_tag_map<C: ConnectionTrait>(
    conn: &C,
    products: &[ProductModel],
) -> AppResult<HashMap<Uuid, tags::Model>> {
    let ids: Vec<Uuid> = products
        .iter()
        .flat_map(|p| [p.category_id, p.collection_id])
        .flatten()
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let tags = tags::Entity::find()
        .filter(tags::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(tags.into_iter().map(|t| (t.id, t)).collect())
}

pub fn product_from_entity(model: ProductModel, tag_map: &HashMap<Uuid, tags::Model>) -> Product {
    let category = model.category_id.and_then(|id| tag_map.get(&id));
    let collection = model.collection_id.and_then(|id| tag_map.get(&id));

    let applied_sale = pricing::sale_percentage(
        model.sale_percentage,
        collection.map(|t| t.sale_percentage),
        category.map(|t| t.sale_percentage),
    );
    let effective_price = pricing::effective_price(model.price, applied_sale);

    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        sale_percentage: model.sale_percentage,
        effective_price,
        applied_sale,
        images: model.images.0,
        colors: model.colors.0,
        category_id: model.category_id,
        category: category.map(|t| t.name.clone()),
        collection_id: model.collection_id,
        collection: collection.map(|t| t.name.clone()),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
