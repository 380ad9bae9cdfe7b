use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        CheckoutResponse, CreateOrderRequest, OrderItemRequest, OrderList, OrderWithItems,
        UpdateOrderStatusRequest,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        products::{ActiveModel as ProductActive, Entity as Products},
    },
    error::{AppError, AppResult},
    inventory::{self, StockAdjust},
    middleware::auth::{AuthUser, ensure_staff},
    models::{ColorVariants, Order, OrderItem, OrderStatus, PaymentMethod, Role, WarningList},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SortOrder},
    state::AppState,
};

/// Place an order. Sequence number, order row, item rows and every stock
/// decrement commit in one transaction; the confirmation email runs after
/// commit and only ever degrades to a response warning.
pub async fn create_order(
    state: &AppState,
    auth: Option<&AuthUser>,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let items = match payload.items {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(AppError::BadRequest(
                "Order must contain at least one item.".into(),
            ));
        }
    };
    for item in &items {
        if item.quantity < 1 {
            return Err(AppError::BadRequest(
                "Item quantity must be at least 1.".into(),
            ));
        }
        if item.unit_price < 0 {
            return Err(AppError::BadRequest("Item price cannot be negative.".into()));
        }
    }
    if payload.total_price < 0 {
        return Err(AppError::BadRequest("Total price cannot be negative.".into()));
    }

    let txn = state.orm.begin().await?;

    let seq = next_sequence(&txn).await?;
    let order_number = format!("ORD-{seq}");

    let warnings = apply_stock_decrements(&txn, &items).await?;

    // Tokens from the staff table never own orders; staff checkouts are
    // recorded like guest ones.
    let user_id = auth.filter(|u| u.role == Role::User).map(|u| u.id);
    let (orderer_name, orderer_email) = payload
        .orderer
        .map(|o| (o.name, o.email))
        .unwrap_or((None, None));

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        order_number: Set(order_number.clone()),
        user_id: Set(user_id),
        orderer_name: Set(orderer_name),
        orderer_email: Set(orderer_email),
        shipping_address: Set(payload.shipping_address.unwrap_or_default()),
        total_price: Set(payload.total_price),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        payment_method: Set(payload
            .payment_method
            .unwrap_or(PaymentMethod::Cash)
            .as_str()
            .to_string()),
        stock_warnings: Set(WarningList(warnings.clone())),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::new();
    for item in &items {
        let stored = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            name: Set(item.name.clone()),
            color: Set(item.color.clone()),
            size: Set(item.size.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(order_item_from_entity(stored));
    }

    txn.commit().await?;

    for warning in &warnings {
        tracing::warn!(order_number = %order.order_number, %warning, "stock adjustment miss");
    }

    let email_warning = match order.orderer_email.as_deref() {
        Some(email) => state
            .mailer
            .send_order_confirmation(email, &order.order_number, order.total_price)
            .await
            .err()
            .map(|err| {
                tracing::warn!(error = %err, "order confirmation email failed");
                "Order placed, but failed to send confirmation email.".to_string()
            }),
        None => None,
    };

    if let Err(err) = log_audit(
        &state.pool,
        user_id,
        user_id.map(|_| Role::User),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "order_number": order.order_number })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::with_warning(
        "Order placed",
        CheckoutResponse {
            order_number,
            order: order_from_entity(order),
            items: order_items,
        },
        email_warning,
        Some(Meta::empty()),
    ))
}

pub async fn get_order_by_number(
    state: &AppState,
    user: &AuthUser,
    order_number: &str,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(OrderCol::OrderNumber.eq(order_number))
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if !user.role.is_staff() && order.user_id != Some(user.id) {
        return Err(AppError::Forbidden);
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status = OrderStatus::parse(status)
            .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    order_number: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    let status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;

    let existing = Orders::find()
        .filter(OrderCol::OrderNumber.eq(order_number))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = existing.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Atomically bump the shared counter. The counter row stays locked until the
/// surrounding transaction commits, so concurrent checkouts serialize here and
/// can never observe the same sequence value.
async fn next_sequence(txn: &DatabaseTransaction) -> AppResult<i64> {
    let stmt = Statement::from_string(
        txn.get_database_backend(),
        "INSERT INTO order_counters (name, seq) VALUES ('order', 1001) \
         ON CONFLICT (name) DO UPDATE SET seq = order_counters.seq + 1 RETURNING seq",
    );
    let row = txn
        .query_one(stmt)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order counter returned no row")))?;
    let seq: i64 = row.try_get("", "seq")?;
    Ok(seq)
}

/// Decrement stock for every line item, locking each touched product.
/// Items whose product, color or size cannot be found do not fail the order;
/// they come back as warning strings for the order record.
async fn apply_stock_decrements(
    txn: &DatabaseTransaction,
    items: &[OrderItemRequest],
) -> AppResult<Vec<String>> {
    let mut warnings: Vec<String> = Vec::new();

    for item in items {
        let Some(product_id) = item.product_id else {
            warnings.push(format!("{}: no product reference", item.name));
            continue;
        };
        let product = Products::find_by_id(product_id)
            .lock(LockType::Update)
            .one(txn)
            .await?;
        let Some(product) = product else {
            warnings.push(format!("{}: product no longer in catalog", item.name));
            continue;
        };

        let mut colors = product.colors.0.clone();
        match inventory::decrement(&mut colors, &item.color, &item.size, item.quantity) {
            StockAdjust::Applied { .. } => {
                let mut active: ProductActive = product.into();
                active.colors = Set(ColorVariants(colors));
                active.updated_at = Set(Utc::now().into());
                active.update(txn).await?;
            }
            StockAdjust::ColorMissing => {
                warnings.push(format!(
                    "{}: color \"{}\" not available",
                    item.name, item.color
                ));
            }
            StockAdjust::SizeMissing => {
                warnings.push(format!(
                    "{}: size \"{}\" not available in color \"{}\"",
                    item.name, item.size, item.color
                ));
            }
        }
    }

    Ok(warnings)
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        order_number: model.order_number,
        user_id: model.user_id,
        orderer_name: model.orderer_name,
        orderer_email: model.orderer_email,
        shipping_address: model.shipping_address,
        total_price: model.total_price,
        status: OrderStatus::parse(&model.status).unwrap_or(OrderStatus::Pending),
        payment_method: PaymentMethod::parse(&model.payment_method).unwrap_or(PaymentMethod::Cash),
        stock_warnings: model.stock_warnings.0,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        color: model.color,
        size: model.size,
        quantity: model.quantity,
        unit_price: model.unit_price,
    }
}
