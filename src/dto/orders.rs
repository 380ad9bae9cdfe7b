use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Address, Order, OrderItem, PaymentMethod};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrdererRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Kept optional so an absent list is a 400, not a deserialization error.
    pub items: Option<Vec<OrderItemRequest>>,
    pub shipping_address: Option<Address>,
    pub total_price: i64,
    pub payment_method: Option<PaymentMethod>,
    pub orderer: Option<OrdererRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_number: String,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
