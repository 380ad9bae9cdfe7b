use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Caller identity carried in the JWT. `User` resolves against the users
/// table, the other two against admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Category,
    Collection,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Category => "category",
            TagKind::Collection => "collection",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "category" => Some(TagKind::Category),
            "collection" => Some(TagKind::Collection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Instapay,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Instapay => "instapay",
            PaymentMethod::Card => "card",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(PaymentMethod::Cash),
            "instapay" => Some(PaymentMethod::Instapay),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

/// Structured address used for both user profiles and order shipping.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, FromJsonQueryResult,
)]
pub struct Address {
    pub city: Option<String>,
    pub area: Option<String>,
    pub street: Option<String>,
    pub landmarks: Option<String>,
    pub residence_type: Option<String>,
    pub floor: Option<String>,
    pub apartment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SizeStock {
    pub size: String,
    pub stock: i32,
}

/// A sellable color variant; stock is tracked per size label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ColorVariant {
    pub name: String,
    pub hex: Option<String>,
    pub image: Option<String>,
    pub sizes: Vec<SizeStock>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, FromJsonQueryResult,
)]
pub struct ColorVariants(pub Vec<ColorVariant>);

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, FromJsonQueryResult,
)]
pub struct ImageList(pub Vec<String>);

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, FromJsonQueryResult,
)]
pub struct WarningList(pub Vec<String>);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub kind: TagKind,
    pub sale_percentage: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub sale_percentage: i32,
    /// Price after sale resolution (product, then collection, then category).
    pub effective_price: i64,
    /// The percentage that actually applied; 0 when sold at full price.
    pub applied_sale: i32,
    pub images: Vec<String>,
    pub colors: Vec<ColorVariant>,
    pub category_id: Option<Uuid>,
    pub category: Option<String>,
    pub collection_id: Option<Uuid>,
    pub collection: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub orderer_name: Option<String>,
    pub orderer_email: Option<String>,
    pub shipping_address: Address,
    pub total_price: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    /// Per-item stock mismatches noticed at checkout (missing product,
    /// color or size). The order itself still went through.
    pub stock_warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub name: String,
    pub color: String,
    pub size: String,
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub body: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}
