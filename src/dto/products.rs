use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{ColorVariant, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub sale_percentage: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<ColorVariant>,
    /// Category tag name; must already exist.
    pub category: Option<String>,
    /// Collection tag name; must already exist.
    pub collection: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub sale_percentage: Option<i32>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<ColorVariant>>,
    pub category: Option<String>,
    pub collection: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
