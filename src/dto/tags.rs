use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Tag;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub name: String,
    /// "category" or "collection".
    pub kind: String,
    pub sale_percentage: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagSaleRequest {
    pub name: String,
    pub sale_percentage: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagList {
    pub items: Vec<Tag>,
}
