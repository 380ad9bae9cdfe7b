use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Message;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageList {
    pub items: Vec<Message>,
}
