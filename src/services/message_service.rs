use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set, ActiveModelTrait};
use uuid::Uuid;

use crate::{
    dto::messages::{CreateMessageRequest, MessageList},
    entity::messages::{ActiveModel, Column, Entity as Messages, Model as MessageModel},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_staff},
    models::Message,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn create_message(
    state: &AppState,
    payload: CreateMessageRequest,
) -> AppResult<ApiResponse<Message>> {
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        phone: Set(payload.phone),
        email: Set(payload.email),
        body: Set(payload.message),
        category: Set(payload.category),
        created_at: NotSet,
    };
    let message = active.insert(&state.orm).await?;

    // Staff inbox comes from the environment like the rest of the mail setup.
    let warning = match std::env::var("ADMIN_EMAIL") {
        Ok(admin_email) => state
            .mailer
            .send_contact_notification(
                &admin_email,
                &message.name,
                &message.email,
                &message.phone,
                &message.body,
            )
            .await
            .err()
            .map(|err| {
                tracing::warn!(error = %err, "contact notification email failed");
                "Message saved, but failed to notify the team.".to_string()
            }),
        Err(_) => None,
    };

    Ok(ApiResponse::with_warning(
        "Message received",
        message_from_entity(message),
        warning,
        None,
    ))
}

pub async fn list_messages(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<MessageList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Messages::find().order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(message_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Messages",
        MessageList { items },
        Some(meta),
    ))
}

fn message_from_entity(model: MessageModel) -> Message {
    Message {
        id: model.id,
        name: model.name,
        phone: model.phone,
        email: model.email,
        body: model.body,
        category: model.category,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
