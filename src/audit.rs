use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult, models::Role};

pub async fn log_audit(
    pool: &DbPool,
    actor_id: Option<Uuid>,
    actor_role: Option<Role>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, actor_id, actor_role, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(actor_id)
    .bind(actor_role.map(|r| r.as_str()))
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}
