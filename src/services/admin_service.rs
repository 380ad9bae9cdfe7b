use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::admins::{AdminList, CreateAdminRequest, UpdateAdminRequest, UserList},
    entity::{
        admins::{ActiveModel as AdminActive, Column as AdminCol, Entity as Admins, Model as AdminModel},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::{Admin, Role, User},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::auth_service::hash_password,
    state::AppState,
};

pub async fn list_admins(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AdminList>> {
    ensure_superadmin(user)?;
    let items = Admins::find()
        .order_by_asc(AdminCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(admin_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Admins",
        AdminList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_admin(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAdminRequest,
) -> AppResult<ApiResponse<Admin>> {
    ensure_superadmin(user)?;

    let email = payload.email.trim().to_lowercase();
    let existing = Admins::find()
        .filter(AdminCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Email exists".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let active = AdminActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(Role::Admin.as_str().to_string()),
        created_at: NotSet,
    };
    let admin = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "admin_create",
        Some("admins"),
        Some(serde_json::json!({ "admin_id": admin.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Admin created",
        admin_from_entity(admin),
        Some(Meta::empty()),
    ))
}

pub async fn update_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAdminRequest,
) -> AppResult<ApiResponse<Admin>> {
    ensure_superadmin(user)?;

    let existing = Admins::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let mut active: AdminActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        active.email = Set(email.trim().to_lowercase());
    }
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(role) = payload.role {
        let role = Role::parse(&role).filter(|r| r.is_staff()).ok_or_else(|| {
            AppError::BadRequest("Role must be admin or superadmin".into())
        })?;
        active.role = Set(role.as_str().to_string());
    }
    let admin = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "admin_update",
        Some("admins"),
        Some(serde_json::json!({ "admin_id": admin.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Admin updated",
        admin_from_entity(admin),
        Some(Meta::empty()),
    ))
}

pub async fn delete_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;

    let result = Admins::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "admin_delete",
        Some("admins"),
        Some(serde_json::json!({ "admin_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Admin deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_superadmin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;

    // Order history survives; the FK nulls out user_id on those rows.
    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        Some(user.role),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn admin_from_entity(model: AdminModel) -> Admin {
    Admin {
        id: model.id,
        name: model.name,
        email: model.email,
        role: Role::parse(&model.role).unwrap_or(Role::Admin),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
