use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::auth::{
        AuthIdentity, AuthResponse, ChangePasswordRequest, Claims, ForgotPasswordRequest,
        LoginRequest, RegisterRequest, ResetPasswordRequest, VerifyResponse,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, Role},
    otp,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    address: Option<Json<Address>>,
    reset_otp: Option<String>,
    reset_otp_expires: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct AdminRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest {
        name,
        email,
        password,
        phone,
        address,
    } = payload;
    let email = clean_email(&email);

    if password.len() < 5 {
        return Err(AppError::BadRequest(
            "Password must be at least 5 characters.".to_string(),
        ));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email already exists".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, phone, password_hash, address)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(name.as_str())
    .bind(email.as_str())
    .bind(phone.as_str())
    .bind(password_hash)
    .bind(address.as_ref().map(|a| Json(a.clone())))
    .execute(&state.pool)
    .await?;

    let token = sign_token(id, Role::User)?;

    let warning = state
        .mailer
        .send_welcome(&email, &name)
        .await
        .err()
        .map(|err| {
            tracing::warn!(error = %err, "welcome email failed");
            "Registration succeeded, but failed to send welcome email.".to_string()
        });

    if let Err(err) = log_audit(
        &state.pool,
        Some(id),
        Some(Role::User),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let identity = AuthIdentity {
        id,
        name,
        email,
        role: Role::User,
        phone: Some(phone),
        address,
    };
    Ok(ApiResponse::with_warning(
        "User registered",
        AuthResponse {
            token,
            user: identity,
        },
        warning,
        None,
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;
    let email = clean_email(&email);

    // Customers first, then the staff table.
    let user: Option<UserRow> = sqlx::query_as(
        "SELECT id, name, email, phone, password_hash, address, reset_otp, reset_otp_expires \
         FROM users WHERE email = $1",
    )
    .bind(email.as_str())
    .fetch_optional(&state.pool)
    .await?;

    let (identity, password_hash) = match user {
        Some(row) => {
            let hash = row.password_hash.clone();
            (identity_from_user(row), hash)
        }
        None => {
            let admin: Option<AdminRow> = sqlx::query_as(
                "SELECT id, name, email, password_hash, role FROM admins WHERE email = $1",
            )
            .bind(email.as_str())
            .fetch_optional(&state.pool)
            .await?;
            let row = match admin {
                Some(row) => row,
                None => return Err(AppError::BadRequest("Invalid credentials".into())),
            };
            let hash = row.password_hash.clone();
            (identity_from_admin(row), hash)
        }
    };

    if !verify_password(&password_hash, &password) {
        return Err(AppError::BadRequest("Invalid credentials".into()));
    }

    let token = sign_token(identity.id, identity.role)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(identity.id),
        Some(identity.role),
        "login",
        None,
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Logged in",
        AuthResponse {
            token,
            user: identity,
        },
        Some(Meta::empty()),
    ))
}

pub async fn verify_identity(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<VerifyResponse>> {
    let identity = load_identity(state, user).await?;
    Ok(ApiResponse::success(
        "Token is valid",
        VerifyResponse {
            valid: true,
            user: identity,
        },
        None,
    ))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = clean_email(&payload.email);
    let user = find_user_by_email(state, &email)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".into()))?;

    let warning = issue_otp(state, &user).await?;
    Ok(ApiResponse::with_warning(
        "OTP sent to email",
        serde_json::json!({}),
        warning,
        None,
    ))
}

pub async fn resend_otp(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = clean_email(&payload.email);
    let user = find_user_by_email(state, &email)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".into()))?;

    if user.reset_otp.is_some() {
        if let Some(wait) = otp::resend_wait_secs(user.reset_otp_expires, Utc::now()) {
            return Err(AppError::TooManyRequests(format!(
                "Please wait {wait} seconds before resending OTP."
            )));
        }
    }

    let warning = issue_otp(state, &user).await?;
    Ok(ApiResponse::with_warning(
        "OTP resent to email",
        serde_json::json!({}),
        warning,
        None,
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = clean_email(&payload.email);
    let user = find_user_by_email(state, &email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired OTP".into()))?;

    if !otp::code_matches(
        user.reset_otp.as_deref(),
        user.reset_otp_expires,
        &payload.otp,
        Utc::now(),
    ) {
        return Err(AppError::BadRequest("Invalid or expired OTP".into()));
    }

    let password_hash = hash_password(&payload.new_password)?;
    sqlx::query(
        "UPDATE users SET password_hash = $2, reset_otp = NULL, reset_otp_expires = NULL, \
         updated_at = now() WHERE id = $1",
    )
    .bind(user.id)
    .bind(password_hash)
    .execute(&state.pool)
    .await?;

    let warning = state
        .mailer
        .send_password_changed(&user.email, &user.name)
        .await
        .err()
        .map(|err| {
            tracing::warn!(error = %err, "password-changed email failed");
            "Password reset, but failed to send confirmation email.".to_string()
        });

    Ok(ApiResponse::with_warning(
        "Password reset successful",
        serde_json::json!({}),
        warning,
        None,
    ))
}

pub async fn change_password(
    state: &AppState,
    auth: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user: Option<UserRow> = sqlx::query_as(
        "SELECT id, name, email, phone, password_hash, address, reset_otp, reset_otp_expires \
         FROM users WHERE id = $1",
    )
    .bind(auth.id)
    .fetch_optional(&state.pool)
    .await?;
    let user = user.ok_or(AppError::NotFound)?;

    if !verify_password(&user.password_hash, &payload.old_password) {
        return Err(AppError::BadRequest("Old password incorrect".into()));
    }

    let password_hash = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(user.id)
        .bind(password_hash)
        .execute(&state.pool)
        .await?;

    let warning = state
        .mailer
        .send_password_changed(&user.email, &user.name)
        .await
        .err()
        .map(|err| {
            tracing::warn!(error = %err, "password-changed email failed");
            "Password changed, but failed to send confirmation email.".to_string()
        });

    Ok(ApiResponse::with_warning(
        "Password changed successfully",
        serde_json::json!({}),
        warning,
        None,
    ))
}

/// Generate, store and mail a fresh OTP; returns the email warning, if any.
async fn issue_otp(state: &AppState, user: &UserRow) -> AppResult<Option<String>> {
    let code = otp::generate_code();
    let expires = otp::expiry_from(Utc::now());

    sqlx::query(
        "UPDATE users SET reset_otp = $2, reset_otp_expires = $3, updated_at = now() \
         WHERE id = $1",
    )
    .bind(user.id)
    .bind(code.as_str())
    .bind(expires)
    .execute(&state.pool)
    .await?;

    let warning = state
        .mailer
        .send_otp(&user.email, &user.name, &code)
        .await
        .err()
        .map(|err| {
            tracing::warn!(error = %err, "otp email failed");
            "OTP generated, but failed to send email.".to_string()
        });
    Ok(warning)
}

async fn find_user_by_email(state: &AppState, email: &str) -> AppResult<Option<UserRow>> {
    let user = sqlx::query_as(
        "SELECT id, name, email, phone, password_hash, address, reset_otp, reset_otp_expires \
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(&state.pool)
    .await?;
    Ok(user)
}

async fn load_identity(state: &AppState, user: &AuthUser) -> AppResult<AuthIdentity> {
    if user.role == Role::User {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, phone, password_hash, address, reset_otp, reset_otp_expires \
             FROM users WHERE id = $1",
        )
        .bind(user.id)
        .fetch_optional(&state.pool)
        .await?;
        return row.map(identity_from_user).ok_or(AppError::Unauthorized);
    }

    let row: Option<AdminRow> =
        sqlx::query_as("SELECT id, name, email, password_hash, role FROM admins WHERE id = $1")
            .bind(user.id)
            .fetch_optional(&state.pool)
            .await?;
    row.map(identity_from_admin).ok_or(AppError::Unauthorized)
}

fn identity_from_user(row: UserRow) -> AuthIdentity {
    AuthIdentity {
        id: row.id,
        name: row.name,
        email: row.email,
        role: Role::User,
        phone: Some(row.phone),
        address: row.address.map(|a| a.0),
    }
}

fn identity_from_admin(row: AdminRow) -> AuthIdentity {
    AuthIdentity {
        id: row.id,
        name: row.name,
        email: row.email,
        role: Role::parse(&row.role).unwrap_or(Role::Admin),
        phone: None,
        address: None,
    }
}

fn clean_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn sign_token(id: Uuid, role: Role) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: id.to_string(),
        role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
