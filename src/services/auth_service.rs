use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    config::AppConfig,
    dto::auth::{Claims, LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;

    let record = state.shop.lock().await.users.login_record(&username).cloned();
    let user = match record {
        Some(record) => tokio::task::spawn_blocking(move || {
            record.check_password(&password).then(|| record.to_user())
        })
        .await
        .map_err(|e| AppError::Internal(e.into()))?,
        None => None,
    };
    let Some(user) = user else {
        tracing::warn!(%username, "login failed");
        return Err(AppError::InvalidCredentials);
    };

    let session_id = state.shop.lock().await.sessions.open(user.clone());
    let token = issue_token(&state.config, &user, session_id)?;

    tracing::info!(user_id = %user.id, role = %user.role, "login");
    log_audit(
        None,
        "user_login",
        "sessions",
        serde_json::json!({ "user_id": user.id, "session_id": session_id }),
    );

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
            user,
        },
        Some(Meta::empty()),
    ))
}

pub async fn logout_user(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let mut shop = state.shop.lock().await;
    shop.sessions.close(user.session_id);

    log_audit(
        Some(user),
        "user_logout",
        "sessions",
        serde_json::json!({ "session_id": user.session_id }),
    );
    Ok(ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub fn current_user(user: &AuthUser) -> ApiResponse<User> {
    ApiResponse::success(
        "Current user",
        User {
            id: user.user_id,
            username: user.username.clone(),
            role: user.role,
        },
        None,
    )
}

pub fn issue_token(config: &AppConfig, user: &User, session_id: Uuid) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(config.session_ttl())
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.to_string(),
        sid: session_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
