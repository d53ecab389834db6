use crate::{
    audit::log_audit,
    dto::users::{CreateUserRequest, UserList},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
    stores::users::hash_password,
};

pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let shop = state.shop.lock().await;
    let items = shop.users.users();
    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username is required".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::BadRequest("password is required".into()));
    }

    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let mut shop = state.shop.lock().await;
    let created = shop.users.add_hashed_user(username, password_hash, payload.role);
    state.persist_users(&shop).await?;

    log_audit(
        Some(user),
        "user_create",
        "users",
        serde_json::json!({ "user_id": created.id, "role": created.role }),
    );
    Ok(ApiResponse::success("User created", created, Some(Meta::empty())))
}
