// rest/routes/auth.rs — register, login, logout, me.
//
// Register and login both answer `{token, user: {id, username, email}}`.
// The token is issued once per user and re-used across logins; logout
// deletes it, invalidating every session.

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{generate_token, hash_password, verify_password};
use crate::error::ApiError;
use crate::rest::auth::AuthedUser;
use crate::AppContext;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 8;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn user_json(id: &str, username: &str, email: &str) -> Value {
    json!({ "id": id, "username": username, "email": email })
}

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let username = body.username.trim();
    let email = body.email.trim();

    if username.chars().count() < USERNAME_MIN || username.chars().count() > USERNAME_MAX {
        return Err(ApiError::Validation(format!(
            "Username must be {USERNAME_MIN}-{USERNAME_MAX} characters"
        )));
    }
    if !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if body.password.chars().count() < PASSWORD_MIN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {PASSWORD_MIN} characters"
        )));
    }
    if ctx.storage.username_exists(username).await? {
        return Err(ApiError::Validation("Username already taken".to_string()));
    }
    if ctx.storage.email_exists(email).await? {
        return Err(ApiError::Validation("Email already registered".to_string()));
    }

    let password_hash = hash_password(&body.password)?;
    let user = ctx
        .storage
        .create_user(username, email, &password_hash)
        .await?;
    ctx.storage.get_or_create_profile(&user.id).await?;
    let token = ctx
        .storage
        .get_or_insert_token(&user.id, &generate_token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "user": user_json(&user.id, &user.username, &user.email),
        })),
    ))
}

pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    // A missing user and a bad password answer identically.
    let invalid = || ApiError::Validation("Invalid credentials".to_string());

    let user = ctx
        .storage
        .get_user_by_email(body.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&body.password, &user.password_hash) {
        return Err(invalid());
    }

    let token = ctx
        .storage
        .get_or_insert_token(&user.id, &generate_token())
        .await?;

    Ok(Json(json!({
        "token": token,
        "user": user_json(&user.id, &user.username, &user.email),
    })))
}

pub async fn logout(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Value>, ApiError> {
    ctx.storage.delete_tokens_for_user(&user.id).await?;
    Ok(Json(json!({})))
}

pub async fn me(Extension(user): Extension<AuthedUser>) -> Json<Value> {
    Json(user_json(&user.id, &user.username, &user.email))
}
