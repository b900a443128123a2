// rest/routes/profile.rs — caller profile, created lazily on first access.

use axum::{extract::State, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::rest::auth::AuthedUser;
use crate::storage::ProfileRow;
use crate::AppContext;

const FULL_NAME_MAX: usize = 255;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
}

fn profile_json(username: &str, profile: &ProfileRow) -> Value {
    json!({
        "username": username,
        "full_name": profile.full_name,
        "bio": profile.bio,
        "created_at": profile.created_at,
        "updated_at": profile.updated_at,
    })
}

pub async fn get_profile(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Value>, ApiError> {
    let profile = ctx.storage.get_or_create_profile(&user.id).await?;
    Ok(Json(profile_json(&user.username, &profile)))
}

pub async fn update_profile(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    if let Some(name) = &body.full_name {
        if name.chars().count() > FULL_NAME_MAX {
            return Err(ApiError::Validation(format!(
                "Full name cannot exceed {FULL_NAME_MAX} characters"
            )));
        }
    }

    let profile = ctx
        .storage
        .update_profile(
            &user.id,
            body.full_name.as_deref(),
            body.bio.as_deref(),
            ctx.clock.now(),
        )
        .await?;
    Ok(Json(profile_json(&user.username, &profile)))
}
