// rest/routes/dreams.rs — owner-scoped dream CRUD.
//
// Every operation here is bounded to the caller's own dreams; another user's
// dream id answers 404, never 403, so dream existence is not leaked.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::rest::auth::AuthedUser;
use crate::storage::DreamRow;
use crate::AppContext;

#[derive(Deserialize)]
pub struct CreateDreamRequest {
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_public: bool,
}

/// Partial update: absent fields keep their stored value.
/// An empty-string mood clears it.
#[derive(Deserialize)]
pub struct UpdateDreamRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

pub(crate) fn dream_json(row: &DreamRow) -> Value {
    json!({
        "id": row.id,
        "title": row.title,
        "content": row.content,
        "mood": row.mood,
        "tags": row.tags_vec(),
        "is_public": row.is_public,
        "created_at": row.created_at,
        "updated_at": row.updated_at,
    })
}

pub async fn list_dreams(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Value>, ApiError> {
    let dreams = ctx.storage.list_dreams_for_user(&user.id).await?;
    let list: Vec<Value> = dreams.iter().map(dream_json).collect();
    Ok(Json(json!(list)))
}

pub async fn create_dream(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreateDreamRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if body.content.trim().is_empty() {
        return Err(ApiError::Validation("Content is required".to_string()));
    }

    let dream = ctx
        .storage
        .create_dream(
            &user.id,
            body.title.trim(),
            &body.content,
            body.mood.as_deref(),
            &body.tags.unwrap_or_default(),
            body.is_public,
            ctx.clock.now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(dream_json(&dream))))
}

pub async fn update_dream(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateDreamRequest>,
) -> Result<Json<Value>, ApiError> {
    let current = ctx
        .storage
        .get_dream_owned(&id, &user.id)
        .await?
        .ok_or(ApiError::NotFound("Dream not found"))?;

    let title = body.title.unwrap_or_else(|| current.title.clone());
    if title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    let content = body.content.unwrap_or_else(|| current.content.clone());
    let mood = match &body.mood {
        Some(m) => Some(m.as_str()),
        None => current.mood.as_deref(),
    };
    let tags = body.tags.unwrap_or_else(|| current.tags_vec());
    let is_public = body.is_public.unwrap_or(current.is_public);

    let updated = ctx
        .storage
        .update_dream(
            &id,
            title.trim(),
            &content,
            mood,
            &tags,
            is_public,
            ctx.clock.now(),
        )
        .await?;
    Ok(Json(dream_json(&updated)))
}

pub async fn delete_dream(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !ctx.storage.delete_dream(&id, &user.id).await? {
        return Err(ApiError::NotFound("Dream not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
