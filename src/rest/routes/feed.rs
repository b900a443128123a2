// rest/routes/feed.rs — public dream feed.
//
// Each feed entry nests the author's profile and the current heart count in
// the `reactions: [{count}]` shape the dashboard consumes.

use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::rest::auth::AuthedUser;
use crate::AppContext;

pub async fn public_dreams(
    State(ctx): State<Arc<AppContext>>,
    Extension(_user): Extension<AuthedUser>,
) -> Result<Json<Value>, ApiError> {
    let rows = ctx.storage.list_public_dreams().await?;
    let list: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "id": row.id,
                "title": row.title,
                "content": row.content,
                "mood": row.mood,
                "tags": row.tags_vec(),
                "created_at": row.created_at,
                "profiles": {
                    "username": row.username,
                    "full_name": row.full_name,
                    "bio": row.bio,
                },
                "reactions": [{ "count": row.heart_count }],
            })
        })
        .collect();
    Ok(Json(json!(list)))
}
