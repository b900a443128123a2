// rest/routes/reactions.rs — heart toggle endpoint.

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::reactions::toggle_heart;
use crate::rest::auth::AuthedUser;
use crate::AppContext;

pub async fn toggle(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let outcome = toggle_heart(&ctx.storage, &user.id, &id).await?;
    Ok(Json(json!({
        "message": outcome.action.message(),
        "heart_count": outcome.heart_count,
    })))
}
