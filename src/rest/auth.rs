// rest/auth.rs — Bearer token auth middleware.
//
// Every protected route requires `Authorization: Bearer <token>` where the
// token is the opaque credential issued at register/login and stored in the
// `auth_tokens` table. On success the resolved user is injected as a request
// extension for the handlers.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppContext;

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

pub async fn require_auth(
    State(ctx): State<Arc<AppContext>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return ApiError::Unauthorized.into_response();
    };

    match ctx.storage.get_user_by_token(token).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(AuthedUser {
                id: user.id,
                username: user.username,
                email: user.email,
            });
            next.run(req).await
        }
        Ok(None) => ApiError::Unauthorized.into_response(),
        Err(e) => ApiError::Internal(e).into_response(),
    }
}
