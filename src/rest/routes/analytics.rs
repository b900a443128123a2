// rest/routes/analytics.rs — per-user analytics report endpoint.
//
// Always 200 for an authenticated caller: a user with zero dreams still
// gets a fully-populated report.

use axum::{extract::State, response::Json, Extension};
use std::sync::Arc;

use crate::analytics::{build_report, model::AnalyticsReport};
use crate::error::ApiError;
use crate::rest::auth::AuthedUser;
use crate::AppContext;

pub async fn get_analytics(
    State(ctx): State<Arc<AppContext>>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let report = build_report(&ctx.analytics, ctx.clock.as_ref(), &user.id).await?;
    Ok(Json(report))
}
