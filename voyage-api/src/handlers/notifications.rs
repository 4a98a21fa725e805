use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use voyage_core::types::Notification;

use crate::error::ApiResult;
use crate::state::ApiState;

pub const CHECK_UPCOMING_REPLY: &str = "Checked upcoming tours and sent notifications";

// `:id` is a user id on the listing routes and a notification id on the
// single-notification routes; the router needs one name per segment.

pub async fn for_user(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.notifications.list_for_user(&user_id).await?))
}

pub async fn mark_read(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(state.notifications.mark_read(&id).await?))
}

pub async fn mark_all_read(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.notifications.mark_all_read(&user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn delete(
    Extension(state): Extension<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.notifications.delete(&id).await?;
    Ok(StatusCode::OK)
}

pub async fn unread_count(
    Extension(state): Extension<ApiState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<i64>> {
    Ok(Json(state.notifications.unread_count(&user_id).await?))
}

/// Runs one reminder scan now. Scan failures are logged, never surfaced.
pub async fn check_upcoming(Extension(state): Extension<ApiState>) -> &'static str {
    tracing::info!("Manual reminder check triggered");
    let report = state.scheduler.check_upcoming().await;
    if report.aborted {
        tracing::warn!("Manual reminder check could not load bookings");
    }
    CHECK_UPCOMING_REPLY
}
