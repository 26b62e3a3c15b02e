use crate::middleware::UserId;
use crate::models::Notification;
use crate::startup::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use service_core::error::AppError;
use uuid::Uuid;

/// The caller's inbox, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = state.db.list_notifications_for_user(user_id.0).await?;
    Ok(Json(notifications))
}

/// Mark one of the caller's notifications read. Another user's entry is
/// indistinguishable from a missing one.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user_id: UserId,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = state
        .db
        .mark_notification_read(notification_id, user_id.0)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Notification not found")))?;

    Ok(Json(notification))
}
