use crate::dtos::tcc::{
    TccRequestResponse, TccRequestWithTaxpayerResponse, UpdateTccStatusRequest,
};
use crate::handlers::{require_profile, require_staff};
use crate::middleware::UserId;
use crate::services::metrics::record_tcc_request;
use crate::services::notifier::Notice;
use crate::startup::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use service_core::error::AppError;
use uuid::Uuid;

/// Request a tax clearance certificate. A taxpayer has at most one live
/// request; re-requesting after a rejection resets the same row to pending.
pub async fn create_tcc_request(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<impl IntoResponse, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    let request = state.db.upsert_tcc_request(actor.profile_id).await?;
    record_tcc_request(&request.status);

    state
        .notifier
        .dispatch(Notice::staff(
            "New TCC Request",
            "A taxpayer has submitted a new TCC request requiring review.",
        ))
        .await;

    Ok((StatusCode::CREATED, Json(TccRequestResponse::from(request))))
}

/// The caller's live request, if any.
pub async fn get_my_tcc_request(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<TccRequestResponse>, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    let request = state
        .db
        .get_tcc_request_for_taxpayer(actor.profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No TCC request on record")))?;

    Ok(Json(TccRequestResponse::from(request)))
}

/// All requests for staff review, newest first.
pub async fn list_tcc_requests(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<Vec<TccRequestWithTaxpayerResponse>>, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;
    require_staff(&actor)?;

    let requests = state.db.list_tcc_requests().await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Review outcome: staff overwrite the status and the taxpayer is told.
pub async fn update_tcc_status(
    State(state): State<AppState>,
    user_id: UserId,
    Path(request_id): Path<Uuid>,
    Json(req): Json<UpdateTccStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;
    require_staff(&actor)?;

    let request = state
        .db
        .update_tcc_status(request_id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("TCC request not found")))?;

    state
        .notifier
        .dispatch(vec![Notice::user(
            request.taxpayer_id,
            format!("TCC Request {}", req.status.label()),
            format!(
                "Your Tax Clearance Certificate request has been {}.",
                req.status.label().to_lowercase()
            ),
        )])
        .await;

    Ok(Json(TccRequestResponse::from(request)))
}
