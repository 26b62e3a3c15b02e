use crate::dtos::payments::SettleRequest;
use crate::handlers::require_profile;
use crate::middleware::UserId;
use crate::models::{HIGH_VALUE_THRESHOLD, Payment, Role};
use crate::services::metrics::record_payment_settled;
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

/// Settle an assessment. The database transaction is the atomic boundary:
/// ownership check, status flip and payment insert commit together or not
/// at all, so a failure here implies no partial effects.
pub async fn settle_assessment(
    State(state): State<AppState>,
    user_id: UserId,
    Path(assessment_id): Path<Uuid>,
    Json(req): Json<SettleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    let payment = state
        .db
        .settle_assessment(assessment_id, actor.profile_id, req.amount)
        .await?;

    let high_value = payment.amount > HIGH_VALUE_THRESHOLD;
    record_payment_settled(high_value);

    let mut notices = vec![Notice::user(
        actor.profile_id,
        "Payment Successful",
        format!(
            "Your payment of ${} has been successfully processed.",
            payment.amount
        ),
    )];
    if high_value {
        notices.push(Notice::role(
            Role::Admin,
            "High Value Transaction",
            format!(
                "A large payment of ${} was received from Taxpayer ID: {}.",
                payment.amount, actor.profile_id
            ),
        ));
    }
    state.notifier.dispatch(notices).await;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// The caller's payment history, newest first.
pub async fn list_payments(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<Vec<Payment>>, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;
    let payments = state.db.list_payments_for_taxpayer(actor.profile_id).await?;
    Ok(Json(payments))
}
