use crate::dtos::assessments::{
    AssessmentResponse, AssessmentWithTaxpayerResponse, CreateAssessmentRequest,
    ListAssessmentsParams,
};
use crate::handlers::{require_profile, require_staff};
use crate::middleware::UserId;
use crate::models::{CreateAssessment, assessment};
use crate::services::metrics::record_assessment_created;
use crate::services::notifier::Notice;
use crate::startup::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

/// File a self-assessment, or (staff) raise a manual assessment for a named
/// taxpayer. The rate is read from the configuration at this moment and
/// frozen into the row; a missing configuration writes nothing.
pub async fn create_assessment(
    State(state): State<AppState>,
    user_id: UserId,
    Json(req): Json<CreateAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let actor = require_profile(&state.db, user_id.0).await?;

    let taxpayer_id = match req.taxpayer_id {
        Some(id) if id != actor.profile_id => {
            require_staff(&actor)?;
            state
                .db
                .get_profile(id)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Taxpayer not found")))?;
            id
        }
        _ => actor.profile_id,
    };

    let tax_type = req.tax_type.as_str();
    let rate = state.db.get_tax_rate(tax_type).await?.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "No tax rate configured for category '{}'",
            tax_type
        ))
    })?;

    let today = Utc::now().date_naive();
    let input = CreateAssessment {
        taxpayer_id,
        tax_type: tax_type.to_string(),
        period: req.period,
        taxable_income: req.taxable_income,
        tax_rate_applied: rate,
        amount_due: assessment::compute_amount_due(req.taxable_income, rate),
        due_date: assessment::due_date_from(today),
    };

    let created = state.db.create_assessment(&input).await?;
    record_assessment_created(&created.tax_type);

    // Best-effort: a failed inbox insert must not fail the filing.
    state
        .notifier
        .dispatch(vec![Notice::user(
            taxpayer_id,
            "New Tax Assessment",
            format!(
                "A new assessment for the period {} has been issued.",
                created.period
            ),
        )])
        .await;

    Ok((
        StatusCode::CREATED,
        Json(AssessmentResponse::from_assessment(created, today)),
    ))
}

/// Taxpayers see their own assessments, due date descending. Staff may scope
/// to one taxpayer or fetch everything with the owning profile joined.
pub async fn list_assessments(
    State(state): State<AppState>,
    user_id: UserId,
    Query(params): Query<ListAssessmentsParams>,
) -> Result<impl IntoResponse, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;
    let today = Utc::now().date_naive();

    if !actor.role().is_staff() {
        let assessments = state
            .db
            .list_assessments_for_taxpayer(actor.profile_id)
            .await?;
        let body: Vec<AssessmentResponse> = assessments
            .into_iter()
            .map(|a| AssessmentResponse::from_assessment(a, today))
            .collect();
        return Ok(Json(body).into_response());
    }

    match params.taxpayer_id {
        Some(taxpayer_id) => {
            let assessments = state.db.list_assessments_for_taxpayer(taxpayer_id).await?;
            let body: Vec<AssessmentResponse> = assessments
                .into_iter()
                .map(|a| AssessmentResponse::from_assessment(a, today))
                .collect();
            Ok(Json(body).into_response())
        }
        None => {
            let assessments = state.db.list_assessments().await?;
            let body: Vec<AssessmentWithTaxpayerResponse> = assessments
                .into_iter()
                .map(|row| AssessmentWithTaxpayerResponse::from_row(row, today))
                .collect();
            Ok(Json(body).into_response())
        }
    }
}

/// Single assessment lookup; owners and staff only.
pub async fn get_assessment(
    State(state): State<AppState>,
    user_id: UserId,
    Path(assessment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    let assessment = state
        .db
        .get_assessment(assessment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Assessment not found")))?;

    if assessment.taxpayer_id != actor.profile_id {
        require_staff(&actor)?;
    }

    let today = Utc::now().date_naive();
    Ok(Json(AssessmentResponse::from_assessment(assessment, today)))
}
