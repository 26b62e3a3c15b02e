use crate::dtos::rates::UpdateRatesRequest;
use crate::handlers::{require_admin, require_profile};
use crate::middleware::UserId;
use crate::models::TaxConfiguration;
use crate::startup::AppState;
use axum::{Json, extract::State};
use service_core::error::AppError;
use validator::Validate;

/// Current rate table. Any authenticated user may read it; the filing form
/// shows the applicable rate before submission.
pub async fn list_rates(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<Vec<TaxConfiguration>>, AppError> {
    require_profile(&state.db, user_id.0).await?;
    let configs = state.db.list_tax_configurations().await?;
    Ok(Json(configs))
}

/// Replace rates by category (admin only). Assessments already on file keep
/// the rate frozen at their creation.
pub async fn update_rates(
    State(state): State<AppState>,
    user_id: UserId,
    Json(req): Json<UpdateRatesRequest>,
) -> Result<Json<Vec<TaxConfiguration>>, AppError> {
    req.validate()?;

    let actor = require_profile(&state.db, user_id.0).await?;
    require_admin(&actor)?;

    let configs: Vec<TaxConfiguration> = req
        .rates
        .into_iter()
        .map(|entry| TaxConfiguration {
            tax_type: entry.tax_type.as_str().to_string(),
            rate: entry.rate,
        })
        .collect();

    state.db.upsert_tax_configurations(&configs).await?;

    let current = state.db.list_tax_configurations().await?;
    Ok(Json(current))
}
