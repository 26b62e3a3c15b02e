use crate::dtos::TaxpayerStub;
use crate::models::{Assessment, AssessmentStatus, AssessmentWithTaxpayer, TaxType};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), validator::ValidationError> {
    if value.is_sign_negative() {
        return Err(validator::ValidationError::new("non_negative"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssessmentRequest {
    /// Absent for self-filing; staff may assess a named taxpayer.
    pub taxpayer_id: Option<Uuid>,

    pub tax_type: TaxType,

    #[validate(length(min = 1, message = "Reporting period is required"))]
    pub period: String,

    #[validate(custom(function = validate_non_negative))]
    pub taxable_income: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ListAssessmentsParams {
    /// Staff-only filter; taxpayers always see their own rows.
    pub taxpayer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub assessment_id: Uuid,
    pub taxpayer_id: Uuid,
    pub tax_type: String,
    pub period: String,
    pub taxable_income: Decimal,
    pub tax_rate_applied: Decimal,
    pub amount_due: Decimal,
    pub due_date: NaiveDate,
    pub status: AssessmentStatus,
    pub created_utc: DateTime<Utc>,
}

impl AssessmentResponse {
    /// Reported status is derived against `today`: open rows past their due
    /// date come back as overdue without rewriting the stored status.
    pub fn from_assessment(assessment: Assessment, today: NaiveDate) -> Self {
        let status = assessment.effective_status(today);
        Self {
            assessment_id: assessment.assessment_id,
            taxpayer_id: assessment.taxpayer_id,
            tax_type: assessment.tax_type,
            period: assessment.period,
            taxable_income: assessment.taxable_income,
            tax_rate_applied: assessment.tax_rate_applied,
            amount_due: assessment.amount_due,
            due_date: assessment.due_date,
            status,
            created_utc: assessment.created_utc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssessmentWithTaxpayerResponse {
    #[serde(flatten)]
    pub assessment: AssessmentResponse,
    pub taxpayer: TaxpayerStub,
}

impl AssessmentWithTaxpayerResponse {
    pub fn from_row(row: AssessmentWithTaxpayer, today: NaiveDate) -> Self {
        Self {
            assessment: AssessmentResponse::from_assessment(row.assessment, today),
            taxpayer: TaxpayerStub {
                name: row.taxpayer_name,
                tin: row.taxpayer_tin,
                email: row.taxpayer_email,
                taxpayer_type: row.taxpayer_type,
            },
        }
    }
}
