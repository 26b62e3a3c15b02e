//! Assessment model and liability arithmetic for revenue-service.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Number of calendar days a taxpayer has to settle a new assessment.
pub const DUE_IN_DAYS: u64 = 30;

/// Assessment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Pending,
    Assessed,
    Paid,
    Overdue,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Pending => "pending",
            AssessmentStatus::Assessed => "assessed",
            AssessmentStatus::Paid => "paid",
            AssessmentStatus::Overdue => "overdue",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "assessed" => AssessmentStatus::Assessed,
            "paid" => AssessmentStatus::Paid,
            "overdue" => AssessmentStatus::Overdue,
            _ => AssessmentStatus::Pending,
        }
    }
}

/// A computed tax liability for one taxpayer/period/category.
///
/// `tax_rate_applied` is copied from the rate configuration at creation and
/// frozen thereafter. Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assessment {
    pub assessment_id: Uuid,
    pub taxpayer_id: Uuid,
    pub tax_type: String,
    pub period: String,
    pub taxable_income: Decimal,
    pub tax_rate_applied: Decimal,
    pub amount_due: Decimal,
    pub due_date: NaiveDate,
    pub status: String,
    pub created_utc: DateTime<Utc>,
}

impl Assessment {
    /// Status as reported to callers. `Overdue` is derived at read time:
    /// an `assessed` row past its due date reports as overdue while the
    /// stored status stays `assessed` until settlement.
    pub fn effective_status(&self, today: NaiveDate) -> AssessmentStatus {
        let stored = AssessmentStatus::from_string(&self.status);
        if stored == AssessmentStatus::Assessed && self.due_date < today {
            AssessmentStatus::Overdue
        } else {
            stored
        }
    }
}

/// Input for creating an assessment.
#[derive(Debug, Clone)]
pub struct CreateAssessment {
    pub taxpayer_id: Uuid,
    pub tax_type: String,
    pub period: String,
    pub taxable_income: Decimal,
    pub tax_rate_applied: Decimal,
    pub amount_due: Decimal,
    pub due_date: NaiveDate,
}

/// Assessment row with the owning taxpayer's profile joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssessmentWithTaxpayer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub assessment: Assessment,
    pub taxpayer_name: String,
    pub taxpayer_tin: String,
    pub taxpayer_email: String,
    pub taxpayer_type: String,
}

/// `amount_due = taxable_income * rate / 100`, exact decimal arithmetic.
pub fn compute_amount_due(taxable_income: Decimal, rate: Decimal) -> Decimal {
    taxable_income * rate / Decimal::from(100)
}

/// Due date is the filing date plus [`DUE_IN_DAYS`] calendar days.
pub fn due_date_from(filing_date: NaiveDate) -> NaiveDate {
    filing_date
        .checked_add_days(Days::new(DUE_IN_DAYS))
        .unwrap_or(filing_date)
}
