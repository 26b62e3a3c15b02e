use crate::dtos::assessments::validate_non_negative;
use crate::models::TaxType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RateEntry {
    pub tax_type: TaxType,

    #[validate(custom(function = validate_non_negative))]
    pub rate: Decimal,
}

/// Batch rate update: one entry per category, upserted on the category key.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRatesRequest {
    #[validate(length(min = 1, message = "At least one rate entry is required"), nested)]
    pub rates: Vec<RateEntry>,
}
