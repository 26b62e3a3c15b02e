//! Tax rate configuration model for revenue-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tax category. One rate configuration row exists per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    PersonalIncome,
    Business,
    Withholding,
}

impl TaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxType::PersonalIncome => "personal_income",
            TaxType::Business => "business",
            TaxType::Withholding => "withholding",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "business" => TaxType::Business,
            "withholding" => TaxType::Withholding,
            _ => TaxType::PersonalIncome,
        }
    }
}

/// (category -> percentage rate) pairing, keyed by category.
///
/// The rate is read by the assessment engine at creation time and frozen
/// into the assessment; changing a rate never re-prices existing rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxConfiguration {
    pub tax_type: String,
    pub rate: Decimal,
}
