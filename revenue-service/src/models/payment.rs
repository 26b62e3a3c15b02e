//! Payment model for revenue-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Payments above this amount (base currency units) additionally alert
/// every administrator. Fixed business rule, not configurable.
pub const HIGH_VALUE_THRESHOLD: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);

/// Settlement record. Created only by a successful settle; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: Uuid,
    pub assessment_id: Uuid,
    pub taxpayer_id: Uuid,
    pub amount: Decimal,
    pub receipt_reference: String,
    pub created_utc: DateTime<Utc>,
}
