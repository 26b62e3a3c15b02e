use rust_decimal::Decimal;
use serde::Deserialize;

/// Settlement request. The amount is taken as supplied and recorded
/// verbatim; it is not reconciled against the assessment's amount due.
#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub amount: Decimal,
}
