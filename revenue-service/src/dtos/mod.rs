pub mod assessments;
pub mod documents;
pub mod payments;
pub mod profiles;
pub mod rates;
pub mod tcc;

/// The taxpayer profile stub attached to staff-facing listings.
#[derive(Debug, serde::Serialize)]
pub struct TaxpayerStub {
    pub name: String,
    pub tin: String,
    pub email: String,
    pub taxpayer_type: String,
}
