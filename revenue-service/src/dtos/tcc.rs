use crate::dtos::TaxpayerStub;
use crate::models::{TccRequest, TccRequestWithTaxpayer, TccStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateTccStatusRequest {
    pub status: TccStatus,
}

#[derive(Debug, Serialize)]
pub struct TccRequestResponse {
    pub request_id: Uuid,
    pub taxpayer_id: Uuid,
    pub requested_utc: DateTime<Utc>,
    pub status: TccStatus,
}

impl From<TccRequest> for TccRequestResponse {
    fn from(req: TccRequest) -> Self {
        Self {
            request_id: req.request_id,
            taxpayer_id: req.taxpayer_id,
            requested_utc: req.requested_utc,
            status: TccStatus::from_string(&req.status),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TccRequestWithTaxpayerResponse {
    #[serde(flatten)]
    pub request: TccRequestResponse,
    pub taxpayer: TaxpayerStub,
}

impl From<TccRequestWithTaxpayer> for TccRequestWithTaxpayerResponse {
    fn from(row: TccRequestWithTaxpayer) -> Self {
        Self {
            request: TccRequestResponse::from(row.request),
            taxpayer: TaxpayerStub {
                name: row.taxpayer_name,
                tin: row.taxpayer_tin,
                email: row.taxpayer_email,
                taxpayer_type: row.taxpayer_type,
            },
        }
    }
}
