//! Tax clearance certificate request model for revenue-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// TCC request status. "Not requested" is the absence of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TccStatus {
    Pending,
    Approved,
    Rejected,
}

impl TccStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TccStatus::Pending => "pending",
            TccStatus::Approved => "approved",
            TccStatus::Rejected => "rejected",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "approved" => TccStatus::Approved,
            "rejected" => TccStatus::Rejected,
            _ => TccStatus::Pending,
        }
    }

    /// Display form used in notification text.
    pub fn label(&self) -> &'static str {
        match self {
            TccStatus::Pending => "Pending",
            TccStatus::Approved => "Approved",
            TccStatus::Rejected => "Rejected",
        }
    }
}

/// The single live clearance request for a taxpayer. Re-requesting after a
/// rejection overwrites this row rather than creating a history entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TccRequest {
    pub request_id: Uuid,
    pub taxpayer_id: Uuid,
    pub requested_utc: DateTime<Utc>,
    pub status: String,
}

/// TCC request row with the owning taxpayer's profile joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TccRequestWithTaxpayer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: TccRequest,
    pub taxpayer_name: String,
    pub taxpayer_tin: String,
    pub taxpayer_email: String,
    pub taxpayer_type: String,
}
