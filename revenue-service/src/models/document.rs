//! Document model for revenue-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Document review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::PendingReview => "pending_review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "approved" => DocumentStatus::Approved,
            "rejected" => DocumentStatus::Rejected,
            _ => DocumentStatus::PendingReview,
        }
    }

    /// Display form used in notification text.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::PendingReview => "Pending Review",
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Rejected => "Rejected",
        }
    }
}

/// Uploaded evidence file. Immutable once created except for status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub document_id: Uuid,
    pub taxpayer_id: Uuid,
    pub document_name: String,
    pub file_url: String,
    pub status: String,
    pub created_utc: DateTime<Utc>,
}

/// Input for recording an uploaded document.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub taxpayer_id: Uuid,
    pub document_name: String,
    pub file_url: String,
}

/// Document row with the owning taxpayer's profile joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DocumentWithTaxpayer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub document: Document,
    pub taxpayer_name: String,
    pub taxpayer_tin: String,
    pub taxpayer_email: String,
    pub taxpayer_type: String,
}
