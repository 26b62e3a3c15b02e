//! Profile model for revenue-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Portal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Taxpayer,
    Officer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Taxpayer => "taxpayer",
            Role::Officer => "officer",
            Role::Admin => "admin",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "officer" => Role::Officer,
            "admin" => Role::Admin,
            _ => Role::Taxpayer,
        }
    }

    /// Display form used in user-facing notification text.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Taxpayer => "Taxpayer",
            Role::Officer => "Revenue Officer",
            Role::Admin => "Administrator",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Officer | Role::Admin)
    }
}

/// Taxpayer category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxpayerType {
    Individual,
    Organization,
}

impl TaxpayerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxpayerType::Individual => "individual",
            TaxpayerType::Organization => "organization",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "organization" => TaxpayerType::Organization,
            _ => TaxpayerType::Individual,
        }
    }
}

/// Identity record. TIN is globally unique and immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub profile_id: Uuid,
    pub name: String,
    pub tin: String,
    pub email: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub taxpayer_type: String,
    pub created_utc: DateTime<Utc>,
}

impl Profile {
    pub fn role(&self) -> Role {
        Role::from_string(&self.role)
    }
}

/// Input for creating a profile.
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub name: String,
    pub tin: String,
    pub email: String,
    pub role: Role,
    pub taxpayer_type: TaxpayerType,
}

/// Partial profile update. TIN and email are immutable and deliberately
/// absent; role changes are restricted to administrators at the handler.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<Role>,
}
