use crate::models::{Profile, Role, TaxpayerType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "TIN is required"))]
    pub tin: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub taxpayer_type: TaxpayerType,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminSetupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: Role,

    /// Optional for staff accounts; a placeholder TIN is generated when absent.
    pub tin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile_id: Uuid,
    pub name: String,
    pub tin: String,
    pub email: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub taxpayer_type: TaxpayerType,
    pub created_utc: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            profile_id: p.profile_id,
            name: p.name,
            tin: p.tin,
            email: p.email,
            role: Role::from_string(&p.role),
            avatar_url: p.avatar_url,
            taxpayer_type: TaxpayerType::from_string(&p.taxpayer_type),
            created_utc: p.created_utc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar_url: String,
}
