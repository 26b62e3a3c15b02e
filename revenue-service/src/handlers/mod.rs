pub mod assessments;
pub mod documents;
pub mod health;
pub mod notifications;
pub mod payments;
pub mod profiles;
pub mod rates;
pub mod tcc;

use crate::models::Profile;
use crate::services::Database;
use service_core::error::AppError;
use uuid::Uuid;

/// Resolve the calling user's profile; an id the perimeter vouched for but
/// no longer resolving to a profile is treated as unauthenticated.
pub(crate) async fn require_profile(db: &Database, user_id: Uuid) -> Result<Profile, AppError> {
    db.get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Unknown user")))
}

pub(crate) fn require_staff(profile: &Profile) -> Result<(), AppError> {
    if profile.role().is_staff() {
        Ok(())
    } else {
        Err(AppError::Forbidden(anyhow::anyhow!(
            "Officer or administrator role required"
        )))
    }
}

pub(crate) fn require_admin(profile: &Profile) -> Result<(), AppError> {
    if profile.role() == crate::models::Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(anyhow::anyhow!(
            "Administrator role required"
        )))
    }
}
