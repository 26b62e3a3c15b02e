use crate::dtos::profiles::{
    AdminSetupRequest, AvatarResponse, CreateUserRequest, ProfileResponse, SignUpRequest,
    UpdateProfileRequest,
};
use crate::handlers::{require_admin, require_profile, require_staff};
use crate::middleware::UserId;
use crate::models::{CreateProfile, Role, TaxpayerType, UpdateProfile};
use crate::services::notifier::Notice;
use crate::startup::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::Rng;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

/// Taxpayer self-registration. Credential handling lives in the perimeter;
/// this creates the portal profile and enforces TIN uniqueness.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let profile = state
        .db
        .create_profile(&CreateProfile {
            name: req.name,
            tin: req.tin,
            email: req.email,
            role: Role::Taxpayer,
            taxpayer_type: req.taxpayer_type,
        })
        .await?;

    state
        .notifier
        .dispatch(vec![Notice::role(
            Role::Admin,
            "New Taxpayer Registration",
            format!(
                "A new taxpayer, {} ({}), has registered on the portal.",
                profile.name, profile.tin
            ),
        )])
        .await;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// One-time bootstrap of the first administrator. Refused once any admin
/// profile exists.
pub async fn setup_admin(
    State(state): State<AppState>,
    Json(req): Json<AdminSetupRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    if state.db.admin_exists().await? {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "An administrator account already exists."
        )));
    }

    let profile = state
        .db
        .create_profile(&CreateProfile {
            name: req.name,
            tin: "ADMIN-000000".to_string(),
            email: req.email,
            role: Role::Admin,
            taxpayer_type: TaxpayerType::Individual,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// Admin-created account, typically for staff. A placeholder TIN is
/// generated when none is supplied.
pub async fn create_user(
    State(state): State<AppState>,
    user_id: UserId,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let actor = require_profile(&state.db, user_id.0).await?;
    require_admin(&actor)?;

    let tin = req.tin.filter(|t| !t.is_empty()).unwrap_or_else(|| {
        format!("TEMP-{}", rand::thread_rng().gen_range(100_000..1_000_000))
    });

    let profile = state
        .db
        .create_profile(&CreateProfile {
            name: req.name,
            tin,
            email: req.email,
            role: req.role,
            taxpayer_type: TaxpayerType::Individual,
        })
        .await?;

    state
        .notifier
        .dispatch(vec![Notice::role(
            Role::Admin,
            "New Staff Account",
            format!(
                "A new {} account has been created for {}.",
                req.role.label(),
                profile.name
            ),
        )])
        .await;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// All portal users (admin only).
pub async fn list_users(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;
    require_admin(&actor)?;

    let profiles = state.db.list_profiles().await?;
    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

/// All taxpayers (staff).
pub async fn list_taxpayers(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;
    require_staff(&actor)?;

    let profiles = state.db.list_profiles_by_role(Role::Taxpayer).await?;
    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

/// The calling user's own profile.
pub async fn get_me(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = require_profile(&state.db, user_id.0).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// Profile update. Users rename themselves; role changes are an
/// administrator's move only, and TIN stays immutable throughout.
pub async fn update_profile(
    State(state): State<AppState>,
    user_id: UserId,
    Path(profile_id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    if req.role.is_some() || profile_id != actor.profile_id {
        require_admin(&actor)?;
    }

    let updated = state
        .db
        .update_profile(
            profile_id,
            &UpdateProfile {
                name: req.name,
                avatar_url: None,
                role: req.role,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Profile not found")))?;

    Ok(Json(ProfileResponse::from(updated)))
}

/// Avatar upload: store the image, then point the profile at its public URL.
pub async fn upload_avatar(
    State(state): State<AppState>,
    user_id: UserId,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
        })?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

    let original_name = field.file_name().unwrap_or("avatar").to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e)))?
        .to_vec();

    let extension = std::path::Path::new(&original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("png");

    let storage_key = format!("avatars/{}/{}.{}", actor.profile_id, Uuid::new_v4(), extension);

    state.storage.upload(&storage_key, data).await?;

    let avatar_url = state
        .storage
        .public_url(&storage_key)
        .ok_or_else(|| AppError::StorageError(anyhow::anyhow!("No public URL for avatar")))?;

    state
        .db
        .update_profile(
            actor.profile_id,
            &UpdateProfile {
                name: None,
                avatar_url: Some(avatar_url.clone()),
                role: None,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Profile not found")))?;

    Ok(Json(AvatarResponse { avatar_url }))
}
