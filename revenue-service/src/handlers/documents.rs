use crate::dtos::documents::{
    DocumentResponse, DocumentWithTaxpayerResponse, PublicUrlResponse, UpdateDocumentStatusRequest,
};
use crate::handlers::{require_profile, require_staff};
use crate::middleware::UserId;
use crate::models::CreateDocument;
use crate::services::metrics::record_document_uploaded;
use crate::services::notifier::Notice;
use crate::startup::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use service_core::error::AppError;
use uuid::Uuid;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Upload an evidence document. The file is written to storage first; only
/// a successful store is followed by the database row, so a storage failure
/// leaves no trace. Review staff are notified on success.
pub async fn upload_document(
    State(state): State<AppState>,
    user_id: UserId,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    let mut document_type: Option<String> = None;
    let mut original_name: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("document_type") => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read document type: {}", e))
                })?;
                document_type = Some(value);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
                })?;
                original_name = Some(file_name);
                data = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let document_type =
        document_type.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing document type")))?;
    let original_name =
        original_name.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;
    let data = data.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "File too large (max 20MB)"
        )));
    }

    let extension = std::path::Path::new(&original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("bin");

    // Key is scoped by taxpayer and suffixed with a fresh id to prevent
    // collisions between same-named uploads.
    let storage_key = format!(
        "{}/{}_{}.{}",
        actor.profile_id,
        document_type.replace(' ', "_"),
        Uuid::new_v4(),
        extension
    );

    state
        .storage
        .upload(&storage_key, data)
        .await
        .map_err(|e| {
            tracing::error!(storage_key = %storage_key, error = %e, "Failed to store uploaded file");
            e
        })?;

    let document = state
        .db
        .create_document(&CreateDocument {
            taxpayer_id: actor.profile_id,
            document_name: original_name,
            file_url: storage_key,
        })
        .await?;
    record_document_uploaded(&document.status);

    state
        .notifier
        .dispatch(Notice::staff(
            "New Document for Review",
            "A new document has been uploaded by a taxpayer and requires your review.",
        ))
        .await;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// Taxpayers list their own documents; staff get everything with the owning
/// taxpayer joined.
pub async fn list_documents(
    State(state): State<AppState>,
    user_id: UserId,
) -> Result<impl IntoResponse, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    if actor.role().is_staff() {
        let documents = state.db.list_documents().await?;
        let body: Vec<DocumentWithTaxpayerResponse> =
            documents.into_iter().map(Into::into).collect();
        Ok(Json(body).into_response())
    } else {
        let documents = state
            .db
            .list_documents_for_taxpayer(actor.profile_id)
            .await?;
        let body: Vec<DocumentResponse> = documents.into_iter().map(Into::into).collect();
        Ok(Json(body).into_response())
    }
}

/// Review outcome: staff overwrite the status and the owning taxpayer is
/// told the result.
pub async fn update_document_status(
    State(state): State<AppState>,
    user_id: UserId,
    Path(document_id): Path<Uuid>,
    Json(req): Json<UpdateDocumentStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;
    require_staff(&actor)?;

    let document = state
        .db
        .update_document_status(document_id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Document not found")))?;

    state
        .notifier
        .dispatch(vec![Notice::user(
            document.taxpayer_id,
            format!("Document {}", req.status.label()),
            format!(
                "Your document \"{}\" has been {}.",
                document.document_name,
                req.status.label().to_lowercase()
            ),
        )])
        .await;

    Ok(Json(DocumentResponse::from(document)))
}

/// Public URL for a stored document; a thin lookup against the storage
/// collaborator, not retried.
pub async fn get_document_url(
    State(state): State<AppState>,
    user_id: UserId,
    Path(document_id): Path<Uuid>,
) -> Result<Json<PublicUrlResponse>, AppError> {
    let actor = require_profile(&state.db, user_id.0).await?;

    let document = state
        .db
        .get_document(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Document not found")))?;

    if document.taxpayer_id != actor.profile_id {
        require_staff(&actor)?;
    }

    let url = state
        .storage
        .public_url(&document.file_url)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No public URL for this document")))?;

    Ok(Json(PublicUrlResponse { url }))
}
