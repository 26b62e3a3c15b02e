use crate::dtos::TaxpayerStub;
use crate::models::{Document, DocumentStatus, DocumentWithTaxpayer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentStatusRequest {
    pub status: DocumentStatus,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document_id: Uuid,
    pub taxpayer_id: Uuid,
    pub document_name: String,
    pub file_url: String,
    pub status: DocumentStatus,
    pub created_utc: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            document_id: doc.document_id,
            taxpayer_id: doc.taxpayer_id,
            document_name: doc.document_name,
            file_url: doc.file_url,
            status: DocumentStatus::from_string(&doc.status),
            created_utc: doc.created_utc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentWithTaxpayerResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub taxpayer: TaxpayerStub,
}

impl From<DocumentWithTaxpayer> for DocumentWithTaxpayerResponse {
    fn from(row: DocumentWithTaxpayer) -> Self {
        Self {
            document: DocumentResponse::from(row.document),
            taxpayer: TaxpayerStub {
                name: row.taxpayer_name,
                tin: row.taxpayer_tin,
                email: row.taxpayer_email,
                taxpayer_type: row.taxpayer_type,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublicUrlResponse {
    pub url: String,
}
