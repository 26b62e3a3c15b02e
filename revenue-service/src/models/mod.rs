//! Domain models for revenue-service.

pub mod assessment;
pub mod document;
pub mod notification;
pub mod payment;
pub mod profile;
pub mod tax_configuration;
pub mod tcc_request;

pub use assessment::{
    Assessment, AssessmentStatus, AssessmentWithTaxpayer, CreateAssessment, due_date_from,
};
pub use document::{CreateDocument, Document, DocumentStatus, DocumentWithTaxpayer};
pub use notification::Notification;
pub use payment::{HIGH_VALUE_THRESHOLD, Payment};
pub use profile::{CreateProfile, Profile, Role, TaxpayerType, UpdateProfile};
pub use tax_configuration::{TaxConfiguration, TaxType};
pub use tcc_request::{TccRequest, TccRequestWithTaxpayer, TccStatus};
