//! Database service for revenue-service.

use crate::models::{
    Assessment, AssessmentStatus, AssessmentWithTaxpayer, CreateAssessment, CreateDocument,
    CreateProfile, Document, DocumentStatus, DocumentWithTaxpayer, Notification, Payment, Profile,
    Role, TaxConfiguration, TccRequest, TccRequestWithTaxpayer, TccStatus, UpdateProfile,
};
use crate::services::metrics::DB_QUERY_DURATION;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "revenue-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Profile Operations
    // -------------------------------------------------------------------------

    /// Create a profile. A duplicate TIN surfaces as a distinguishable
    /// conflict with a user-facing message.
    #[instrument(skip(self, input), fields(tin = %input.tin))]
    pub async fn create_profile(&self, input: &CreateProfile) -> Result<Profile, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_profile"])
            .start_timer();

        let profile_id = Uuid::new_v4();
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (profile_id, name, tin, email, role, taxpayer_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING profile_id, name, tin, email, role, avatar_url, taxpayer_type, created_utc
            "#,
        )
        .bind(profile_id)
        .bind(&input.name)
        .bind(&input.tin)
        .bind(&input.email)
        .bind(input.role.as_str())
        .bind(input.taxpayer_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                if db_err.constraint() == Some("profiles_tin_key") {
                    AppError::Conflict(anyhow::anyhow!(
                        "This Tax Identification Number (TIN) is already in use."
                    ))
                } else {
                    AppError::Conflict(anyhow::anyhow!(
                        "A profile with this email already exists"
                    ))
                }
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create profile: {}", e)),
        })?;

        timer.observe_duration();

        info!(profile_id = %profile.profile_id, role = %profile.role, "Profile created");

        Ok(profile)
    }

    /// Get a profile by id.
    #[instrument(skip(self), fields(profile_id = %profile_id))]
    pub async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_profile"])
            .start_timer();

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT profile_id, name, tin, email, role, avatar_url, taxpayer_type, created_utc
            FROM profiles
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get profile: {}", e)))?;

        timer.observe_duration();

        Ok(profile)
    }

    /// List all profiles.
    #[instrument(skip(self))]
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_profiles"])
            .start_timer();

        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT profile_id, name, tin, email, role, avatar_url, taxpayer_type, created_utc
            FROM profiles
            ORDER BY created_utc
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list profiles: {}", e)))?;

        timer.observe_duration();

        Ok(profiles)
    }

    /// List profiles holding a given role.
    #[instrument(skip(self))]
    pub async fn list_profiles_by_role(&self, role: Role) -> Result<Vec<Profile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_profiles_by_role"])
            .start_timer();

        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT profile_id, name, tin, email, role, avatar_url, taxpayer_type, created_utc
            FROM profiles
            WHERE role = $1
            ORDER BY created_utc
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list profiles: {}", e)))?;

        timer.observe_duration();

        Ok(profiles)
    }

    /// Whether any administrator profile exists yet.
    #[instrument(skip(self))]
    pub async fn admin_exists(&self) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE role = 'admin')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to check for admin: {}", e))
        })?;

        Ok(exists)
    }

    /// Partial profile update. Absent fields keep their current value.
    #[instrument(skip(self, input), fields(profile_id = %profile_id))]
    pub async fn update_profile(
        &self,
        profile_id: Uuid,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_profile"])
            .start_timer();

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET name = COALESCE($2, name),
                avatar_url = COALESCE($3, avatar_url),
                role = COALESCE($4, role)
            WHERE profile_id = $1
            RETURNING profile_id, name, tin, email, role, avatar_url, taxpayer_type, created_utc
            "#,
        )
        .bind(profile_id)
        .bind(&input.name)
        .bind(&input.avatar_url)
        .bind(input.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update profile: {}", e)))?;

        timer.observe_duration();

        Ok(profile)
    }

    // -------------------------------------------------------------------------
    // Tax Configuration Operations
    // -------------------------------------------------------------------------

    /// List all rate configurations.
    #[instrument(skip(self))]
    pub async fn list_tax_configurations(&self) -> Result<Vec<TaxConfiguration>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_tax_configurations"])
            .start_timer();

        let configs = sqlx::query_as::<_, TaxConfiguration>(
            "SELECT tax_type, rate FROM tax_configurations ORDER BY tax_type",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list tax configurations: {}", e))
        })?;

        timer.observe_duration();

        Ok(configs)
    }

    /// Rate for one category, if configured.
    #[instrument(skip(self))]
    pub async fn get_tax_rate(&self, tax_type: &str) -> Result<Option<Decimal>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_tax_rate"])
            .start_timer();

        let rate = sqlx::query_scalar::<_, Decimal>(
            "SELECT rate FROM tax_configurations WHERE tax_type = $1",
        )
        .bind(tax_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get tax rate: {}", e)))?;

        timer.observe_duration();

        Ok(rate)
    }

    /// Batch upsert of rate configurations, keyed by category. Existing
    /// assessments keep the rate frozen at their creation time.
    #[instrument(skip(self, configs))]
    pub async fn upsert_tax_configurations(
        &self,
        configs: &[TaxConfiguration],
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_tax_configurations"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        for config in configs {
            sqlx::query(
                r#"
                INSERT INTO tax_configurations (tax_type, rate)
                VALUES ($1, $2)
                ON CONFLICT (tax_type) DO UPDATE SET rate = EXCLUDED.rate
                "#,
            )
            .bind(&config.tax_type)
            .bind(config.rate)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to upsert tax rate: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(count = configs.len(), "Tax configurations updated");

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Assessment Operations
    // -------------------------------------------------------------------------

    /// Insert an assessment with its frozen rate and computed liability.
    #[instrument(skip(self, input), fields(taxpayer_id = %input.taxpayer_id))]
    pub async fn create_assessment(
        &self,
        input: &CreateAssessment,
    ) -> Result<Assessment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_assessment"])
            .start_timer();

        let assessment_id = Uuid::new_v4();
        let assessment = sqlx::query_as::<_, Assessment>(
            r#"
            INSERT INTO assessments (
                assessment_id, taxpayer_id, tax_type, period, taxable_income,
                tax_rate_applied, amount_due, due_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING assessment_id, taxpayer_id, tax_type, period, taxable_income,
                tax_rate_applied, amount_due, due_date, status, created_utc
            "#,
        )
        .bind(assessment_id)
        .bind(input.taxpayer_id)
        .bind(&input.tax_type)
        .bind(&input.period)
        .bind(input.taxable_income)
        .bind(input.tax_rate_applied)
        .bind(input.amount_due)
        .bind(input.due_date)
        .bind(AssessmentStatus::Assessed.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create assessment: {}", e))
        })?;

        timer.observe_duration();

        info!(
            assessment_id = %assessment.assessment_id,
            amount_due = %assessment.amount_due,
            due_date = %assessment.due_date,
            "Assessment created"
        );

        Ok(assessment)
    }

    /// Get an assessment by id.
    #[instrument(skip(self), fields(assessment_id = %assessment_id))]
    pub async fn get_assessment(&self, assessment_id: Uuid) -> Result<Option<Assessment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_assessment"])
            .start_timer();

        let assessment = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT assessment_id, taxpayer_id, tax_type, period, taxable_income,
                tax_rate_applied, amount_due, due_date, status, created_utc
            FROM assessments
            WHERE assessment_id = $1
            "#,
        )
        .bind(assessment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get assessment: {}", e)))?;

        timer.observe_duration();

        Ok(assessment)
    }

    /// A taxpayer's assessments, most recent due date first.
    #[instrument(skip(self), fields(taxpayer_id = %taxpayer_id))]
    pub async fn list_assessments_for_taxpayer(
        &self,
        taxpayer_id: Uuid,
    ) -> Result<Vec<Assessment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_assessments_for_taxpayer"])
            .start_timer();

        let assessments = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT assessment_id, taxpayer_id, tax_type, period, taxable_income,
                tax_rate_applied, amount_due, due_date, status, created_utc
            FROM assessments
            WHERE taxpayer_id = $1
            ORDER BY due_date DESC
            "#,
        )
        .bind(taxpayer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list assessments: {}", e))
        })?;

        timer.observe_duration();

        Ok(assessments)
    }

    /// All assessments with the owning taxpayer joined, for staff views.
    #[instrument(skip(self))]
    pub async fn list_assessments(&self) -> Result<Vec<AssessmentWithTaxpayer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_assessments"])
            .start_timer();

        let assessments = sqlx::query_as::<_, AssessmentWithTaxpayer>(
            r#"
            SELECT a.assessment_id, a.taxpayer_id, a.tax_type, a.period, a.taxable_income,
                a.tax_rate_applied, a.amount_due, a.due_date, a.status, a.created_utc,
                p.name AS taxpayer_name, p.tin AS taxpayer_tin,
                p.email AS taxpayer_email, p.taxpayer_type AS taxpayer_type
            FROM assessments a
            JOIN profiles p ON p.profile_id = a.taxpayer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list assessments: {}", e))
        })?;

        timer.observe_duration();

        Ok(assessments)
    }

    // -------------------------------------------------------------------------
    // Payment Operations
    // -------------------------------------------------------------------------

    /// Settle an assessment: one transaction that verifies ownership, flips
    /// `assessed` to `paid` and inserts the payment row. Callers never
    /// observe an intermediate state; of two concurrent settles exactly one
    /// commits and the other gets a conflict.
    #[instrument(skip(self), fields(assessment_id = %assessment_id, taxpayer_id = %taxpayer_id))]
    pub async fn settle_assessment(
        &self,
        assessment_id: Uuid,
        taxpayer_id: Uuid,
        amount: Decimal,
    ) -> Result<Payment, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["settle_assessment"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let assessment = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT assessment_id, taxpayer_id, tax_type, period, taxable_income,
                tax_rate_applied, amount_due, due_date, status, created_utc
            FROM assessments
            WHERE assessment_id = $1
            FOR UPDATE
            "#,
        )
        .bind(assessment_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load assessment: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Assessment not found")))?;

        if assessment.taxpayer_id != taxpayer_id {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Assessment does not belong to this taxpayer"
            )));
        }

        if assessment.status != AssessmentStatus::Assessed.as_str() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Assessment is not open for settlement"
            )));
        }

        sqlx::query("UPDATE assessments SET status = $2 WHERE assessment_id = $1")
            .bind(assessment_id)
            .bind(AssessmentStatus::Paid.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to mark assessment paid: {}", e))
            })?;

        let payment_id = Uuid::new_v4();
        let receipt_reference = format!("RCPT-{}", payment_id.simple());
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (payment_id, assessment_id, taxpayer_id, amount, receipt_reference)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING payment_id, assessment_id, taxpayer_id, amount, receipt_reference, created_utc
            "#,
        )
        .bind(payment_id)
        .bind(assessment_id)
        .bind(taxpayer_id)
        .bind(amount)
        .bind(&receipt_reference)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to record payment: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit settlement: {}", e))
        })?;

        timer.observe_duration();

        info!(
            payment_id = %payment.payment_id,
            amount = %payment.amount,
            receipt_reference = %payment.receipt_reference,
            "Payment settled"
        );

        Ok(payment)
    }

    /// A taxpayer's payments, newest first.
    #[instrument(skip(self), fields(taxpayer_id = %taxpayer_id))]
    pub async fn list_payments_for_taxpayer(
        &self,
        taxpayer_id: Uuid,
    ) -> Result<Vec<Payment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_payments_for_taxpayer"])
            .start_timer();

        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, assessment_id, taxpayer_id, amount, receipt_reference, created_utc
            FROM payments
            WHERE taxpayer_id = $1
            ORDER BY created_utc DESC
            "#,
        )
        .bind(taxpayer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list payments: {}", e)))?;

        timer.observe_duration();

        Ok(payments)
    }

    // -------------------------------------------------------------------------
    // Document Operations
    // -------------------------------------------------------------------------

    /// Record an uploaded document in `pending_review`.
    #[instrument(skip(self, input), fields(taxpayer_id = %input.taxpayer_id))]
    pub async fn create_document(&self, input: &CreateDocument) -> Result<Document, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_document"])
            .start_timer();

        let document_id = Uuid::new_v4();
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (document_id, taxpayer_id, document_name, file_url, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING document_id, taxpayer_id, document_name, file_url, status, created_utc
            "#,
        )
        .bind(document_id)
        .bind(input.taxpayer_id)
        .bind(&input.document_name)
        .bind(&input.file_url)
        .bind(DocumentStatus::PendingReview.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to save document: {}", e)))?;

        timer.observe_duration();

        info!(document_id = %document.document_id, "Document recorded");

        Ok(document)
    }

    /// Get a document by id.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn get_document(&self, document_id: Uuid) -> Result<Option<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_document"])
            .start_timer();

        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT document_id, taxpayer_id, document_name, file_url, status, created_utc
            FROM documents
            WHERE document_id = $1
            "#,
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get document: {}", e)))?;

        timer.observe_duration();

        Ok(document)
    }

    /// A taxpayer's documents.
    #[instrument(skip(self), fields(taxpayer_id = %taxpayer_id))]
    pub async fn list_documents_for_taxpayer(
        &self,
        taxpayer_id: Uuid,
    ) -> Result<Vec<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_documents_for_taxpayer"])
            .start_timer();

        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT document_id, taxpayer_id, document_name, file_url, status, created_utc
            FROM documents
            WHERE taxpayer_id = $1
            ORDER BY created_utc DESC
            "#,
        )
        .bind(taxpayer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list documents: {}", e)))?;

        timer.observe_duration();

        Ok(documents)
    }

    /// All documents with the owning taxpayer joined, for staff review.
    #[instrument(skip(self))]
    pub async fn list_documents(&self) -> Result<Vec<DocumentWithTaxpayer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_documents"])
            .start_timer();

        let documents = sqlx::query_as::<_, DocumentWithTaxpayer>(
            r#"
            SELECT d.document_id, d.taxpayer_id, d.document_name, d.file_url, d.status,
                d.created_utc,
                p.name AS taxpayer_name, p.tin AS taxpayer_tin,
                p.email AS taxpayer_email, p.taxpayer_type AS taxpayer_type
            FROM documents d
            JOIN profiles p ON p.profile_id = d.taxpayer_id
            ORDER BY d.created_utc DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list documents: {}", e)))?;

        timer.observe_duration();

        Ok(documents)
    }

    /// Overwrite a document's review status. No transition guard: staff may
    /// set any status from any status.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn update_document_status(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_document_status"])
            .start_timer();

        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET status = $2
            WHERE document_id = $1
            RETURNING document_id, taxpayer_id, document_name, file_url, status, created_utc
            "#,
        )
        .bind(document_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update document status: {}", e))
        })?;

        timer.observe_duration();

        if let Some(ref doc) = document {
            info!(document_id = %doc.document_id, status = %doc.status, "Document status updated");
        }

        Ok(document)
    }

    // -------------------------------------------------------------------------
    // TCC Request Operations
    // -------------------------------------------------------------------------

    /// Upsert the taxpayer's single live clearance request back to pending.
    /// The row count per taxpayer stays at one across re-requests.
    #[instrument(skip(self), fields(taxpayer_id = %taxpayer_id))]
    pub async fn upsert_tcc_request(&self, taxpayer_id: Uuid) -> Result<TccRequest, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_tcc_request"])
            .start_timer();

        let request_id = Uuid::new_v4();
        let request = sqlx::query_as::<_, TccRequest>(
            r#"
            INSERT INTO tcc_requests (request_id, taxpayer_id, requested_utc, status)
            VALUES ($1, $2, now(), $3)
            ON CONFLICT (taxpayer_id)
            DO UPDATE SET requested_utc = EXCLUDED.requested_utc, status = EXCLUDED.status
            RETURNING request_id, taxpayer_id, requested_utc, status
            "#,
        )
        .bind(request_id)
        .bind(taxpayer_id)
        .bind(TccStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to upsert TCC request: {}", e))
        })?;

        timer.observe_duration();

        info!(request_id = %request.request_id, "TCC request recorded");

        Ok(request)
    }

    /// The taxpayer's live request, if any.
    #[instrument(skip(self), fields(taxpayer_id = %taxpayer_id))]
    pub async fn get_tcc_request_for_taxpayer(
        &self,
        taxpayer_id: Uuid,
    ) -> Result<Option<TccRequest>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_tcc_request_for_taxpayer"])
            .start_timer();

        let request = sqlx::query_as::<_, TccRequest>(
            r#"
            SELECT request_id, taxpayer_id, requested_utc, status
            FROM tcc_requests
            WHERE taxpayer_id = $1
            "#,
        )
        .bind(taxpayer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get TCC request: {}", e)))?;

        timer.observe_duration();

        Ok(request)
    }

    /// All TCC requests with the owning taxpayer joined, newest first.
    #[instrument(skip(self))]
    pub async fn list_tcc_requests(&self) -> Result<Vec<TccRequestWithTaxpayer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_tcc_requests"])
            .start_timer();

        let requests = sqlx::query_as::<_, TccRequestWithTaxpayer>(
            r#"
            SELECT t.request_id, t.taxpayer_id, t.requested_utc, t.status,
                p.name AS taxpayer_name, p.tin AS taxpayer_tin,
                p.email AS taxpayer_email, p.taxpayer_type AS taxpayer_type
            FROM tcc_requests t
            JOIN profiles p ON p.profile_id = t.taxpayer_id
            ORDER BY t.requested_utc DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list TCC requests: {}", e))
        })?;

        timer.observe_duration();

        Ok(requests)
    }

    /// Overwrite a TCC request's status. No transition guard, as with
    /// document review.
    #[instrument(skip(self), fields(request_id = %request_id))]
    pub async fn update_tcc_status(
        &self,
        request_id: Uuid,
        status: TccStatus,
    ) -> Result<Option<TccRequest>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_tcc_status"])
            .start_timer();

        let request = sqlx::query_as::<_, TccRequest>(
            r#"
            UPDATE tcc_requests
            SET status = $2
            WHERE request_id = $1
            RETURNING request_id, taxpayer_id, requested_utc, status
            "#,
        )
        .bind(request_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update TCC status: {}", e))
        })?;

        timer.observe_duration();

        if let Some(ref req) = request {
            info!(request_id = %req.request_id, status = %req.status, "TCC status updated");
        }

        Ok(request)
    }

    // -------------------------------------------------------------------------
    // Notification Operations
    // -------------------------------------------------------------------------

    /// Insert one unread inbox entry.
    #[instrument(skip(self, title, message), fields(user_id = %user_id))]
    pub async fn insert_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_notification"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO notifications (notification_id, user_id, title, message)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(message)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert notification: {}", e))
        })?;

        timer.observe_duration();

        Ok(())
    }

    /// A user's inbox, newest first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_notifications_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_notifications_for_user"])
            .start_timer();

        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, user_id, title, message, "read", created_utc
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_utc DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list notifications: {}", e))
        })?;

        timer.observe_duration();

        Ok(notifications)
    }

    /// Mark one of the recipient's notifications read.
    #[instrument(skip(self), fields(notification_id = %notification_id, user_id = %user_id))]
    pub async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_notification_read"])
            .start_timer();

        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET "read" = TRUE
            WHERE notification_id = $1 AND user_id = $2
            RETURNING notification_id, user_id, title, message, "read", created_utc
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to mark notification read: {}", e))
        })?;

        timer.observe_duration();

        Ok(notification)
    }
}
