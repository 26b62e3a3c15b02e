//! Metrics module for revenue-service.
//! Provides Prometheus metrics for the assessment, payment, document and
//! notification workflows.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, TextEncoder, histogram_opts, opts,
    register_histogram_vec, register_int_counter_vec,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "revenue_db_query_duration_seconds",
            "Database query duration"
        ),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Assessments created counter
pub static ASSESSMENTS_CREATED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Payments settled counter
pub static PAYMENTS_SETTLED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Documents uploaded counter
pub static DOCUMENTS_UPLOADED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// TCC requests counter
pub static TCC_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Notification delivery counter
pub static NOTIFICATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    ASSESSMENTS_CREATED_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "revenue_assessments_created_total",
                "Total assessments created by tax type"
            ),
            &["tax_type"]
        )
        .expect("Failed to register ASSESSMENTS_CREATED_TOTAL")
    });

    PAYMENTS_SETTLED_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "revenue_payments_settled_total",
                "Total payments settled, split by high-value flag"
            ),
            &["high_value"]
        )
        .expect("Failed to register PAYMENTS_SETTLED_TOTAL")
    });

    DOCUMENTS_UPLOADED_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "revenue_documents_uploaded_total",
                "Total documents uploaded"
            ),
            &["status"]
        )
        .expect("Failed to register DOCUMENTS_UPLOADED_TOTAL")
    });

    TCC_REQUESTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("revenue_tcc_requests_total", "Total TCC request upserts"),
            &["status"]
        )
        .expect("Failed to register TCC_REQUESTS_TOTAL")
    });

    NOTIFICATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "revenue_notifications_total",
                "Notification inserts by outcome"
            ),
            &["outcome"]
        )
        .expect("Failed to register NOTIFICATIONS_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*DB_QUERY_DURATION;
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Failed to convert metrics to string")
}

/// Record a created assessment.
pub fn record_assessment_created(tax_type: &str) {
    if let Some(counter) = ASSESSMENTS_CREATED_TOTAL.get() {
        counter.with_label_values(&[tax_type]).inc();
    }
}

/// Record a settled payment.
pub fn record_payment_settled(high_value: bool) {
    if let Some(counter) = PAYMENTS_SETTLED_TOTAL.get() {
        counter
            .with_label_values(&[if high_value { "true" } else { "false" }])
            .inc();
    }
}

/// Record an uploaded document.
pub fn record_document_uploaded(status: &str) {
    if let Some(counter) = DOCUMENTS_UPLOADED_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

/// Record a TCC request upsert.
pub fn record_tcc_request(status: &str) {
    if let Some(counter) = TCC_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

/// Record a notification insert outcome.
pub fn record_notification(outcome: &str) {
    if let Some(counter) = NOTIFICATIONS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}
