use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;

use crate::metrics::LookupMetrics;

use super::cpf;
use super::errors::RepositoryError;
use super::repository::CustomerRepository;
use super::response::{ErrorCode, LookupResponse};

// ============================================================================
// Customer Lookup Handler
// ============================================================================
//
// Orchestrates: raw CPF → clean/validate → repository → response envelope
//
// Nothing escapes `execute`: repository errors and panics inside the
// repository future all end up as a failure envelope.
//
// ============================================================================

#[derive(Clone)]
pub struct CustomerLookupHandler {
    repository: Arc<dyn CustomerRepository>,
    metrics: Option<Arc<LookupMetrics>>,
}

impl CustomerLookupHandler {
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self {
            repository,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<LookupMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Look up a customer by a caller-supplied CPF.
    ///
    /// Error messages echo `raw_cpf` exactly as given, not the cleaned form.
    pub async fn execute(&self, raw_cpf: &str) -> LookupResponse {
        let started = Instant::now();
        let response = self.lookup(raw_cpf).await;

        if let Some(metrics) = &self.metrics {
            metrics.record_lookup(response.outcome_label(), started.elapsed());
        }

        tracing::debug!(
            outcome = response.outcome_label(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Customer lookup finished"
        );

        response
    }

    async fn lookup(&self, raw_cpf: &str) -> LookupResponse {
        let clean_cpf = cpf::clean(raw_cpf);

        if !cpf::is_valid(&clean_cpf) {
            tracing::debug!(raw_cpf = %raw_cpf, "Rejected invalid CPF");
            return LookupResponse::invalid_cpf(raw_cpf);
        }

        tracing::debug!(
            cpf = %cpf::format(&clean_cpf).unwrap_or_default(),
            "Looking up customer"
        );

        let found = AssertUnwindSafe(self.repository.find_by_cpf(&clean_cpf))
            .catch_unwind()
            .await;

        match found {
            Ok(Ok(Some(customer))) => LookupResponse::Success(customer.into_response_data()),
            Ok(Ok(None)) => LookupResponse::not_found(raw_cpf),
            Ok(Err(error)) => self.classify(error),
            Err(_) => {
                tracing::error!(cpf = %clean_cpf, "Repository panicked during lookup");
                LookupResponse::internal_error()
            }
        }
    }

    fn classify(&self, error: RepositoryError) -> LookupResponse {
        if let Some(metrics) = &self.metrics {
            metrics.record_repository_error(error.kind());
        }

        match error {
            RepositoryError::Connection(_) => {
                tracing::error!(error = %error, "Customer repository unavailable");
                LookupResponse::failure(ErrorCode::DatabaseConnectionError, error.to_string())
            }
            RepositoryError::Unexpected(_) => {
                tracing::error!(error = %error, "Unexpected failure during customer lookup");
                LookupResponse::internal_error()
            }
        }
    }
}
