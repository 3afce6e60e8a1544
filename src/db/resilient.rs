use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::customer::{Customer, CustomerRepository, RepositoryError};
use crate::metrics::LookupMetrics;
use crate::utils::{
    retry_on_transient, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, RetryConfig,
};

// ============================================================================
// Resilient Repository - retry + circuit breaker around any adapter
// ============================================================================
//
// Retry/timeout policy belongs to the repository side, so it is layered here
// rather than in the lookup handler. Each attempt passes through the breaker;
// once it is open, lookups fail fast as connection errors without retrying.
//
// ============================================================================

pub struct ResilientRepository<R> {
    inner: R,
    retry: RetryConfig,
    breaker: CircuitBreaker,
    metrics: Option<Arc<LookupMetrics>>,
}

impl<R: CustomerRepository> ResilientRepository<R> {
    pub fn new(inner: R, retry: RetryConfig, breaker: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            retry,
            breaker: CircuitBreaker::new(breaker),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<LookupMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl<R: CustomerRepository> CustomerRepository for ResilientRepository<R> {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Customer>, RepositoryError> {
        let result = retry_on_transient(&self.retry, |_attempt| {
            self.breaker.call(self.inner.find_by_cpf(cpf))
        })
        .await;

        if let Some(metrics) = &self.metrics {
            metrics.set_circuit_state(self.breaker.state().await);
        }

        match result {
            Ok(found) => Ok(found),
            Err(CircuitBreakerError::CircuitOpen) => {
                Err(RepositoryError::connection("circuit breaker is open"))
            }
            Err(CircuitBreakerError::OperationFailed(error)) => Err(error),
        }
    }
}
