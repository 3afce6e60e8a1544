//! Repository adapters for the customer lookup.
//!
//! Every adapter implements [`CustomerRepository`]; [`build_repository`] picks
//! one from configuration and wraps it in [`ResilientRepository`].

use std::sync::Arc;

use crate::config::{AppConfig, RepositoryBackend};
use crate::domain::customer::{CustomerRepository, RepositoryError};
use crate::metrics::LookupMetrics;

mod memory;
mod postgres;
mod resilient;
mod scylladb;

pub use memory::InMemoryCustomerRepository;
pub use postgres::PostgresCustomerRepository;
pub use resilient::ResilientRepository;
pub use scylladb::ScyllaCustomerRepository;

/// Build the configured backend behind retry and circuit breaking.
pub async fn build_repository(
    config: &AppConfig,
    metrics: Arc<LookupMetrics>,
) -> Result<Arc<dyn CustomerRepository>, RepositoryError> {
    let retry = config.retry.clone();
    let breaker = config.circuit_breaker.clone();

    let repository: Arc<dyn CustomerRepository> = match config.backend {
        RepositoryBackend::Postgres => {
            let inner = PostgresCustomerRepository::connect_lazy(&config.postgres);
            Arc::new(ResilientRepository::new(inner, retry, breaker).with_metrics(metrics))
        }
        RepositoryBackend::Scylla => {
            let inner = ScyllaCustomerRepository::connect(&config.scylla).await?;
            Arc::new(ResilientRepository::new(inner, retry, breaker).with_metrics(metrics))
        }
        RepositoryBackend::Memory => {
            tracing::warn!("Using in-memory customer repository; lookups will not find anything");
            Arc::new(InMemoryCustomerRepository::new())
        }
    };

    tracing::info!(backend = ?config.backend, "Customer repository ready");
    Ok(repository)
}
