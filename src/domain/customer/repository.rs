use async_trait::async_trait;

use super::entity::Customer;
use super::errors::RepositoryError;

/// Lookup capability the orchestrator depends on.
///
/// `cpf` is always the normalized 11-digit form. Adapters return `Ok(None)`
/// when no record exists and reserve `RepositoryError::Connection` for
/// transport or infrastructure failures. Any resource acquired for the call
/// must be released before returning, on every path.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Customer>, RepositoryError>;
}

#[async_trait]
impl<R: CustomerRepository + ?Sized> CustomerRepository for std::sync::Arc<R> {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Customer>, RepositoryError> {
        (**self).find_by_cpf(cpf).await
    }
}
