use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::prepared::PreparedStatement;

use crate::config::ScyllaConfig;
use crate::domain::customer::{Customer, CustomerRepository, RepositoryError};

type CustomerRow = (String, String, String, String, DateTime<Utc>, DateTime<Utc>);

/// ScyllaDB-backed repository; customers are partitioned by `cpf`.
pub struct ScyllaCustomerRepository {
    session: Arc<Session>,
    find_by_cpf: PreparedStatement,
}

impl ScyllaCustomerRepository {
    /// Open a session against `config.nodes` and prepare the lookup query.
    pub async fn connect(config: &ScyllaConfig) -> Result<Self, RepositoryError> {
        tracing::info!(
            nodes = ?config.nodes,
            keyspace = %config.keyspace,
            "Connecting to ScyllaDB"
        );

        let session = SessionBuilder::new()
            .known_nodes(&config.nodes)
            .use_keyspace(config.keyspace.clone(), false)
            .build()
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;

        Self::new(Arc::new(session), &config.table).await
    }

    pub async fn new(session: Arc<Session>, table: &str) -> Result<Self, RepositoryError> {
        let find_by_cpf = session
            .prepare(select_statement(table))
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;

        Ok(Self {
            session,
            find_by_cpf,
        })
    }
}

#[async_trait]
impl CustomerRepository for ScyllaCustomerRepository {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Customer>, RepositoryError> {
        tracing::debug!(cpf = %cpf, "Querying ScyllaDB for customer");

        let result = self
            .session
            .execute_unpaged(&self.find_by_cpf, (cpf,))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "ScyllaDB customer query failed");
                RepositoryError::connection(e.to_string())
            })?;

        let rows = result
            .into_rows_result()
            .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        let row = rows
            .maybe_first_row::<CustomerRow>()
            .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        match row {
            Some((id, cpf, name, email, created_at, updated_at)) => Ok(Some(Customer::new(
                id, cpf, name, email, created_at, updated_at,
            ))),
            None => {
                tracing::debug!(cpf = %cpf, "Customer not found in ScyllaDB");
                Ok(None)
            }
        }
    }
}

fn select_statement(table: &str) -> String {
    format!(
        "SELECT id, cpf, name, email, created_at, updated_at FROM {} WHERE cpf = ?",
        table
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_statement_targets_configured_table() {
        assert_eq!(
            select_statement("customers_v2"),
            "SELECT id, cpf, name, email, created_at, updated_at FROM customers_v2 WHERE cpf = ?"
        );
    }
}
