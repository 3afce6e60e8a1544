use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow, PgSslMode};
use sqlx::{PgPool, Row};

use crate::config::PostgresConfig;
use crate::domain::customer::{Customer, CustomerRepository, RepositoryError};

const FIND_BY_CPF: &str = "SELECT id::text AS id, cpf, name, email, created_at, updated_at \
                           FROM customers WHERE cpf = $1";

/// PostgreSQL-backed repository.
///
/// Each lookup checks one connection out of the pool; sqlx returns it when
/// the query future completes or is dropped.
pub struct PostgresCustomerRepository {
    pool: PgPool,
}

impl PostgresCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily connecting pool; nothing is dialed until the first lookup.
    pub fn connect_lazy(config: &PostgresConfig) -> Self {
        tracing::info!(config = ?config, "Configuring PostgreSQL pool");

        let ssl_mode = if config.ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        };

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(Some(config.idle_timeout))
            .acquire_timeout(config.connect_timeout)
            .connect_lazy_with(options);

        Self::new(pool)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Customer>, RepositoryError> {
        tracing::debug!(cpf = %cpf, "Querying PostgreSQL for customer");

        let row = sqlx::query(FIND_BY_CPF)
            .bind(cpf)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "PostgreSQL customer query failed");
                classify(e)
            })?;

        match row {
            Some(row) => customer_from_row(&row).map(Some),
            None => {
                tracing::debug!(cpf = %cpf, "Customer not found in PostgreSQL");
                Ok(None)
            }
        }
    }
}

fn customer_from_row(row: &PgRow) -> Result<Customer, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::unexpected(e.to_string());

    Ok(Customer::new(
        row.try_get::<String, _>("id").map_err(decode)?,
        row.try_get::<String, _>("cpf").map_err(decode)?,
        row.try_get::<String, _>("name").map_err(decode)?,
        row.try_get::<String, _>("email").map_err(decode)?,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
        row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode)?,
    ))
}

/// Transport, pool and server-side failures are connectivity problems;
/// decode problems mean the store answered with something unexpected.
fn classify(error: sqlx::Error) -> RepositoryError {
    let message = error.to_string();
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Configuration(_)
        | sqlx::Error::Database(_) => RepositoryError::connection(message),
        _ => RepositoryError::unexpected(message),
    }
}
