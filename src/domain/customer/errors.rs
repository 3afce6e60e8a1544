// ============================================================================
// Customer Lookup Errors
// ============================================================================

/// Failures a repository adapter can report.
///
/// "Not found" is not an error; adapters return `Ok(None)` for it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    /// The data store was unreachable or refused the operation
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Anything else (bad row shape, decode failures, ...)
    #[error("Unexpected repository error: {0}")]
    Unexpected(String),
}

impl RepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            RepositoryError::Connection(_) => "connection",
            RepositoryError::Unexpected(_) => "unexpected",
        }
    }
}

impl crate::utils::IsTransient for RepositoryError {
    fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::Connection(_))
    }
}
