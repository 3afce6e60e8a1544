use chrono::{DateTime, SecondsFormat, Utc};

use super::response::CustomerData;

// ============================================================================
// Customer Entity
// ============================================================================
//
// Read-only view of a stored customer. Only repository adapters build these,
// from rows they trust; user input never becomes a `Customer` directly.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: String,
    pub cpf: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        id: impl Into<String>,
        cpf: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            cpf: cpf.into(),
            name: name.into(),
            email: email.into(),
            created_at,
            updated_at,
        }
    }

    /// Project into the response shape, consuming the entity.
    pub fn into_response_data(self) -> CustomerData {
        CustomerData {
            id: self.id,
            cpf: self.cpf,
            name: self.name,
            email: self.email,
            created_at: to_iso8601(&self.created_at),
            updated_at: to_iso8601(&self.updated_at),
        }
    }
}

/// `2024-01-01T00:00:00.000Z`
pub fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
