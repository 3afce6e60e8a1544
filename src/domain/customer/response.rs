use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Lookup Response Envelope
// ============================================================================
//
// Wire shapes:
//   {"success": true,  "data":  {"id", "cpf", "name", "email", "createdAt", "updatedAt"}}
//   {"success": false, "error": {"code", "message"}}
//
// The envelope is the only externally visible output and must not change
// with the repository backend.
//
// ============================================================================

/// Customer projection returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerData {
    pub id: String,
    pub cpf: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Closed set of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidCpf,
    CustomerNotFound,
    DatabaseConnectionError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCpf => "INVALID_CPF",
            ErrorCode::CustomerNotFound => "CUSTOMER_NOT_FOUND",
            ErrorCode::DatabaseConnectionError => "DATABASE_CONNECTION_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    Success(CustomerData),
    Failure(ErrorBody),
}

impl LookupResponse {
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        LookupResponse::Failure(ErrorBody {
            code,
            message: message.into(),
        })
    }

    pub fn invalid_cpf(raw: &str) -> Self {
        Self::failure(ErrorCode::InvalidCpf, format!("Invalid CPF format: {}", raw))
    }

    pub fn not_found(raw: &str) -> Self {
        Self::failure(
            ErrorCode::CustomerNotFound,
            format!("Customer with CPF {} not found", raw),
        )
    }

    pub fn internal_error() -> Self {
        Self::failure(ErrorCode::InternalError, "An unexpected error occurred")
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LookupResponse::Success(_))
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            LookupResponse::Success(_) => None,
            LookupResponse::Failure(body) => Some(body.code),
        }
    }

    /// `SUCCESS` or the error code, for logs and metric labels
    pub fn outcome_label(&self) -> &'static str {
        self.error_code().map(|c| c.as_str()).unwrap_or("SUCCESS")
    }
}

impl Serialize for LookupResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LookupResponse", 2)?;
        match self {
            LookupResponse::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            LookupResponse::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_data() -> CustomerData {
        CustomerData {
            id: "123".to_string(),
            cpf: "11144477735".to_string(),
            name: "João Silva".to_string(),
            email: "joao@email.com".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-02T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_success_wire_shape() {
        let value = serde_json::to_value(LookupResponse::Success(sample_data())).unwrap();

        assert_eq!(
            value,
            json!({
                "success": true,
                "data": {
                    "id": "123",
                    "cpf": "11144477735",
                    "name": "João Silva",
                    "email": "joao@email.com",
                    "createdAt": "2024-01-01T00:00:00.000Z",
                    "updatedAt": "2024-01-02T00:00:00.000Z"
                }
            })
        );
    }

    #[test]
    fn test_failure_wire_shape() {
        let value = serde_json::to_value(LookupResponse::invalid_cpf("123.456")).unwrap();

        assert_eq!(
            value,
            json!({
                "success": false,
                "error": {
                    "code": "INVALID_CPF",
                    "message": "Invalid CPF format: 123.456"
                }
            })
        );
    }

    #[test]
    fn test_error_code_serde_matches_as_str() {
        for code in [
            ErrorCode::InvalidCpf,
            ErrorCode::CustomerNotFound,
            ErrorCode::DatabaseConnectionError,
            ErrorCode::InternalError,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(code.as_str()));
        }
    }

    #[test]
    fn test_outcome_label() {
        assert_eq!(LookupResponse::Success(sample_data()).outcome_label(), "SUCCESS");
        assert_eq!(LookupResponse::not_found("x").outcome_label(), "CUSTOMER_NOT_FOUND");
        assert_eq!(LookupResponse::internal_error().outcome_label(), "INTERNAL_ERROR");
    }
}
