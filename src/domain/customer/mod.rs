// ============================================================================
// Customer Domain - CPF Lookup
// ============================================================================
//
// This module contains ALL customer-lookup code that does not depend on a
// particular data store or transport:
// - CPF normalization and check-digit validation
// - Customer entity and its response projection
// - Response envelope and closed error codes
// - Repository trait and its error type
// - Lookup handler (validator + repository → envelope)
//
// Concrete repositories live in `crate::db`, the HTTP adapter in `crate::http`.
//
// ============================================================================

pub mod cpf;
pub mod entity;
pub mod errors;
pub mod lookup_handler;
pub mod repository;
pub mod response;

// Re-export for convenience
pub use cpf::{clean, is_valid, validate_and_clean, CpfValidation};
pub use entity::Customer;
pub use errors::RepositoryError;
pub use lookup_handler::CustomerLookupHandler;
pub use repository::CustomerRepository;
pub use response::{CustomerData, ErrorBody, ErrorCode, LookupResponse};
