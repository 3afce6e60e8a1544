// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Storage and transport agnostic. Adapters in `db` and `http` depend on this
// layer, never the other way round.
//
// ============================================================================

pub mod customer;
