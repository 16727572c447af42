//! Service layer providing the catalogue's business rules on top of models.
//! - Separates decision logic (authorization, validation, vote uniqueness) from data access.
//! - Every store sits behind a repository trait with a SeaORM and an in-memory implementation.
//! - Callers pass the resolved `Actor` explicitly into each operation.

pub mod errors;
pub mod auth;
pub mod works;
#[cfg(test)]
pub mod test_support;
