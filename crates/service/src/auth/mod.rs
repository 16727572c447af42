//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Credential checking belongs to the identity provider; this module turns a
//! provider-asserted username into a user row and a signed session token,
//! and turns a token back into an `Actor`.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use domain::Actor;
pub use service::AuthService;
