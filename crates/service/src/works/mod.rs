//! Works module: the catalogue and its votes.
//!
//! `WorksService` is the only place that decides anything: it gates on the
//! actor, resolves ids, validates payloads and asks the vote store for an
//! idempotent insert.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::WorksService;
