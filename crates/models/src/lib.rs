//! SeaORM entities for the media catalogue plus the field-level validation
//! shared by every store implementation.

pub mod errors;
pub mod db;
pub mod category;
pub mod user;
pub mod work;
pub mod vote;

pub use category::Category;

#[cfg(test)]
mod tests;
