//! Transaction routes - cursor-paginated list with filters
//!
//! Structure:
//! - api.rs: JSON API endpoints

pub mod api;

pub use api::api_transactions;
