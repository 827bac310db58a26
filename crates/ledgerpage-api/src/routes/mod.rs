//! Route modules for the API server
//!
//! - transactions: Transaction list with keyset pagination and filters

pub mod transactions;
