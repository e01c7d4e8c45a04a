//! Marketplace backend calls.
//!
//! The backend creates item and project records before the on-chain call.
//! When the chain side fails, the record is unset again, best effort.

pub mod client;

pub use client::{BackendClient, RollbackResource};
