//! Lifecycle management for long-running tasks.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → event watcher and wallet session loops exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
