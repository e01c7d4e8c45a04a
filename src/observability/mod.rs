//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (fmt subscriber installed by the binary)
//!     → whatever metrics recorder the embedding application installs
//! ```

pub mod logging;
pub mod metrics;
