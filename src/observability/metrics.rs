//! Metrics collection.
//!
//! # Metrics
//! - `marketplace_operations_total` (counter): operations by name and outcome
//! - `marketplace_receipt_polls_total` (counter): receipt queries issued
//! - `marketplace_confirmation_seconds` (histogram): submit-to-receipt latency
//! - `marketplace_rollbacks_total` (counter): backend rollbacks by resource and outcome
//!
//! Updates go through the `metrics` facade and are no-ops until the embedding
//! application installs a recorder.

use std::time::Duration;

use metrics::{counter, histogram};

/// Record the outcome of a marketplace operation.
pub fn record_operation(operation: &'static str, outcome: &'static str) {
    counter!("marketplace_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

/// Record a single receipt query.
pub fn record_receipt_poll() {
    counter!("marketplace_receipt_polls_total").increment(1);
}

/// Record time from submission until a receipt appeared.
pub fn record_confirmation(elapsed: Duration) {
    histogram!("marketplace_confirmation_seconds").record(elapsed.as_secs_f64());
}

/// Record a backend rollback attempt.
pub fn record_rollback(resource: &'static str, outcome: &'static str) {
    counter!("marketplace_rollbacks_total", "resource" => resource, "outcome" => outcome)
        .increment(1);
}
