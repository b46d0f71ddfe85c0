//! Concurrent transfer scheduling and progress reporting.

/// Progress sinks.
pub mod progress;
/// Bounded worker pool with ordered reassembly and fail-fast cancellation.
pub mod scheduler;
