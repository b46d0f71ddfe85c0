//! Batch orchestration: the public load/save entry points and their configuration.

/// Engine configuration (JSON-loadable).
pub mod config;
/// [`orchestrator::BatchEngine`] and its result types.
pub mod orchestrator;
