//! Background loading: byte acquisition and decode off the owning thread.

/// Source resolution and decode jobs.
pub mod loader;
/// Job runners and one-shot completions.
pub mod runner;
