//! Expose reportmark's command plumbing for integration tests. The stable
//! library API lives in `reportmark-core`.
pub mod cli;
pub mod commands;
