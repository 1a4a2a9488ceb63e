//! Document discovery and the per-document formatting pipeline.

mod discovery;
mod processing;

pub use discovery::*;
pub use processing::*;
