#![allow(dead_code)]

pub mod builders;
pub mod harness;

// Re-export commonly used test utilities
pub use builders::VectorBuilder;
pub use harness::{classifier, orchestrator, registry};
