//! CLI command handlers.

pub mod analyze;
pub mod classify;
pub mod groupings;
