//! Operator-facing adapters: input files and the confirmation prompt.

pub mod json;
pub mod prompt;
