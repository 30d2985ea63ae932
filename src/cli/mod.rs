//! CLI library modules for the c3pa binary.
//!
//! Commands live here rather than in the binary so they can be tested
//! without spawning a process.

pub mod commands;
pub mod output;
pub mod parser;
