//! Command implementations for the c3pa CLI
//!
//! Each command has its own module with an argument struct and a `run`
//! function returning a printable error.

pub mod compare;
pub mod evaluate;
pub mod infer;
pub mod merge;

pub use compare::CompareArgs;
pub use evaluate::EvaluateArgs;
pub use infer::InferArgs;
pub use merge::MergeArgs;
