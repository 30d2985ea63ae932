//! Producing result files by asking LLMs to label annotated spans.
//!
//! - [`dataset`]: annotated policy dumps and seeded sampling
//! - [`prompt`]: system and user prompts, answer normalization
//! - [`client`]: provider ids, the [`Classifier`] trait, the HTTP backend
//! - [`rate_limit`]: shared request quotas
//! - [`runner`]: one worker per model, results gathered in model order

pub mod client;
pub mod dataset;
pub mod prompt;
pub mod rate_limit;
pub mod runner;

pub use client::{Classifier, MockClassifier, ModelId, Provider};
pub use dataset::{load_policy_dump, sample_policies, AnnotatedPolicy, Annotation};
pub use runner::{run_inference, InferenceOptions};
