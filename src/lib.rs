//! # c3pa-eval
//!
//! Evaluation of LLM labels for CCPA/CPRA privacy-policy disclosures.
//!
//! Annotated policy spans are labelled by one or more models, the resulting
//! files merged and cleaned, and each model scored per label against the
//! 12-category C3PA taxonomy.
//!
//! - **Merge**: combine result files, one copy per `(policy_id, span, gold, pred)`
//! - **Filter**: drop near-identical spans whose gold labels disagree
//! - **Metrics**: per-label precision, recall, F1 and support, plus macro average
//! - **Report**: fixed-width tables, tab-delimited export, run-to-run deltas
//! - **Inference**: prompts, provider backends, one worker per model
//!
//! ## Quick Start
//!
//! ```rust
//! use c3pa_eval::{eval, LabelTaxonomy, PredictionRecord, ResultSet};
//!
//! let mut run = ResultSet::new();
//! run.insert("openai:gpt-4.1-mini", vec![
//!     PredictionRecord::new("p1", "You may request deletion.",
//!         "Description of Right to Delete", "Description of Right to Delete"),
//!     PredictionRecord::new("p1", "Last updated: January 2024.",
//!         "Updated Privacy Policy", "Methods to exercise rights"),
//! ]);
//!
//! let taxonomy = LabelTaxonomy::c3pa();
//! let metrics = eval::evaluate(&run, &taxonomy).unwrap();
//! let scores = metrics["openai:gpt-4.1-mini"].get("Description of Right to Delete");
//! assert_eq!(scores.f1, 1.0);
//! ```
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! c3pa-eval = "0.1"                                      # evaluation only
//! c3pa-eval = { version = "0.1", features = ["network"] } # + HTTP LLM backends
//! ```

#![warn(missing_docs)]

pub mod cli;
mod error;
pub mod eval;
pub mod infer;
pub mod similarity;

pub use c3pa_core::{
    FieldValue, IdentityKey, LabelTaxonomy, PolicyId, PredictionRecord, ResultSet, C3PA_LABELS,
};
pub use error::{Error, Result};
