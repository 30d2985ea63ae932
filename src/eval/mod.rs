//! Evaluation of classification result files.
//!
//! # Overview
//!
//! The pipeline runs in four steps, each usable on its own:
//!
//! - [`merge`]: combine result files, dropping repeated observations
//! - [`filter`]: remove near-identical spans with conflicting gold labels
//! - [`metrics`]: per-label precision, recall and F1 per model
//! - [`report`]: fixed-width reports, tab-delimited export, run deltas
//!
//! [`loader`] reads and writes the JSON files they share.
//!
//! # Example
//!
//! ```rust
//! use c3pa_core::{LabelTaxonomy, PredictionRecord, ResultSet};
//! use c3pa_eval::eval::{filter, merge, metrics};
//!
//! let mut run = ResultSet::new();
//! run.insert("m1", vec![
//!     PredictionRecord::new("p1", "We may sell your data.", "Sold", "Sold"),
//!     PredictionRecord::new("p1", "We may sell your data!", "Shared", "Sold"),
//! ]);
//!
//! let combined = merge::merge([run.clone(), run]);
//! let (filtered, _) = filter::filter_result_set(&combined, filter::DEFAULT_THRESHOLD);
//! assert_eq!(filtered.get("m1").unwrap().len(), 0);
//!
//! let taxonomy = LabelTaxonomy::new(["Sold", "Shared"]).unwrap();
//! let scores = metrics::evaluate(&combined, &taxonomy).unwrap();
//! assert_eq!(scores["m1"].get("Sold").precision, 0.5);
//! ```

pub mod filter;
pub mod loader;
pub mod merge;
pub mod metrics;
pub mod report;

pub use filter::{filter_conflicts, filter_result_set, FilterSummary, DEFAULT_THRESHOLD};
pub use loader::{read_result_set, write_result_set};
pub use merge::{combine_files, count_unique_policies, merge, MergeStats, Merger};
pub use metrics::{
    compute_distribution, evaluate, evaluate_to_file, LabelDistribution, LabelScores,
    MetricsSnapshot, ModelMetrics, MACRO_AVG,
};
pub use report::{delta, render_delta, render_report, render_tsv, ModelDelta, ScoreDelta};
