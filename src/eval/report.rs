//! Fixed-width and tab-delimited reports.
//!
//! Reports print the taxonomy's labels in taxonomy order. A label missing from
//! a snapshot prints as zero. Percentages are fractions times 100; whole
//! numbers in reports, one decimal in deltas.
//!
//! # Example
//!
//! ```rust
//! use c3pa_core::{LabelTaxonomy, PredictionRecord, ResultSet};
//! use c3pa_eval::eval::metrics::{compute_distribution, evaluate};
//! use c3pa_eval::eval::report::render_report;
//!
//! let taxonomy = LabelTaxonomy::new(["X", "Y"]).unwrap();
//! let mut set = ResultSet::new();
//! set.insert("m1", vec![PredictionRecord::new("p1", "s1", "X", "X")]);
//!
//! let metrics = evaluate(&set, &taxonomy).unwrap();
//! let dist = compute_distribution(set.get("m1").unwrap(), &taxonomy);
//! let report = render_report(&metrics, &dist, &taxonomy);
//! assert!(report.starts_with("Total sections: 1\n"));
//! assert!(report.contains("=== Model: m1 ==="));
//! ```

use crate::eval::metrics::{LabelDistribution, LabelScores, MetricsSnapshot, ModelMetrics};
use c3pa_core::LabelTaxonomy;
use std::fmt::Write as _;

const LABEL_WIDTH: usize = 50;
const RULE_WIDTH: usize = 74;
const MACRO_ROW: &str = "Macro average";

/// Render the distribution table followed by one metrics table per model.
///
/// Models appear in the order of `metrics`.
pub fn render_report(
    metrics: &ModelMetrics,
    dist: &LabelDistribution,
    taxonomy: &LabelTaxonomy,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total sections: {}", dist.total);
    out.push_str("Label distribution (gold):\n");
    let _ = writeln!(out, "{:<w$}{:>8}", "Label", "Count", w = LABEL_WIDTH);
    for (label, count) in &dist.counts {
        let _ = writeln!(out, "{:<w$}{:>8}", label, count, w = LABEL_WIDTH);
    }
    out.push_str("\n\n");

    for (model_id, snapshot) in metrics {
        let _ = writeln!(out, "=== Model: {} ===", model_id);
        let _ = writeln!(
            out,
            "{:<w$}{:>8}{:>8}{:>8}",
            "Label",
            "P",
            "R",
            "F1",
            w = LABEL_WIDTH
        );
        for label in taxonomy.iter() {
            score_row(&mut out, label, &snapshot.get(label));
        }
        score_row(&mut out, MACRO_ROW, &snapshot.macro_avg());
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
    }
    out
}

fn score_row(out: &mut String, label: &str, scores: &LabelScores) {
    let _ = writeln!(
        out,
        "{:<w$}{:8.0}{:8.0}{:8.0}",
        label,
        scores.precision * 100.0,
        scores.recall * 100.0,
        scores.f1 * 100.0,
        w = LABEL_WIDTH
    );
}

/// Percentage-point change of one label between two runs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreDelta {
    /// Precision change, percentage points.
    pub precision: f64,
    /// Recall change, percentage points.
    pub recall: f64,
    /// F1 change, percentage points.
    pub f1: f64,
}

impl ScoreDelta {
    /// `after - before`, times 100.
    pub fn between(before: &LabelScores, after: &LabelScores) -> Self {
        Self {
            precision: (after.precision - before.precision) * 100.0,
            recall: (after.recall - before.recall) * 100.0,
            f1: (after.f1 - before.f1) * 100.0,
        }
    }
}

/// Per-label changes for one model present in both runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDelta {
    /// Model identifier.
    pub model_id: String,
    /// One entry per taxonomy label, in taxonomy order.
    pub labels: Vec<(String, ScoreDelta)>,
    /// Change of the macro average.
    pub macro_avg: ScoreDelta,
}

/// Deltas `second - first` for models in both runs, sorted by model id.
pub fn delta(first: &ModelMetrics, second: &ModelMetrics, taxonomy: &LabelTaxonomy) -> Vec<ModelDelta> {
    let mut common: Vec<&String> = first.keys().filter(|id| second.contains_key(*id)).collect();
    common.sort();

    common
        .into_iter()
        .filter_map(|model_id| {
            let before = first.get(model_id)?;
            let after = second.get(model_id)?;
            Some(model_delta(model_id, before, after, taxonomy))
        })
        .collect()
}

fn model_delta(
    model_id: &str,
    before: &MetricsSnapshot,
    after: &MetricsSnapshot,
    taxonomy: &LabelTaxonomy,
) -> ModelDelta {
    ModelDelta {
        model_id: model_id.to_string(),
        labels: taxonomy
            .iter()
            .map(|label| {
                (
                    label.to_string(),
                    ScoreDelta::between(&before.get(label), &after.get(label)),
                )
            })
            .collect(),
        macro_avg: ScoreDelta::between(&before.macro_avg(), &after.macro_avg()),
    }
}

/// Render the delta section for models in both runs.
///
/// With no model in common only the heading is printed.
pub fn render_delta(first: &ModelMetrics, second: &ModelMetrics, taxonomy: &LabelTaxonomy) -> String {
    let mut out = String::from("\n=== DELTA COMPARISON (File2 - File1) ===\n");
    for model in delta(first, second, taxonomy) {
        let _ = writeln!(out, "\nModel: {}", model.model_id);
        let _ = writeln!(
            out,
            "{:<w$}{:>8}{:>8}{:>8}",
            "Label",
            "ΔP",
            "ΔR",
            "ΔF1",
            w = LABEL_WIDTH
        );
        for (label, d) in &model.labels {
            delta_row(&mut out, label, d);
        }
        delta_row(&mut out, MACRO_ROW, &model.macro_avg);
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
    }
    out
}

fn delta_row(out: &mut String, label: &str, d: &ScoreDelta) {
    let _ = writeln!(
        out,
        "{:<w$}{:8.1}{:8.1}{:8.1}",
        label,
        d.precision,
        d.recall,
        d.f1,
        w = LABEL_WIDTH
    );
}

/// Tab-delimited form of [`render_report`], for pasting into spreadsheets.
pub fn render_tsv(
    metrics: &ModelMetrics,
    dist: &LabelDistribution,
    taxonomy: &LabelTaxonomy,
) -> String {
    let mut lines = vec![
        "Classification Report\n".to_string(),
        format!("Total sections:\t{}\n", dist.total),
        "Label distribution (gold):".to_string(),
        "Label\tCount".to_string(),
    ];
    lines.extend(dist.counts.iter().map(|(label, count)| format!("{}\t{}", label, count)));
    lines.push(String::new());

    for (model_id, snapshot) in metrics {
        lines.push(format!("Model:\t{}", model_id));
        lines.push("Label\tP\tR\tF1".to_string());
        for label in taxonomy.iter() {
            lines.push(tsv_row(label, &snapshot.get(label)));
        }
        lines.push(tsv_row(MACRO_ROW, &snapshot.macro_avg()));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn tsv_row(label: &str, s: &LabelScores) -> String {
    format!(
        "{}\t{:.0}\t{:.0}\t{:.0}",
        label,
        s.precision * 100.0,
        s.recall * 100.0,
        s.f1 * 100.0
    )
}
