//! Per-label classification metrics.
//!
//! Every model gets one [`MetricsSnapshot`]: precision, recall, F1 and support
//! for each taxonomy label plus a `"macro avg"` entry. The taxonomy fixes the
//! rows. A gold or predicted value outside it never gets a row of its own;
//! it only shows up as a false positive or false negative of the taxonomy
//! labels it touches.
//!
//! Zero denominators score 0. A label nobody predicted and nobody annotated
//! therefore reads `0 / 0 / 0` with support 0, and is still reported.

use crate::eval::loader::write_json_pretty;
use crate::Result;
use c3pa_core::{Error as CoreError, FieldValue, LabelTaxonomy, PredictionRecord, ResultSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// Key of the macro-average entry, as in the metrics file format.
pub const MACRO_AVG: &str = "macro avg";

/// True positive, false positive and false negative counts for one label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    /// gold == label and pred == label.
    pub tp: usize,
    /// pred == label, gold != label.
    pub fp: usize,
    /// gold == label, pred != label.
    pub fn_: usize,
}

impl ConfusionCounts {
    /// TP / (TP + FP), or 0 with no predictions.
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN), or 0 with no gold instances.
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall, or 0 when both are 0.
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    /// Gold instances of the label.
    pub fn support(&self) -> usize {
        self.tp + self.fn_
    }

    /// Scores derived from these counts.
    pub fn scores(&self) -> LabelScores {
        LabelScores {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            support: self.support(),
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Scores for one label, as fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelScores {
    /// Precision.
    pub precision: f64,
    /// Recall.
    pub recall: f64,
    /// F1.
    #[serde(rename = "f1-score")]
    pub f1: f64,
    /// Gold instances.
    pub support: usize,
}

/// Metrics of one model: every taxonomy label, then `"macro avg"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsSnapshot(IndexMap<String, LabelScores>);

impl MetricsSnapshot {
    /// Scores for `label`; a label this snapshot lacks scores all zeros.
    pub fn get(&self, label: &str) -> LabelScores {
        self.0.get(label).copied().unwrap_or_default()
    }

    /// The macro-average entry.
    pub fn macro_avg(&self) -> LabelScores {
        self.get(MACRO_AVG)
    }

    /// Number of entries, macro average included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelScores)> {
        self.0.iter().map(|(label, scores)| (label.as_str(), scores))
    }
}

impl FromIterator<(String, LabelScores)> for MetricsSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, LabelScores)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Snapshots per model id, in model order.
pub type ModelMetrics = IndexMap<String, MetricsSnapshot>;

/// Per-label confusion counts for `(gold, pred)` pairs.
pub fn confusion_counts<'a, I>(pairs: I, taxonomy: &LabelTaxonomy) -> Vec<ConfusionCounts>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut counts = vec![ConfusionCounts::default(); taxonomy.len()];
    for (gold, pred) in pairs {
        let gold_idx = taxonomy.position(gold);
        let pred_idx = taxonomy.position(pred);
        match (gold_idx, pred_idx) {
            (Some(g), Some(p)) if g == p => counts[g].tp += 1,
            _ => {
                if let Some(p) = pred_idx {
                    counts[p].fp += 1;
                }
                if let Some(g) = gold_idx {
                    counts[g].fn_ += 1;
                }
            }
        }
    }
    counts
}

/// Build a snapshot from `(gold, pred)` pairs.
pub fn score_pairs<'a, I>(pairs: I, taxonomy: &LabelTaxonomy) -> MetricsSnapshot
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let counts = confusion_counts(pairs, taxonomy);
    let per_label: Vec<LabelScores> = counts.iter().map(ConfusionCounts::scores).collect();

    let n = per_label.len() as f64;
    let macro_avg = LabelScores {
        precision: per_label.iter().map(|s| s.precision).sum::<f64>() / n,
        recall: per_label.iter().map(|s| s.recall).sum::<f64>() / n,
        f1: per_label.iter().map(|s| s.f1).sum::<f64>() / n,
        support: per_label.iter().map(|s| s.support).sum(),
    };

    taxonomy
        .iter()
        .map(str::to_string)
        .zip(per_label)
        .chain(std::iter::once((MACRO_AVG.to_string(), macro_avg)))
        .collect()
}

/// Score one model's records.
///
/// # Errors
///
/// A record without `gold` or `pred` is an input error naming the model and
/// the record's position. A non-string value is scored by its JSON text, so
/// it can only count as a miss.
pub fn evaluate_records(
    model_id: &str,
    records: &[PredictionRecord],
    taxonomy: &LabelTaxonomy,
) -> Result<MetricsSnapshot> {
    let pairs = records
        .iter()
        .enumerate()
        .map(|(idx, record)| -> Result<(Cow<str>, Cow<str>)> {
            let context = || format!("record {} of model {:?}", idx, model_id);
            let gold = record
                .gold
                .as_ref()
                .map(FieldValue::text)
                .ok_or_else(|| CoreError::missing_field("gold", context()))?;
            let pred = record
                .pred
                .as_ref()
                .map(FieldValue::text)
                .ok_or_else(|| CoreError::missing_field("pred", context()))?;
            Ok((gold, pred))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(score_pairs(
        pairs.iter().map(|(gold, pred)| (gold.as_ref(), pred.as_ref())),
        taxonomy,
    ))
}

/// Score every model in `set`.
pub fn evaluate(set: &ResultSet, taxonomy: &LabelTaxonomy) -> Result<ModelMetrics> {
    set.iter()
        .map(|(model_id, records)| {
            let snapshot = evaluate_records(model_id, records, taxonomy)?;
            log::debug!(
                "{}: macro F1 {:.3} over {} records",
                model_id,
                snapshot.macro_avg().f1,
                records.len()
            );
            Ok((model_id.to_string(), snapshot))
        })
        .collect()
}

/// [`evaluate`], then write the full per-model mapping to `output` if given.
pub fn evaluate_to_file(
    set: &ResultSet,
    taxonomy: &LabelTaxonomy,
    output: Option<&Path>,
) -> Result<ModelMetrics> {
    let metrics = evaluate(set, taxonomy)?;
    if let Some(path) = output {
        write_json_pretty(path, &metrics)?;
        log::info!("wrote metrics to {}", path.display());
    }
    Ok(metrics)
}

/// Record count and gold-label counts over the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDistribution {
    /// Number of records, whatever their gold label.
    pub total: usize,
    /// Gold occurrences per taxonomy label, every label present.
    pub counts: IndexMap<String, usize>,
}

impl LabelDistribution {
    /// Zero records; every label at 0.
    pub fn empty(taxonomy: &LabelTaxonomy) -> Self {
        Self {
            total: 0,
            counts: taxonomy.iter().map(|label| (label.to_string(), 0)).collect(),
        }
    }
}

/// Count gold labels. Gold values outside the taxonomy add to `total` only.
pub fn compute_distribution(
    records: &[PredictionRecord],
    taxonomy: &LabelTaxonomy,
) -> LabelDistribution {
    let mut dist = LabelDistribution::empty(taxonomy);
    dist.total = records.len();
    for gold in records.iter().filter_map(PredictionRecord::gold_str) {
        if let Some(count) = dist.counts.get_mut(gold) {
            *count += 1;
        }
    }
    dist
}
