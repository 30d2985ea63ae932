//! Pruning conflicting near-duplicate annotations.
//!
//! Two spans of the same policy that read almost the same but carry different
//! gold labels are annotation noise: neither label can be trusted, so both
//! records are removed before scoring.

use crate::similarity::sequence_ratio;
use c3pa_core::{PolicyId, PredictionRecord, ResultSet};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Default similarity threshold for [`filter_conflicts`].
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// Indices of records involved in at least one conflict.
///
/// Records are grouped by `policy_id` (a missing id is a group of its own).
/// Within a group, every pair `(i, j)` with `i` before `j` is checked: if the
/// gold labels differ and `sequence_ratio(span_i, span_j) >= threshold`, both
/// are marked. Every pair is visited.
///
/// A missing or `null` span compares as the empty string, not as a
/// placeholder word: ratio 1 against another empty span, 0 against any other.
/// A non-string span compares by its JSON text. Gold labels compare by value, so `7` and `"7"`
/// disagree.
pub fn conflicting_indices(records: &[PredictionRecord], threshold: f64) -> BTreeSet<usize> {
    let mut groups: IndexMap<Option<&PolicyId>, Vec<usize>> = IndexMap::new();
    for (idx, record) in records.iter().enumerate() {
        groups
            .entry(record.policy_id.as_ref())
            .or_default()
            .push(idx);
    }

    let mut to_drop = BTreeSet::new();
    for (policy_id, indices) in &groups {
        for (pos, &i) in indices.iter().enumerate() {
            for &j in &indices[pos + 1..] {
                let (r_i, r_j) = (&records[i], &records[j]);
                if r_i.gold == r_j.gold {
                    continue;
                }
                let ratio = sequence_ratio(&r_i.span_text(), &r_j.span_text());
                if ratio >= threshold {
                    log::debug!(
                        "conflict in policy {}: records {} ({:?}) and {} ({:?}), ratio {:.3}",
                        policy_id.map_or_else(|| "<none>".to_string(), ToString::to_string),
                        i,
                        r_i.gold,
                        j,
                        r_j.gold,
                        ratio
                    );
                    to_drop.insert(i);
                    to_drop.insert(j);
                }
            }
        }
    }
    to_drop
}

/// Drop both sides of every conflicting pair, keeping the order of the rest.
///
/// ```rust
/// use c3pa_core::PredictionRecord;
/// use c3pa_eval::eval::filter::filter_conflicts;
///
/// let records = vec![
///     PredictionRecord::new("p1", "The quick brown fox", "A", "A"),
///     PredictionRecord::new("p1", "The quick brown fox ", "B", "A"),
/// ];
/// assert!(filter_conflicts(&records, 0.75).is_empty());
/// assert_eq!(filter_conflicts(&records, 0.99).len(), 2);
/// ```
pub fn filter_conflicts(records: &[PredictionRecord], threshold: f64) -> Vec<PredictionRecord> {
    let to_drop = conflicting_indices(records, threshold);
    records
        .iter()
        .enumerate()
        .filter(|(idx, _)| !to_drop.contains(idx))
        .map(|(_, record)| record.clone())
        .collect()
}

/// Records before and after filtering, per model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// `model_id -> (before, after)`.
    pub counts: IndexMap<String, (usize, usize)>,
}

impl FilterSummary {
    /// Total records removed across all models.
    pub fn total_dropped(&self) -> usize {
        self.counts.values().map(|(before, after)| before - after).sum()
    }
}

/// Filter every model's records independently.
///
/// Filtering only looks at `policy_id`, `span` and `gold`, so models scored on
/// the same annotations lose the same records.
pub fn filter_result_set(set: &ResultSet, threshold: f64) -> (ResultSet, FilterSummary) {
    let mut summary = FilterSummary::default();
    let filtered = set
        .iter()
        .map(|(model_id, records)| {
            let kept = filter_conflicts(records, threshold);
            log::info!(
                "{}: dropped {} of {} records as conflicting",
                model_id,
                records.len() - kept.len(),
                records.len()
            );
            summary
                .counts
                .insert(model_id.to_string(), (records.len(), kept.len()));
            (model_id.to_string(), kept)
        })
        .collect();
    (filtered, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(policy: &str, span: &str, gold: &str) -> PredictionRecord {
        PredictionRecord::new(policy, span, gold, gold)
    }

    #[test]
    fn test_trailing_space_conflict() {
        let records = vec![
            rec("p1", "The quick brown fox", "A"),
            rec("p1", "The quick brown fox ", "B"),
        ];
        assert!(filter_conflicts(&records, 0.75).is_empty());
        assert_eq!(filter_conflicts(&records, 0.99), records);
    }

    #[test]
    fn test_same_gold_never_dropped() {
        let records = vec![rec("p1", "We sell data.", "A"), rec("p1", "We sell data.", "A")];
        assert_eq!(filter_conflicts(&records, 0.0), records);
    }

    #[test]
    fn test_threshold_zero_drops_every_disagreement() {
        let records = vec![
            rec("p1", "alpha", "A"),
            rec("p1", "completely different", "B"),
            rec("p1", "zzz", "A"),
        ];
        assert!(filter_conflicts(&records, 0.0).is_empty());
    }

    #[test]
    fn test_threshold_one_needs_identical_text() {
        let records = vec![
            rec("p1", "Contact us at 1-800-555-0100.", "Methods"),
            rec("p1", "Contact us at 1-800-555-0100.", "Delete"),
            rec("p1", "Contact us at 1-800-555-0101.", "Correct"),
        ];
        let kept = filter_conflicts(&records, 1.0);
        assert_eq!(kept, vec![records[2].clone()]);
    }

    #[test]
    fn test_groups_by_policy() {
        let records = vec![
            rec("p1", "same text", "A"),
            rec("p2", "same text", "B"),
        ];
        assert_eq!(filter_conflicts(&records, 0.5), records);
    }

    #[test]
    fn test_missing_policy_is_its_own_group() {
        let mut a = rec("x", "same text", "A");
        let mut b = rec("x", "same text", "B");
        a.policy_id = None;
        b.policy_id = None;
        let c = rec("p1", "same text", "C");
        let kept = filter_conflicts(&[a, b, c.clone()], 0.9);
        assert_eq!(kept, vec![c]);
    }

    #[test]
    fn test_null_span_reads_as_empty() {
        let set: ResultSet = serde_json::from_str(
            r#"{"m1": [{"policy_id": "p1", "span": null, "gold": "A", "pred": "A"},
                       {"policy_id": "p1", "gold": "B", "pred": "A"},
                       {"policy_id": "p1", "span": "None", "gold": "C", "pred": "A"}]}"#,
        )
        .unwrap();
        let records = set.get("m1").unwrap();
        assert_eq!(conflicting_indices(records, 0.5), BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_numeric_gold_differs_from_string() {
        let set: ResultSet = serde_json::from_str(
            r#"{"m1": [{"policy_id": 2.5, "span": "same text", "gold": 7, "pred": "A"},
                       {"policy_id": 2.5, "span": "same text", "gold": "7", "pred": "A"},
                       {"policy_id": 2.5, "span": "same text", "gold": 7, "pred": "B"}]}"#,
        )
        .unwrap();
        let records = set.get("m1").unwrap();
        assert_eq!(conflicting_indices(records, 0.9), BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_later_pair_can_drop_earlier_survivor() {
        // record 0 only conflicts with record 2; nothing is decided early.
        let records = vec![
            rec("p1", "We do not sell personal information.", "Sold"),
            rec("p1", "You may request deletion.", "Sold"),
            rec("p1", "We do not sell personal information!", "Shared"),
        ];
        assert_eq!(conflicting_indices(&records, 0.75), BTreeSet::from([0, 2]));
        assert_eq!(filter_conflicts(&records, 0.75), vec![records[1].clone()]);
    }

    #[test]
    fn test_marking_is_idempotent() {
        let records = vec![
            rec("p1", "opt out", "A"),
            rec("p1", "opt out", "B"),
            rec("p1", "opt out", "C"),
        ];
        assert_eq!(conflicting_indices(&records, 0.9).len(), 3);
    }

    #[test]
    fn test_small_groups_produce_no_drops() {
        assert!(filter_conflicts(&[], 0.5).is_empty());
        let single = vec![rec("p1", "x", "A")];
        assert_eq!(filter_conflicts(&single, 0.0), single);
    }

    #[test]
    fn test_filter_result_set_summary() {
        let mut set = ResultSet::new();
        set.insert(
            "m1",
            vec![rec("p1", "same", "A"), rec("p1", "same", "B"), rec("p1", "other", "A")],
        );
        set.insert("m2", vec![rec("p1", "same", "A")]);
        let (filtered, summary) = filter_result_set(&set, 0.75);
        assert_eq!(filtered.get("m1").unwrap().len(), 1);
        assert_eq!(summary.counts["m1"], (3, 1));
        assert_eq!(summary.counts["m2"], (1, 1));
        assert_eq!(summary.total_dropped(), 2);
    }
}
