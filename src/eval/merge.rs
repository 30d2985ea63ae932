//! Merging result files from repeated or partial runs.
//!
//! Runs are often split across several files (a crashed run resumed, extra
//! policies sampled later). Merging keeps one copy of every observation per
//! model, where an observation is identified by `(policy_id, span, gold, pred)`.
//! The first copy wins; later copies are dropped whole, never field-merged.

use crate::eval::loader::{read_result_set, write_result_set};
use crate::Result;
use c3pa_core::{IdentityKey, PolicyId, ResultSet};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Counts from adding one result set to a [`Merger`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records kept.
    pub added: usize,
    /// Records dropped as duplicates of an earlier record.
    pub duplicates: usize,
}

/// Incremental merger; [`merge`] is the one-shot form.
#[derive(Debug, Default)]
pub struct Merger {
    combined: ResultSet,
    seen: HashMap<String, HashSet<IdentityKey>>,
}

impl Merger {
    /// Create an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the next result set. Sets must be added in priority order.
    pub fn add(&mut self, set: ResultSet) -> MergeStats {
        let mut stats = MergeStats::default();
        for (model_id, records) in set {
            let seen = self.seen.entry(model_id.clone()).or_default();
            let merged = self.combined.records_mut(model_id);
            for record in records {
                if seen.insert(record.identity_key()) {
                    merged.push(record);
                    stats.added += 1;
                } else {
                    stats.duplicates += 1;
                }
            }
        }
        stats
    }

    /// The merged result set.
    pub fn finish(self) -> ResultSet {
        self.combined
    }
}

/// Merge result sets, deduplicating each model's records.
///
/// Output order is order of first appearance across the whole sequence:
/// every record of the first set precedes the new records of the second.
///
/// ```rust
/// use c3pa_core::{PredictionRecord, ResultSet};
/// use c3pa_eval::eval::merge::merge;
///
/// let mut a = ResultSet::new();
/// a.insert("m1", vec![PredictionRecord::new("p1", "s1", "X", "X")]);
/// let mut b = ResultSet::new();
/// b.insert("m1", vec![
///     PredictionRecord::new("p1", "s1", "X", "X"),
///     PredictionRecord::new("p1", "s2", "Y", "X"),
/// ]);
///
/// let merged = merge([a, b]);
/// assert_eq!(merged.get("m1").unwrap().len(), 2);
/// ```
pub fn merge<I>(sets: I) -> ResultSet
where
    I: IntoIterator<Item = ResultSet>,
{
    let mut merger = Merger::new();
    for set in sets {
        merger.add(set);
    }
    merger.finish()
}

/// Load, merge and optionally write result files.
///
/// # Errors
///
/// Any unreadable or malformed input aborts the whole merge.
pub fn combine_files<P: AsRef<Path>>(inputs: &[P], output: Option<&Path>) -> Result<ResultSet> {
    let mut merger = Merger::new();
    for path in inputs {
        let path = path.as_ref();
        let set = read_result_set(path)?;
        let models = set.len();
        let stats = merger.add(set);
        log::info!(
            "merged {}: {} models, {} new records, {} duplicates",
            path.display(),
            models,
            stats.added,
            stats.duplicates
        );
    }
    let combined = merger.finish();

    if let Some(output) = output {
        write_result_set(output, &combined)?;
        log::info!("wrote combined results to {}", output.display());
    }
    Ok(combined)
}

/// Distinct `policy_id` values per model.
///
/// Records whose `policy_id` is missing or `null` are skipped entirely; they
/// do not add one shared "no id" value to the count.
pub fn count_unique_policies(set: &ResultSet) -> IndexMap<String, usize> {
    set.iter()
        .map(|(model_id, records)| {
            let ids: HashSet<&PolicyId> =
                records.iter().filter_map(|r| r.policy_id.as_ref()).collect();
            (model_id.to_string(), ids.len())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use c3pa_core::PredictionRecord;

    fn set(model: &str, records: Vec<PredictionRecord>) -> ResultSet {
        let mut s = ResultSet::new();
        s.insert(model, records);
        s
    }

    #[test]
    fn test_duplicate_across_files_dropped() {
        let a = set("m1", vec![PredictionRecord::new("p1", "s1", "X", "X")]);
        let b = set(
            "m1",
            vec![
                PredictionRecord::new("p1", "s1", "X", "X"),
                PredictionRecord::new("p1", "s2", "Y", "X"),
            ],
        );
        let merged = merge([a, b]);
        let records = merged.get("m1").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].span_str(), Some("s2"));
    }

    #[test]
    fn test_first_seen_wins_whole_record() {
        let a = set(
            "m1",
            vec![PredictionRecord::new("p1", "s1", "X", "X").with_extra("run", 1)],
        );
        let b = set(
            "m1",
            vec![PredictionRecord::new("p1", "s1", "X", "X").with_extra("run", 2)],
        );
        let merged = merge([a, b]);
        assert_eq!(merged.get("m1").unwrap()[0].extra["run"], 1);
    }

    #[test]
    fn test_duplicates_within_one_file() {
        let a = set(
            "m1",
            vec![
                PredictionRecord::new("p1", "s1", "X", "X"),
                PredictionRecord::new("p1", "s1", "X", "X"),
                PredictionRecord::new("p1", "s1", "X", "Y"),
            ],
        );
        assert_eq!(merge([a]).get("m1").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_fields_are_a_concrete_value() {
        let no_gold = |pred: &str| PredictionRecord {
            gold: None,
            ..PredictionRecord::new("p1", "s1", "unused", pred)
        };
        let a = set("m1", vec![no_gold("X"), no_gold("X"), no_gold("Y")]);
        let merged = merge([a]);
        let records = merged.get("m1").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.gold.is_none()));
    }

    #[test]
    fn test_untyped_values_merge_by_natural_identity() {
        let a: ResultSet = serde_json::from_str(
            r#"{"m1": [{"policy_id": 1.5, "span": "s", "gold": "X", "pred": 7},
                       {"policy_id": 18446744073709551615, "span": "s", "gold": "X", "pred": "X"}]}"#,
        )
        .unwrap();
        let b: ResultSet = serde_json::from_str(
            r#"{"m1": [{"policy_id": 1.5, "span": "s", "gold": "X", "pred": 7},
                       {"policy_id": 1.5, "span": "s", "gold": "X", "pred": "7"}]}"#,
        )
        .unwrap();
        let merged = merge([a, b]);
        assert_eq!(merged.get("m1").unwrap().len(), 3);
        assert_eq!(count_unique_policies(&merged)["m1"], 2);
    }

    #[test]
    fn test_models_are_merged_independently() {
        let mut a = ResultSet::new();
        a.insert("m1", vec![PredictionRecord::new("p1", "s1", "X", "X")]);
        a.insert("m2", vec![PredictionRecord::new("p1", "s1", "X", "X")]);
        let b = set("m3", vec![PredictionRecord::new("p1", "s1", "X", "X")]);
        let merged = merge([a, b]);
        assert_eq!(merged.model_ids().collect::<Vec<_>>(), vec!["m1", "m2", "m3"]);
        assert_eq!(merged.total_records(), 3);
    }

    #[test]
    fn test_merger_stats() {
        let mut merger = Merger::new();
        let first = merger.add(set("m1", vec![PredictionRecord::new("p1", "s1", "X", "X")]));
        let second = merger.add(set(
            "m1",
            vec![
                PredictionRecord::new("p1", "s1", "X", "X"),
                PredictionRecord::new("p2", "s1", "X", "X"),
            ],
        ));
        assert_eq!(first, MergeStats { added: 1, duplicates: 0 });
        assert_eq!(second, MergeStats { added: 1, duplicates: 1 });
    }

    #[test]
    fn test_count_unique_policies_skips_missing() {
        let mut no_policy = PredictionRecord::new("x", "s3", "X", "X");
        no_policy.policy_id = None;
        let s = set(
            "m1",
            vec![
                PredictionRecord::new("p1", "s1", "X", "X"),
                PredictionRecord::new("p1", "s2", "X", "X"),
                PredictionRecord::new(7_i64, "s1", "X", "X"),
                no_policy,
            ],
        );
        assert_eq!(count_unique_policies(&s)["m1"], 2);
    }

    #[test]
    fn test_empty_model_list_is_kept() {
        let merged = merge([set("m1", vec![])]);
        assert!(merged.contains_model("m1"));
        assert_eq!(count_unique_policies(&merged)["m1"], 0);
    }
}
