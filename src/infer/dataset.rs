//! Annotated policy dumps.
//!
//! Each dump is one JSON file per policy, already aligned: every annotation
//! carries its span text, the gold label and the two sentences before it.
//!
//! ```json
//! {
//!   "policy_id": "1042",
//!   "text": "…",
//!   "annotations": [
//!     {"Text": "We do not sell …", "Label": "Categories of Personal Information Sold", "Context": "…"}
//!   ]
//! }
//! ```

use crate::eval::loader::read_json;
use crate::{Error, Result};
use c3pa_core::PolicyId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of policies sampled per run.
pub const DEFAULT_N_POLICIES: usize = 4;
/// Default sampling seed.
pub const DEFAULT_SEED: u64 = 12;

/// One gold annotation within a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotated span text.
    #[serde(rename = "Text")]
    pub text: String,
    /// Gold label.
    #[serde(rename = "Label")]
    pub label: String,
    /// Preceding sentences, possibly empty.
    #[serde(rename = "Context", default)]
    pub context: String,
}

/// A policy and its annotations, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPolicy {
    /// Policy identifier, copied into every prediction.
    pub policy_id: PolicyId,
    /// Visible policy text.
    #[serde(default)]
    pub text: String,
    /// Gold annotations.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl AnnotatedPolicy {
    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the policy has no annotations.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// Load a single policy dump.
pub fn load_policy_dump(path: &Path) -> Result<AnnotatedPolicy> {
    let mut policy: AnnotatedPolicy = read_json(path)?;
    for annotation in &mut policy.annotations {
        let trimmed = annotation.label.trim();
        if trimmed.len() != annotation.label.len() {
            annotation.label = trimmed.to_string();
        }
    }
    Ok(policy)
}

/// `*.json` files directly under `dir`, sorted by file name.
pub fn list_dumps(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::read(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::read(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pick `n` dumps from `dir` with a seeded RNG and load them.
///
/// The same directory contents and seed always give the same policies in
/// the same order.
///
/// # Errors
///
/// Fails if `dir` holds fewer than `n` dumps, or any picked dump is invalid.
pub fn sample_policies(dir: &Path, n: usize, seed: u64) -> Result<Vec<AnnotatedPolicy>> {
    let files = list_dumps(dir)?;
    if files.len() < n {
        return Err(Error::invalid_input(format!(
            "only {} policy dumps available in {}, but {} requested",
            files.len(),
            dir.display(),
            n
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let picked: Vec<&PathBuf> = files.choose_multiple(&mut rng, n).collect();
    log::info!("sampled {} of {} policy dumps (seed {})", n, files.len(), seed);

    picked.into_iter().map(|path| load_policy_dump(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_dump(dir: &Path, id: &str, labels: &[&str]) {
        let annotations: Vec<_> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                serde_json::json!({"Text": format!("span {}", i), "Label": label, "Context": ""})
            })
            .collect();
        let dump = serde_json::json!({"policy_id": id, "text": "", "annotations": annotations});
        fs::write(dir.join(format!("{}.json", id)), dump.to_string()).unwrap();
    }

    #[test]
    fn test_load_policy_dump_trims_labels_and_defaults_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs::write(
            &path,
            r#"{"policy_id": 17, "annotations": [{"Text": "t", "Label": " Updated Privacy Policy "}]}"#,
        )
        .unwrap();
        let policy = load_policy_dump(&path).unwrap();
        assert_eq!(policy.policy_id, PolicyId::Int(17));
        assert_eq!(policy.annotations[0].label, "Updated Privacy Policy");
        assert_eq!(policy.annotations[0].context, "");
    }

    #[test]
    fn test_sample_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        for id in ["a", "b", "c", "d", "e"] {
            write_dump(dir.path(), id, &["X"]);
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let first = sample_policies(dir.path(), 3, 7).unwrap();
        let second = sample_policies(dir.path(), 3, 7).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sample_too_many() {
        let dir = tempfile::tempdir().unwrap();
        write_dump(dir.path(), "a", &["X"]);
        let err = sample_policies(dir.path(), 2, DEFAULT_SEED).unwrap_err();
        assert!(err.to_string().contains("only 1 policy dumps"));
    }

    #[test]
    fn test_list_dumps_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for id in ["b", "a", "c"] {
            write_dump(dir.path(), id, &[]);
        }
        let names: Vec<_> = list_dumps(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
