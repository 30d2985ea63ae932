//! End-to-end tests over result files on disk: merge, filter, score, report.

use c3pa_eval::eval::filter::filter_result_set;
use c3pa_eval::eval::loader::{read_result_set, write_result_set};
use c3pa_eval::eval::merge::{combine_files, count_unique_policies};
use c3pa_eval::eval::metrics::{compute_distribution, evaluate, evaluate_to_file};
use c3pa_eval::eval::report::{render_delta, render_report};
use c3pa_eval::infer::{run_inference, sample_policies, InferenceOptions, MockClassifier};
use c3pa_eval::{Error, LabelTaxonomy, ResultSet, C3PA_LABELS};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_merge_drops_cross_file_duplicate() {
    let dir = TempDir::new().unwrap();
    let a = write(
        dir.path(),
        "a.json",
        r#"{"m1":[{"policy_id":"p1","span":"s1","gold":"X","pred":"X"}]}"#,
    );
    let b = write(
        dir.path(),
        "b.json",
        r#"{"m1":[{"policy_id":"p1","span":"s1","gold":"X","pred":"X"},
                  {"policy_id":"p1","span":"s2","gold":"Y","pred":"X"}]}"#,
    );
    let out = dir.path().join("combined.json");

    let combined = combine_files(&[&a, &b], Some(out.as_path())).unwrap();
    assert_eq!(combined.get("m1").unwrap().len(), 2);
    assert_eq!(count_unique_policies(&combined)["m1"], 1);
    assert_eq!(read_result_set(&out).unwrap(), combined);
}

#[test]
fn test_merge_aborts_on_malformed_input() {
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "good.json", r#"{"m1": []}"#);
    let bad = write(dir.path(), "bad.json", r#"["not", "a", "mapping"]"#);
    let out = dir.path().join("combined.json");
    let err = combine_files(&[&good, &bad], Some(out.as_path())).unwrap_err();
    assert!(matches!(err, Error::Json { .. }));
    assert!(!out.exists());
}

#[test]
fn test_reduced_taxonomy_scores() {
    let dir = TempDir::new().unwrap();
    let input = write(
        dir.path(),
        "run.json",
        r#"{"m1":[{"policy_id":"p1","span":"a","gold":"X","pred":"X"},
                  {"policy_id":"p1","span":"b","gold":"Y","pred":"X"},
                  {"policy_id":"p1","span":"c","gold":"X","pred":"X"}]}"#,
    );
    let taxonomy = LabelTaxonomy::new(["X", "Y"]).unwrap();
    let metrics_path = dir.path().join("metrics.json");
    let metrics =
        evaluate_to_file(&read_result_set(&input).unwrap(), &taxonomy, Some(metrics_path.as_path()))
            .unwrap();

    let x = metrics["m1"].get("X");
    assert!((x.precision - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(x.recall, 1.0);
    let y = metrics["m1"].get("Y");
    assert_eq!((y.precision, y.recall, y.support), (0.0, 0.0, 1));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&metrics_path).unwrap()).unwrap();
    let keys: Vec<_> = json["m1"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["X", "Y", "macro avg"]);
}

#[test]
fn test_trailing_space_conflict_depends_on_threshold() {
    let json = r#"{"m1":[{"policy_id":"p1","span":"The quick brown fox","gold":"A","pred":"A"},
                         {"policy_id":"p1","span":"The quick brown fox ","gold":"B","pred":"A"}]}"#;
    let set: ResultSet = serde_json::from_str(json).unwrap();

    let (strict, summary) = filter_result_set(&set, 0.75);
    assert!(strict.get("m1").unwrap().is_empty());
    assert_eq!(summary.total_dropped(), 2);

    let (lenient, _) = filter_result_set(&set, 0.99);
    assert_eq!(lenient.get("m1").unwrap().len(), 2);
}

#[test]
fn test_passthrough_fields_survive_merge_and_filter() {
    let dir = TempDir::new().unwrap();
    let input = write(
        dir.path(),
        "run.json",
        r#"{"m1":[{"policy_id":3,"span":"Wir löschen Daten","gold":"X","pred":"Y","latency_ms":812,"raw":{"id":"abc"}}]}"#,
    );
    let combined = combine_files(&[&input], None).unwrap();
    let (filtered, _) = filter_result_set(&combined, 0.75);
    let out = dir.path().join("filtered.json");
    write_result_set(&out, &filtered).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("Wir löschen Daten"));
    assert!(written.contains("\"latency_ms\": 812"));
    assert!(written.contains("\"policy_id\": 3"));
}

#[test]
fn test_full_taxonomy_report_has_every_label() {
    let json = r#"{"m1":[{"policy_id":"p1","span":"s","gold":"Updated Privacy Policy","pred":"Updated Privacy Policy"}]}"#;
    let set: ResultSet = serde_json::from_str(json).unwrap();
    let taxonomy = LabelTaxonomy::c3pa();
    let metrics = evaluate(&set, &taxonomy).unwrap();
    assert_eq!(metrics["m1"].len(), 13);

    let dist = compute_distribution(set.get("m1").unwrap(), &taxonomy);
    let report = render_report(&metrics, &dist, &taxonomy);
    for label in C3PA_LABELS {
        assert_eq!(report.matches(&format!("{:<50}", label)).count(), 2, "{}", label);
    }
    assert!(report.contains(&format!("{:<50}     100     100     100", "Updated Privacy Policy")));

    let delta = render_delta(&metrics, &metrics, &taxonomy);
    assert_eq!(delta.matches("     0.0     0.0     0.0\n").count(), 13);
}

#[test]
fn test_missing_gold_fails_evaluation() {
    let json = r#"{"m1":[{"policy_id":"p1","span":"s","pred":"X"}]}"#;
    let set: ResultSet = serde_json::from_str(json).unwrap();
    let err = evaluate(&set, &LabelTaxonomy::c3pa()).unwrap_err();
    assert!(err.to_string().contains("Missing field `gold`"));
}

#[test]
fn test_inference_output_feeds_evaluation() {
    let dir = TempDir::new().unwrap();
    for id in 1..=3 {
        let dump = serde_json::json!({
            "policy_id": id,
            "text": "",
            "annotations": [
                {"Text": "You may ask us to delete your data.", "Label": "Description of Right to Delete", "Context": ""},
                {"Text": "Last updated: May 2024.", "Label": "Updated Privacy Policy", "Context": "Privacy Policy."}
            ]
        });
        fs::write(dir.path().join(format!("{}.json", id)), dump.to_string()).unwrap();
    }

    let policies = sample_policies(dir.path(), 2, 12).unwrap();
    let models = vec![
        MockClassifier::new("mock:always-delete", "Description of Right to Delete"),
        MockClassifier::new("mock:keyword", "Methods to exercise rights")
            .with_rule("updated", "updated privacy policy")
            .with_rule("delete", "Description of Right to Delete"),
    ];
    let taxonomy = LabelTaxonomy::c3pa();
    let options = InferenceOptions::default().with_normalized_labels(true);
    let results = run_inference(&models, &policies, &taxonomy, &options).unwrap();
    assert_eq!(results.total_records(), 8);

    let metrics = evaluate(&results, &taxonomy).unwrap();
    assert_eq!(metrics["mock:keyword"].get("Updated Privacy Policy").f1, 1.0);
    assert_eq!(metrics["mock:always-delete"].get("Description of Right to Delete").precision, 0.5);
}
