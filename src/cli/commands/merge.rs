//! Merge command - combine result files from several runs

use clap::Parser;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::super::output::{format_error, print_flush};
use crate::eval::merge::{combine_files, count_unique_policies};
use c3pa_core::ResultSet;

/// Combine result files, deduplicating records per model
#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Result files, in priority order (first copy of a record wins)
    #[arg(long, num_args = 1.., required = true, value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Where to write the combined file
    #[arg(long, default_value = "combined.json", value_name = "PATH")]
    pub output: PathBuf,
}

/// Run the merge command.
pub fn run(args: MergeArgs) -> Result<(), String> {
    let combined = combine_files(&args.inputs, Some(args.output.as_path()))
        .map_err(|e| format_error("merge failed", e))?;
    print_flush(&summary(&combined))
}

/// Per-model record and policy counts, as printed after a merge.
pub fn summary(combined: &ResultSet) -> String {
    let unique = count_unique_policies(combined);
    let mut out =
        String::from("Combined results with deduplication and unique policy_id counts per model:\n");
    for (model_id, records) in combined.iter() {
        let _ = writeln!(
            out,
            "Model: {}\n  Total unique records: {}\n  Unique policy_ids: {}\n{}",
            model_id,
            records.len(),
            unique.get(model_id).copied().unwrap_or(0),
            "-".repeat(40)
        );
    }
    out
}
