//! Evaluate command - score one result file

use clap::Parser;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::super::output::{format_error, format_threshold, print_flush, write_file};
use super::super::parser::parse_threshold;
use crate::eval::filter::{filter_result_set, DEFAULT_THRESHOLD};
use crate::eval::loader::{read_result_set, write_result_set};
use crate::eval::metrics::{compute_distribution, evaluate_to_file, LabelDistribution};
use crate::eval::report::{render_report, render_tsv};
use c3pa_core::{LabelTaxonomy, ResultSet};

/// Score a result file, optionally dropping conflicting near-duplicate spans
#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Result file to score
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Save per-model metrics as JSON
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Similarity ratio (0-1) at which differently labelled spans conflict
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Drop conflicting spans before scoring
    #[arg(long)]
    pub filter: bool,

    /// Directory for the filtered result file (same file name as the input)
    #[arg(long, alias = "filtered_output", value_name = "DIR")]
    pub filtered_output: Option<PathBuf>,

    /// Write a tab-delimited report here instead of printing it
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

/// Run the evaluate command.
pub fn run(args: EvaluateArgs) -> Result<(), String> {
    let taxonomy = LabelTaxonomy::c3pa();
    let mut results = read_result_set(&args.input).map_err(|e| e.to_string())?;

    let mut out = String::new();
    if args.filter {
        let _ = writeln!(
            out,
            "Filtering spans with threshold {}...",
            format_threshold(args.threshold)
        );
        let (filtered, summary) = filter_result_set(&results, args.threshold);
        log::info!("filtering dropped {} records", summary.total_dropped());
        results = filtered;

        if let Some(dir) = &args.filtered_output {
            let path = filtered_path(dir, &args.input)?;
            write_result_set(&path, &results).map_err(|e| e.to_string())?;
            let _ = writeln!(out, "Filtered results saved to {}", dir.display());
        }
    } else {
        out.push_str("Skipping span filtering...\n");
    }

    let dist = first_model_distribution(&results, &taxonomy);
    let metrics = evaluate_to_file(&results, &taxonomy, args.output.as_deref())
        .map_err(|e| e.to_string())?;

    match &args.export {
        Some(path) => {
            write_file(path, &render_tsv(&metrics, &dist, &taxonomy))?;
            let _ = writeln!(out, "Report exported to {}", path.display());
        }
        None => out.push_str(&render_report(&metrics, &dist, &taxonomy)),
    }
    print_flush(&out)
}

/// `{dir}/{file name of input}`.
pub fn filtered_path(dir: &Path, input: &Path) -> Result<PathBuf, String> {
    let name = input.file_name().ok_or_else(|| {
        format_error("Invalid input path", input.display())
    })?;
    Ok(dir.join(name))
}

/// Gold distribution of the first model; all zeros for an empty set.
pub fn first_model_distribution(results: &ResultSet, taxonomy: &LabelTaxonomy) -> LabelDistribution {
    results
        .first()
        .map(|(_, records)| compute_distribution(records, taxonomy))
        .unwrap_or_else(|| LabelDistribution::empty(taxonomy))
}
