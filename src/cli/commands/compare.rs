//! Compare command - score two runs and print the difference

use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::super::output::{format_error, Tee};
use crate::eval::loader::read_result_set;
use crate::eval::metrics::{compute_distribution, evaluate_to_file, LabelDistribution, ModelMetrics};
use crate::eval::report::{render_delta, render_report};
use c3pa_core::{LabelTaxonomy, ResultSet};

/// Score two result files and show per-label changes
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// First (baseline) result file
    #[arg(long, value_name = "PATH")]
    pub input1: PathBuf,

    /// Second result file
    #[arg(long, value_name = "PATH")]
    pub input2: PathBuf,

    /// Save metrics of the first file as JSON
    #[arg(long, value_name = "PATH")]
    pub output1: Option<PathBuf>,

    /// Save metrics of the second file as JSON
    #[arg(long, value_name = "PATH")]
    pub output2: Option<PathBuf>,

    /// Copy of everything printed
    #[arg(long, default_value = "comparsion_log.txt", value_name = "PATH")]
    pub log: PathBuf,
}

/// Run the compare command.
pub fn run(args: CompareArgs) -> Result<(), String> {
    let taxonomy = LabelTaxonomy::c3pa();
    let first = load(&args.input1)?;
    let second = load(&args.input2)?;

    let text = comparison(
        &first,
        &second,
        &taxonomy,
        args.output1.as_deref(),
        args.output2.as_deref(),
    )?;

    let log = File::create(&args.log)
        .map_err(|e| format_error(&format!("Failed to create {}", args.log.display()), e))?;
    let mut out = Tee::new(io::stdout().lock(), log);
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| format_error("Failed to write report", e))
}

fn load(path: &Path) -> Result<ResultSet, String> {
    read_result_set(path).map_err(|e| e.to_string())
}

/// Both reports and the delta, exactly as printed.
///
/// Distributions come from the first model of `first` that `second` also has.
pub fn comparison(
    first: &ResultSet,
    second: &ResultSet,
    taxonomy: &LabelTaxonomy,
    output1: Option<&Path>,
    output2: Option<&Path>,
) -> Result<String, String> {
    let reference = first
        .model_ids()
        .find(|id| second.contains_model(id))
        .ok_or_else(|| "the two result files have no model in common".to_string())?;

    let metrics1 = score(first, taxonomy, output1)?;
    let metrics2 = score(second, taxonomy, output2)?;

    let mut text = String::from("=== FILE 1 REPORT ===\n");
    text.push_str(&render_report(&metrics1, &distribution(first, reference, taxonomy), taxonomy));
    text.push_str("=== FILE 2 REPORT ===\n");
    text.push_str(&render_report(&metrics2, &distribution(second, reference, taxonomy), taxonomy));
    text.push_str(&render_delta(&metrics1, &metrics2, taxonomy));
    Ok(text)
}

fn score(set: &ResultSet, taxonomy: &LabelTaxonomy, output: Option<&Path>) -> Result<ModelMetrics, String> {
    evaluate_to_file(set, taxonomy, output).map_err(|e| e.to_string())
}

fn distribution(set: &ResultSet, model_id: &str, taxonomy: &LabelTaxonomy) -> LabelDistribution {
    set.get(model_id)
        .map(|records| compute_distribution(records, taxonomy))
        .unwrap_or_else(|| LabelDistribution::empty(taxonomy))
}
