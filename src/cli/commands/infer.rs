//! Infer command - label sampled policy spans with one or more models

use clap::Parser;
use std::path::PathBuf;

use super::super::output::format_error;
use crate::eval::loader::write_result_set;
use crate::infer::client::{missing_env_vars, parse_model_list};
use crate::infer::dataset::{sample_policies, DEFAULT_N_POLICIES, DEFAULT_SEED};
use crate::infer::runner::InferenceOptions;
use c3pa_core::LabelTaxonomy;

/// Run models over sampled policy dumps and save their predictions
#[derive(Parser, Debug)]
pub struct InferArgs {
    /// Comma-separated model ids, e.g. openai:gpt-4.1-mini,gemini:gemini-2.0-flash
    #[arg(long, default_value = "openai:gpt-4.1-mini")]
    pub models: String,

    /// Directory of per-policy context dumps (*.json)
    #[arg(long, env = "C3PA_POLICIES_DIR", value_name = "DIR")]
    pub policies_dir: PathBuf,

    /// Number of policies to sample
    #[arg(long, alias = "n_policies", default_value_t = DEFAULT_N_POLICIES)]
    pub n_policies: usize,

    /// Sampling seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Where to save all models' results
    #[arg(long, default_value = "all_results.json", value_name = "PATH")]
    pub output: PathBuf,

    /// Intermediate dump rewritten as each model finishes
    #[arg(long, default_value = "dump_all.json", value_name = "PATH")]
    pub dump: PathBuf,

    /// Map answers onto canonical label spelling (case, quotes, emphasis)
    #[arg(long)]
    pub normalize_labels: bool,
}

/// Run the infer command.
pub fn run(args: InferArgs) -> Result<(), String> {
    for var in missing_env_vars() {
        log::warn!("Environment variable {} is not set.", var);
    }

    let model_ids = parse_model_list(&args.models).map_err(|e| e.to_string())?;
    if model_ids.is_empty() {
        return Err("no models given".to_string());
    }
    log::info!(
        "Models to evaluate: {}",
        model_ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );

    let taxonomy = LabelTaxonomy::c3pa();
    let policies = sample_policies(&args.policies_dir, args.n_policies, args.seed)
        .map_err(|e| format_error("Failed to load policies", e))?;
    let options = InferenceOptions::default()
        .with_normalized_labels(args.normalize_labels)
        .with_dump(&args.dump);

    let results = run_models(model_ids, &policies, &taxonomy, &options)?;
    write_result_set(&args.output, &results).map_err(|e| e.to_string())?;
    println!(
        "Saved results for {} models to {}",
        results.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(feature = "network")]
fn run_models(
    model_ids: Vec<crate::infer::client::ModelId>,
    policies: &[crate::infer::dataset::AnnotatedPolicy],
    taxonomy: &LabelTaxonomy,
    options: &InferenceOptions,
) -> Result<c3pa_core::ResultSet, String> {
    use crate::infer::client::ChatClient;
    use crate::infer::runner::run_inference;

    let mut clients = Vec::with_capacity(model_ids.len());
    for id in model_ids {
        match ChatClient::new(id.clone()) {
            Ok(client) => clients.push(client),
            Err(e) => log::error!("[{}] skipped: {}", id, e),
        }
    }
    if clients.is_empty() {
        return Err("no model could be configured".to_string());
    }
    run_inference(&clients, policies, taxonomy, options).map_err(|e| e.to_string())
}

#[cfg(not(feature = "network"))]
fn run_models(
    _model_ids: Vec<crate::infer::client::ModelId>,
    _policies: &[crate::infer::dataset::AnnotatedPolicy],
    _taxonomy: &LabelTaxonomy,
    _options: &InferenceOptions,
) -> Result<c3pa_core::ResultSet, String> {
    Err("Inference requires the 'network' feature. Enable with: cargo build --features network"
        .to_string())
}
