//! Multi-model inference.
//!
//! One scoped worker thread per model. Workers share nothing mutable: each
//! sends its finished record list back over a channel, tagged with the
//! model's slot, and the calling thread assembles the result set and any
//! intermediate dump.
//!
//! ```text
//! model 0 ──worker──┐
//! model 1 ──worker──┼──(slot, records)──► caller ──► ResultSet (input order)
//! model 2 ──worker──┘                         └────► dump file after each arrival
//! ```

use crate::eval::loader::write_result_set;
use crate::infer::client::Classifier;
use crate::infer::dataset::AnnotatedPolicy;
use crate::infer::prompt::{normalize_label, system_prompt, user_prompt};
use crate::{Error, Result};
use c3pa_core::{LabelTaxonomy, PredictionRecord, ResultSet};
use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::thread;

/// Runner settings.
#[derive(Debug, Clone, Default)]
pub struct InferenceOptions {
    /// Map answers onto canonical label spelling before storing them.
    pub normalize_labels: bool,
    /// Rewritten with all finished models each time a model completes.
    pub dump_path: Option<PathBuf>,
}

impl InferenceOptions {
    /// Enable label normalization.
    #[must_use]
    pub fn with_normalized_labels(mut self, normalize: bool) -> Self {
        self.normalize_labels = normalize;
        self
    }

    /// Write intermediate dumps to `path`.
    #[must_use]
    pub fn with_dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_path = Some(path.into());
        self
    }
}

/// Classify every annotation of `policies` with one model.
///
/// Stops at the first failed classification.
pub fn classify_policies<C: Classifier + ?Sized>(
    model: &C,
    policies: &[AnnotatedPolicy],
    taxonomy: &LabelTaxonomy,
    normalize_labels: bool,
) -> Result<Vec<PredictionRecord>> {
    let system = system_prompt(taxonomy);
    let mut records = Vec::with_capacity(policies.iter().map(AnnotatedPolicy::len).sum());

    for policy in policies {
        for annotation in &policy.annotations {
            let user = user_prompt(&annotation.text, &annotation.context);
            let raw = model.classify(&system, &user)?;
            let pred = if normalize_labels {
                normalize_label(&raw, taxonomy)
            } else {
                raw
            };
            log::debug!(
                "[{}] {}: gold={:?} pred={:?}",
                model.model_id(),
                policy.policy_id,
                annotation.label,
                pred.chars().take(50).collect::<String>()
            );
            records.push(PredictionRecord::new(
                policy.policy_id.clone(),
                annotation.text.clone(),
                annotation.label.clone(),
                pred,
            ));
        }
    }
    Ok(records)
}

/// Run every model over every policy in parallel.
///
/// The result lists models in the order of `models`, whatever order they
/// finish in. A model whose classification fails is logged and left out.
///
/// # Errors
///
/// Fails if no model finished, or an intermediate dump cannot be written.
pub fn run_inference<C: Classifier>(
    models: &[C],
    policies: &[AnnotatedPolicy],
    taxonomy: &LabelTaxonomy,
    options: &InferenceOptions,
) -> Result<ResultSet> {
    if models.is_empty() {
        return Err(Error::invalid_input("no models to run"));
    }
    let spans: usize = policies.iter().map(AnnotatedPolicy::len).sum();
    log::info!(
        "running {} models over {} policies ({} spans)",
        models.len(),
        policies.len(),
        spans
    );

    let mut slots: Vec<Option<Vec<PredictionRecord>>> = vec![None; models.len()];
    let mut failed = Vec::new();

    thread::scope(|scope| -> Result<()> {
        let (tx, rx) = unbounded();
        for (slot, model) in models.iter().enumerate() {
            let tx = tx.clone();
            thread::Builder::new()
                .name(format!("infer-{}", model.model_id()))
                .spawn_scoped(scope, move || {
                    log::info!("[{}] starting", model.model_id());
                    let outcome =
                        classify_policies(model, policies, taxonomy, options.normalize_labels);
                    let _ = tx.send((slot, outcome));
                })
                .map_err(|e| Error::inference(format!("failed to spawn worker: {}", e)))?;
        }
        drop(tx);

        for (slot, outcome) in rx {
            let model_id = models[slot].model_id();
            match outcome {
                Ok(records) => {
                    log::info!("[{}] finished; {} predictions", model_id, records.len());
                    slots[slot] = Some(records);
                    if let Some(path) = &options.dump_path {
                        write_result_set(path, &collect_finished(models, &slots))?;
                    }
                }
                Err(e) => {
                    log::error!("[{}] failed: {}", model_id, e);
                    failed.push(model_id.to_string());
                }
            }
        }
        Ok(())
    })?;

    let results = collect_finished(models, &slots);
    if results.is_empty() {
        return Err(Error::inference(format!(
            "every model failed: {}",
            failed.join(", ")
        )));
    }
    Ok(results)
}

fn collect_finished<C: Classifier>(
    models: &[C],
    slots: &[Option<Vec<PredictionRecord>>],
) -> ResultSet {
    models
        .iter()
        .zip(slots)
        .filter_map(|(model, slot)| {
            slot.as_ref()
                .map(|records| (model.model_id().to_string(), records.clone()))
        })
        .collect()
}
