// ============================================================
// Application — Infer Use Case
// ============================================================
// Orchestrates inference on new documents:
//
//   Step 1: Reload train config           (infra)
//   Step 2: Reload wordmap + phi          (data/infra)
//   Step 3: Load + encode the new corpus  (data)
//   Step 4: Run the parallel inferencer   (model)
//
// The new corpus is mapped through the *trained* vocabulary;
// words the model has never seen have no phi column and are
// dropped (with a count in the log).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::data::loader::load_corpus_file;
use crate::data::vocabulary::Vocabulary;
use crate::domain::corpus::Corpus;
use crate::infra::matrix_store;
use crate::model::inferencer::ParallelInferencer;
use crate::model::params::Hyperparameters;

// ─── Inference Configuration ─────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferConfig {
    pub corpus_path:  String,
    pub model_dir:    String,
    pub model_name:   String,
    /// Label for this run's theta./bipartitions. output files,
    /// so inference never clobbers the training outputs
    pub output_name:  String,
    pub iterations:   usize,
    pub burnin:       usize,
    pub sampling_lag: usize,
    pub threads:      usize,
    pub perplexity:   bool,
    pub top_topics:   usize,
    /// Optional wall-clock budget for a single sweep, in seconds
    pub iteration_deadline_secs: Option<f64>,
    pub seed:         Option<u64>,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            corpus_path:  "data/new_corpus.txt".to_string(),
            model_dir:    "model".to_string(),
            model_name:   "model".to_string(),
            output_name:  "inference".to_string(),
            iterations:   500,
            burnin:       100,
            sampling_lag: 5,
            threads:      1,
            perplexity:   false,
            top_topics:   10,
            iteration_deadline_secs: None,
            seed:         None,
        }
    }
}

// ─── InferUseCase ─────────────────────────────────────────────────────────────
pub struct InferUseCase {
    config: InferConfig,
}

impl InferUseCase {
    pub fn new(config: InferConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let model_dir = Path::new(&cfg.model_dir);

        // ── Step 1: Reload the training configuration ─────────────────────────
        let train_cfg = TrainConfig::load(model_dir, &cfg.model_name)?;
        tracing::info!(
            "Model '{}': {} topics, alpha={}, beta={}",
            cfg.model_name,
            train_cfg.topics,
            train_cfg.alpha,
            train_cfg.beta
        );

        // ── Step 2: Reload wordmap and phi ────────────────────────────────────
        let vocab = Vocabulary::load(&TrainConfig::wordmap_path(model_dir, &cfg.model_name))?;
        let phi =
            matrix_store::load_matrix(&model_dir.join(format!("{}.phi", cfg.model_name)))?;

        // ── Step 3: Load and encode the new corpus ────────────────────────────
        let raw_docs = load_corpus_file(Path::new(&cfg.corpus_path))?;
        let (docs, dropped) = vocab.encode(&raw_docs);
        if dropped > 0 {
            tracing::warn!("{dropped} tokens not in the trained vocabulary were dropped");
        }
        let corpus = Corpus::new(docs, vocab.len());

        // ── Step 4: Run the parallel inferencer ───────────────────────────────
        let hyper = Hyperparameters::symmetric(
            train_cfg.topics,
            vocab.len(),
            train_cfg.alpha,
            train_cfg.beta,
        )?;
        let mut inferencer = ParallelInferencer::new(cfg, &corpus, hyper, phi)?;
        let summary = inferencer.infer(true)?;

        match summary.perplexity {
            Some(ppx) => println!("Inference complete. Perplexity: {ppx}"),
            None => println!("Inference complete."),
        }
        for err in &summary.report_errors {
            println!("warning: report not written: {err}");
        }
        Ok(())
    }
}
