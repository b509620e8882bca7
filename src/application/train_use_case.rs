// ============================================================
// Application — Train Use Case
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the corpus file        (data)
//   Step 2: Build the vocabulary        (data)
//   Step 3: Encode documents to ids     (data)
//   Step 4: Save wordmap + config       (infra)
//   Step 5: Run the Gibbs estimator     (model)
//
// The config is serialized to JSON next to the model so an
// inference run can rebuild K, alpha, and beta without the
// user restating them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::loader::load_corpus_file;
use crate::data::vocabulary::Vocabulary;
use crate::domain::corpus::Corpus;
use crate::model::estimator::Estimator;

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a training run needs; serializable so inference can
// reload the model-defining parts from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_path: String,
    pub output_dir:  String,
    pub model_name:  String,
    pub topics:      usize,
    pub alpha:       f64,
    pub beta:        f64,
    pub iterations:  usize,
    pub top_words:   usize,
    pub diagnostics: bool,
    pub seed:        Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_path: "data/corpus.txt".to_string(),
            output_dir:  "model".to_string(),
            model_name:  "model".to_string(),
            topics:      50,
            alpha:       0.5,
            beta:        0.1,
            iterations:  1000,
            top_words:   10,
            diagnostics: false,
            seed:        None,
        }
    }
}

impl TrainConfig {
    pub fn config_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.json"))
    }

    pub fn wordmap_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("wordmap.{name}"))
    }

    /// Write this config as pretty JSON into the output directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::config_path(dir, &self.model_name);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))
    }

    /// Reload a config saved by `save`. Called by the inference side.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = Self::config_path(dir, name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Has this model been trained?",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let out_dir = Path::new(&cfg.output_dir);

        // ── Step 1: Load the corpus ───────────────────────────────────────────
        tracing::info!("Loading corpus from '{}'", cfg.corpus_path);
        let raw_docs = load_corpus_file(Path::new(&cfg.corpus_path))?;

        // ── Step 2: Build the vocabulary ──────────────────────────────────────
        let vocab = Vocabulary::build(&raw_docs);
        tracing::info!(
            "Vocabulary: {} words over {} documents",
            vocab.len(),
            raw_docs.len()
        );

        // ── Step 3: Encode documents into word ids ───────────────────────────
        // The vocabulary was built from these documents, so nothing drops.
        let (docs, _dropped) = vocab.encode(&raw_docs);
        let corpus = Corpus::new(docs, vocab.len());

        // ── Step 4: Persist wordmap and config ────────────────────────────────
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Cannot create output dir '{}'", out_dir.display()))?;
        vocab.save(&TrainConfig::wordmap_path(out_dir, &cfg.model_name))?;
        cfg.save(out_dir)?;

        // ── Step 5: Run the estimator ─────────────────────────────────────────
        let mut estimator = Estimator::new(cfg, &corpus, &vocab)?;
        let summary = estimator.estimate(true)?;

        println!("Training complete. Log-likelihood: {}", summary.log_likelihood);
        for err in &summary.report_errors {
            println!("warning: report not written: {err}");
        }
        Ok(())
    }
}
