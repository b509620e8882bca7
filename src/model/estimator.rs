// ============================================================
// Model — Estimator (Training Loop)
// ============================================================
// Runs collapsed Gibbs sampling over the whole corpus,
// single-threaded by design:
//
//   Initializing — random topic seed of all counts
//   Sampling     — niters sweeps over documents 0..M in order
//   Projecting   — final non-averaged phi/theta from the counts
//   Done         — persist results, report log-likelihood
//
// The optional convergence diagnostic compares, per topic, the
// running average of per-token sampling probabilities against
// the normalized document-topic counts; the corpus-wide gap is
// logged every 10 iterations, and the per-topic gaps of
// document 0 are written to a file at checkpoint iterations.
// A failed diagnostic or report write is logged and the run
// continues; a failed phi/theta matrix write fails the run.

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::data::vocabulary::Vocabulary;
use crate::domain::corpus::Corpus;
use crate::error::LdaError;
use crate::infra::{matrix_store, reports};
use crate::model::counts::{CountStore, Mode};
use crate::model::evaluate;
use crate::model::params::Hyperparameters;
use crate::model::projector::{l1_normalize, Projector};
use crate::model::sampler::GibbsSampler;

/// What a finished training run reports back.
#[derive(Debug)]
pub struct TrainSummary {
    pub log_likelihood: f64,
    /// Report files that could not be written (surfaced, not fatal)
    pub report_errors: Vec<String>,
}

pub struct Estimator<'a> {
    cfg:       &'a TrainConfig,
    corpus:    &'a Corpus,
    vocab:     &'a Vocabulary,
    hyper:     Hyperparameters,
    counts:    CountStore,
    projector: Projector,
    sampler:   GibbsSampler,
    rng:       SmallRng,
}

impl<'a> Estimator<'a> {
    pub fn new(cfg: &'a TrainConfig, corpus: &'a Corpus, vocab: &'a Vocabulary) -> Result<Self> {
        if corpus.num_docs() == 0 {
            return Err(LdaError::Config("corpus has no documents".into()).into());
        }
        let hyper =
            Hyperparameters::symmetric(cfg.topics, corpus.vocab_size(), cfg.alpha, cfg.beta)?;
        let rng = match cfg.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Ok(Self {
            cfg,
            corpus,
            vocab,
            counts: CountStore::new(corpus, cfg.topics, Mode::Training),
            projector: Projector::new(corpus.num_docs(), cfg.topics, corpus.vocab_size()),
            sampler: GibbsSampler::new(cfg.topics),
            hyper,
            rng,
        })
    }

    /// Run the full training loop. With `persist` set, results are
    /// written to the configured output directory afterwards.
    pub fn estimate(&mut self, persist: bool) -> Result<TrainSummary> {
        let m = self.corpus.num_docs();
        let niters = self.cfg.iterations;

        // ── Initializing ──────────────────────────────────────────────────────
        self.counts.initialize(self.corpus, &mut self.rng);
        debug_assert!(self.counts.invariants_hold(self.corpus));
        tracing::info!(
            "Sampling {niters} iterations over {m} documents / {} tokens ({} topics)",
            self.corpus.total_tokens(),
            self.cfg.topics
        );

        // ── Sampling ──────────────────────────────────────────────────────────
        for i in 1..=niters {
            for d in 0..m {
                self.sampler.sweep_training(
                    d,
                    self.corpus.doc(d),
                    &mut self.counts,
                    &self.hyper,
                    &mut self.rng,
                )?;
            }
            if i % 50 == 0 {
                tracing::info!("iteration {i}/{niters}");
            }
            if self.cfg.diagnostics && (i % 10 == 0 || i == 55) {
                self.run_diagnostics(i);
            }
        }

        // ── Projecting ────────────────────────────────────────────────────────
        self.projector.project_phi(&self.counts, &self.hyper);
        self.projector.project_theta(&self.counts, &self.hyper, false);

        // ── Done ──────────────────────────────────────────────────────────────
        let ll = evaluate::log_likelihood(self.corpus, &self.projector.phi, &self.projector.theta);
        tracing::info!("log-likelihood: {ll}");

        let report_errors = if persist { self.save()? } else { Vec::new() };
        Ok(TrainSummary { log_likelihood: ll, report_errors })
    }

    /// Persist phi and theta (fatal on failure) plus the two reports
    /// (surfaced on failure). Returns the surfaced report errors.
    fn save(&self) -> Result<Vec<String>> {
        let dir = Path::new(&self.cfg.output_dir);
        let name = &self.cfg.model_name;

        matrix_store::save_matrix(&dir.join(format!("{name}.phi")), &self.projector.phi)?;
        matrix_store::save_matrix(&dir.join(format!("theta.{name}")), &self.projector.theta)?;

        let mut report_errors = Vec::new();
        if let Err(e) = reports::write_bipartitions(
            &dir.join(format!("bipartitions.{name}")),
            self.corpus,
            &self.projector.theta,
            self.cfg.top_words,
        ) {
            tracing::error!("bipartitions report failed: {e:#}");
            report_errors.push(format!("{e:#}"));
        }
        if let Err(e) = reports::write_top_words(
            &dir.join(format!("twords.{name}")),
            self.vocab,
            &self.projector.phi,
            self.cfg.top_words,
        ) {
            tracing::error!("top-words report failed: {e:#}");
            report_errors.push(format!("{e:#}"));
        }
        Ok(report_errors)
    }

    /// Per-topic gap between the normalized running average of the
    /// per-token sampling probabilities of document `d` and the
    /// normalized nd row.
    fn convergence_gaps(&self, d: usize) -> Vec<f64> {
        let k_topics = self.hyper.num_topics();
        let mut p = vec![0.0; k_topics];
        let mut sump = vec![0.0; k_topics];
        for &word in &self.corpus.doc(d).words {
            for k in 0..k_topics {
                p[k] = (self.hyper.alpha[k] + self.counts.nd[d][k])
                    * (self.counts.nw[k][word] + self.hyper.beta)
                    / (self.counts.nwsum[k] + self.hyper.beta_sum);
            }
            l1_normalize(&mut p);
            for (acc, &prob) in sump.iter_mut().zip(p.iter()) {
                *acc += prob;
            }
        }
        let mut ndk = self.counts.nd[d].clone();
        l1_normalize(&mut sump);
        l1_normalize(&mut ndk);
        sump.iter().zip(ndk.iter()).map(|(a, b)| (a - b).abs()).collect()
    }

    fn run_diagnostics(&self, iteration: usize) {
        let m = self.corpus.num_docs();
        let mut total = 0.0;
        let mut doc0 = Vec::new();
        for d in 0..m {
            let gaps = self.convergence_gaps(d);
            total += gaps.iter().sum::<f64>();
            if d == 0 {
                doc0 = gaps;
            }
        }
        tracing::info!(
            "iteration {iteration}: convergence gap {total:.6} (avg {:.6})",
            total / m as f64
        );

        if iteration == 55 || iteration % 200 == 0 {
            let path = Path::new(&self.cfg.output_dir).join(format!("diag_{iteration}.txt"));
            if let Err(e) = reports::write_convergence_snapshot(&path, &doc0) {
                tracing::warn!("diagnostic write failed, continuing: {e:#}");
            }
        }
    }
}
