// ============================================================
// Model — Parallel Inferencer
// ============================================================
// Applies a pretrained phi to new documents, estimating theta
// only. The document index range [0, M) is cut into `threads`
// contiguous near-equal chunks (ceil-division, the final chunk
// absorbs the remainder), and nd and z are chunked identically,
// so every worker owns exclusive mutable slices of exactly the
// rows in its partition. The non-overlap precondition is the
// partition scheme itself — there is no per-cell locking, and
// nothing to lock: phi is frozen and nd rows never cross
// partition boundaries.
//
// Each outer iteration is one fork-join barrier: all workers
// sweep their partitions, the orchestrator blocks until every
// one finishes, and no task outlives its iteration. The first
// worker error (numeric degeneracy, deadline) cancels the
// remaining workers and aborts the run.
//
// Worker RNGs are seeded from (base seed, iteration, worker
// index), so a run is reproducible for a fixed seed and thread
// count regardless of how the OS schedules the pool.

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::application::infer_use_case::InferConfig;
use crate::domain::corpus::Corpus;
use crate::error::LdaError;
use crate::infra::{matrix_store, reports};
use crate::model::counts::{CountStore, Mode};
use crate::model::evaluate;
use crate::model::params::Hyperparameters;
use crate::model::projector::Projector;
use crate::model::sampler::GibbsSampler;

/// What a finished inference run reports back.
#[derive(Debug)]
pub struct InferSummary {
    /// Last held-out perplexity, when tracking was enabled
    pub perplexity: Option<f64>,
    /// Report files that could not be written (surfaced, not fatal)
    pub report_errors: Vec<String>,
}

pub struct ParallelInferencer<'a> {
    cfg:       &'a InferConfig,
    corpus:    &'a Corpus,
    hyper:     Hyperparameters,
    counts:    CountStore,
    projector: Projector,
    pool:      rayon::ThreadPool,
    base_seed: u64,
}

impl<'a> ParallelInferencer<'a> {
    pub fn new(
        cfg: &'a InferConfig,
        corpus: &'a Corpus,
        hyper: Hyperparameters,
        phi: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if corpus.num_docs() == 0 {
            return Err(LdaError::Config("corpus has no documents".into()).into());
        }
        if cfg.threads == 0 {
            return Err(LdaError::Config("thread count must be positive".into()).into());
        }
        if cfg.sampling_lag == 0 {
            return Err(LdaError::Config("sampling lag must be positive".into()).into());
        }
        let k = hyper.num_topics();
        if phi.len() != k || phi.iter().any(|row| row.len() != corpus.vocab_size()) {
            return Err(LdaError::Config(format!(
                "phi dimensions do not match K={k}, V={}",
                corpus.vocab_size()
            ))
            .into());
        }

        // The worker pool is sized once here and reused every iteration.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.threads)
            .build()
            .map_err(|e| LdaError::Worker(e.to_string()))?;

        let base_seed = cfg.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Ok(Self {
            cfg,
            corpus,
            counts: CountStore::new(corpus, k, Mode::Inference { holdout: cfg.perplexity }),
            projector: Projector::with_pretrained_phi(phi, corpus.num_docs()),
            hyper,
            pool,
            base_seed,
        })
    }

    /// Run the inference loop. With `persist` set, theta and the
    /// bipartitions report are written to the model directory.
    pub fn infer(&mut self, persist: bool) -> Result<InferSummary> {
        let niters = self.cfg.iterations;
        tracing::info!(
            "Inference: {niters} iterations over {} documents, {} threads",
            self.corpus.num_docs(),
            self.cfg.threads
        );

        let mut rng = SmallRng::seed_from_u64(self.base_seed);
        self.counts.initialize(self.corpus, &mut rng);
        debug_assert!(self.counts.invariants_hold(self.corpus));

        let mut last_perplexity = None;
        for i in 1..=niters {
            self.parallel_sweep(i)?;

            if i > self.cfg.burnin && i % self.cfg.sampling_lag == 0 {
                self.projector.project_theta(&self.counts, &self.hyper, true);
                if self.cfg.perplexity {
                    let ppx = evaluate::perplexity(
                        self.corpus,
                        &self.projector.phi,
                        &self.projector.theta,
                    );
                    tracing::info!("iteration {i}: perplexity = {ppx}");
                    last_perplexity = Some(ppx);
                }
            }
        }

        // Final non-averaged snapshot from the final counts.
        self.projector.project_theta(&self.counts, &self.hyper, false);
        if self.cfg.perplexity {
            let ppx =
                evaluate::perplexity(self.corpus, &self.projector.phi, &self.projector.theta);
            tracing::info!("final perplexity = {ppx}");
            last_perplexity = Some(ppx);
        }

        let report_errors = if persist { self.save()? } else { Vec::new() };
        Ok(InferSummary { perplexity: last_perplexity, report_errors })
    }

    /// One fork-join sweep: every worker samples its own document
    /// partition against the shared frozen phi.
    fn parallel_sweep(&mut self, iteration: usize) -> Result<(), LdaError> {
        let m = self.corpus.num_docs();
        let chunk = chunk_size(m, self.cfg.threads);
        let docs = self.corpus.docs();
        let phi = &self.projector.phi;
        let alpha = &self.hyper.alpha;
        let k_topics = self.hyper.num_topics();
        let seeded = &self.counts.seeded_len;
        let nd = &mut self.counts.nd;
        let z = &mut self.counts.z;
        let base_seed = self.base_seed;

        let deadline = self
            .cfg
            .iteration_deadline_secs
            .map(|secs| Instant::now() + Duration::from_secs_f64(secs));
        let cancelled = AtomicBool::new(false);

        self.pool.install(|| {
            nd.par_chunks_mut(chunk)
                .zip(z.par_chunks_mut(chunk))
                .enumerate()
                .try_for_each(|(worker, (nd_part, z_part))| {
                    let first = worker * chunk;
                    let mut rng =
                        SmallRng::seed_from_u64(worker_seed(base_seed, iteration, worker));
                    let mut sampler = GibbsSampler::new(k_topics);

                    for (offset, (nd_row, z_row)) in
                        nd_part.iter_mut().zip(z_part.iter_mut()).enumerate()
                    {
                        if cancelled.load(Ordering::Relaxed) {
                            return Err(LdaError::Worker(format!(
                                "worker {worker} cancelled during iteration {iteration}"
                            )));
                        }
                        if let Some(deadline) = deadline {
                            if Instant::now() >= deadline {
                                cancelled.store(true, Ordering::Relaxed);
                                return Err(LdaError::Worker(format!(
                                    "iteration {iteration} exceeded its deadline"
                                )));
                            }
                        }
                        let d = first + offset;
                        sampler
                            .sweep_inference(
                                d, &docs[d], seeded[d], nd_row, z_row, phi, alpha, &mut rng,
                            )
                            .map_err(|e| {
                                cancelled.store(true, Ordering::Relaxed);
                                e
                            })?;
                    }
                    Ok(())
                })
        })
    }

    /// Persist theta (fatal on failure) and the bipartitions report
    /// (surfaced on failure).
    fn save(&self) -> Result<Vec<String>> {
        let dir = Path::new(&self.cfg.model_dir);
        let name = &self.cfg.output_name;

        matrix_store::save_matrix(&dir.join(format!("theta.{name}")), &self.projector.theta)?;

        let mut report_errors = Vec::new();
        if let Err(e) = reports::write_bipartitions(
            &dir.join(format!("bipartitions.{name}")),
            self.corpus,
            &self.projector.theta,
            self.cfg.top_topics,
        ) {
            tracing::error!("bipartitions report failed: {e:#}");
            report_errors.push(format!("{e:#}"));
        }
        Ok(report_errors)
    }

    #[cfg(test)]
    pub(crate) fn counts(&self) -> &CountStore {
        &self.counts
    }

    #[cfg(test)]
    pub(crate) fn theta(&self) -> &[Vec<f64>] {
        &self.projector.theta
    }
}

/// Ceil-division chunk size: `threads` contiguous near-equal slices,
/// the last one absorbing the remainder.
pub(crate) fn chunk_size(m: usize, threads: usize) -> usize {
    (m + threads - 1) / threads.max(1)
}

/// Deterministic per-worker seed for one iteration.
fn worker_seed(base: u64, iteration: usize, worker: usize) -> u64 {
    base.wrapping_mul((iteration as u64).wrapping_add(1))
        .wrapping_add((worker as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Document;

    fn uniform_phi(k: usize, v: usize) -> Vec<Vec<f64>> {
        vec![vec![1.0 / v as f64; v]; k]
    }

    fn corpus(num_docs: usize, v: usize) -> Corpus {
        let docs = (0..num_docs)
            .map(|d| Document::new(format!("doc{d}"), vec![d % v, (d + 1) % v]))
            .collect();
        Corpus::new(docs, v)
    }

    fn config(threads: usize) -> InferConfig {
        InferConfig {
            corpus_path:  String::new(),
            model_dir:    String::new(),
            model_name:   "model".into(),
            output_name:  "inference".into(),
            iterations:   6,
            burnin:       2,
            sampling_lag: 2,
            threads,
            perplexity:   false,
            top_topics:   5,
            iteration_deadline_secs: None,
            seed:         Some(99),
        }
    }

    #[test]
    fn test_partition_covers_every_document_exactly_once() {
        // The sweep slices [0, M) with par_chunks_mut(chunk_size);
        // replaying that slicing must visit each index exactly once.
        for (m, threads) in [(100, 4), (10, 3), (9, 4), (3, 8), (1, 1), (100, 7)] {
            let chunk = chunk_size(m, threads);
            let mut visits = vec![0usize; m];
            let indices: Vec<usize> = (0..m).collect();
            let slices: Vec<&[usize]> = indices.chunks(chunk).collect();
            assert!(slices.len() <= threads);
            for (worker, slice) in slices.iter().enumerate() {
                for (offset, &d) in slice.iter().enumerate() {
                    assert_eq!(d, worker * chunk + offset);
                    visits[d] += 1;
                }
            }
            assert!(visits.iter().all(|&n| n == 1), "m={m} threads={threads}");
        }
    }

    #[test]
    fn test_inference_preserves_nd_row_sums() {
        let corpus = corpus(100, 4);
        let cfg = config(4);
        let hyper = Hyperparameters::symmetric(2, 4, 0.5, 0.1).unwrap();
        let mut inf = ParallelInferencer::new(&cfg, &corpus, hyper, uniform_phi(2, 4)).unwrap();
        inf.infer(false).unwrap();
        assert!(inf.counts().invariants_hold(&corpus));
        for row in inf.theta() {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_inference_is_deterministic_for_fixed_seed_and_threads() {
        let corpus = corpus(40, 4);
        let cfg = config(4);
        let hyper = || Hyperparameters::symmetric(2, 4, 0.5, 0.1).unwrap();

        let mut a = ParallelInferencer::new(&cfg, &corpus, hyper(), uniform_phi(2, 4)).unwrap();
        a.infer(false).unwrap();
        let mut b = ParallelInferencer::new(&cfg, &corpus, hyper(), uniform_phi(2, 4)).unwrap();
        b.infer(false).unwrap();

        assert_eq!(a.counts().z, b.counts().z);
        assert_eq!(a.theta(), b.theta());
    }

    #[test]
    fn test_degenerate_phi_aborts_the_run() {
        let corpus = corpus(10, 4);
        let cfg = config(2);
        let hyper = Hyperparameters::symmetric(2, 4, 0.5, 0.1).unwrap();
        // All-zero phi: every worker's first token draw degenerates.
        let phi = vec![vec![0.0; 4]; 2];
        let mut inf = ParallelInferencer::new(&cfg, &corpus, hyper, phi).unwrap();
        let err = inf.infer(false).unwrap_err();
        assert!(err.downcast_ref::<LdaError>().is_some());
    }

    #[test]
    fn test_expired_deadline_cancels_workers() {
        let corpus = corpus(50, 4);
        let mut cfg = config(4);
        cfg.iteration_deadline_secs = Some(0.0);
        let hyper = Hyperparameters::symmetric(2, 4, 0.5, 0.1).unwrap();
        let mut inf = ParallelInferencer::new(&cfg, &corpus, hyper, uniform_phi(2, 4)).unwrap();
        let err = inf.infer(false).unwrap_err();
        let lda = err.downcast_ref::<LdaError>().unwrap();
        assert!(matches!(lda, LdaError::Worker(_)));
    }

    #[test]
    fn test_perplexity_tracking_reports_a_value() {
        let corpus = corpus(20, 4);
        let mut cfg = config(2);
        cfg.perplexity = true;
        let hyper = Hyperparameters::symmetric(2, 4, 0.5, 0.1).unwrap();
        let mut inf = ParallelInferencer::new(&cfg, &corpus, hyper, uniform_phi(2, 4)).unwrap();
        let summary = inf.infer(false).unwrap();
        // Uniform phi gives every held-out token probability 1/V.
        let ppx = summary.perplexity.unwrap();
        assert!((ppx - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_mismatched_phi() {
        let corpus = corpus(5, 4);
        let cfg = config(1);
        let hyper = Hyperparameters::symmetric(2, 4, 0.5, 0.1).unwrap();
        assert!(ParallelInferencer::new(&cfg, &corpus, hyper, uniform_phi(3, 4)).is_err());
    }

    #[test]
    fn test_rejects_zero_threads() {
        let corpus = corpus(5, 4);
        let mut cfg = config(1);
        cfg.threads = 0;
        let hyper = Hyperparameters::symmetric(2, 4, 0.5, 0.1).unwrap();
        assert!(ParallelInferencer::new(&cfg, &corpus, hyper, uniform_phi(2, 4)).is_err());
    }
}
