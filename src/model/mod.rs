// ============================================================
// Model Layer — Collapsed Gibbs Sampling
// ============================================================
// All of the sampling machinery lives here; no other layer
// touches a count table directly.
//
//   params.rs     — Dirichlet priors, validated at construction
//
//   counts.rs     — the mutable state of a run: nd/nw/nwsum
//                   count tables, per-token assignments z,
//                   random initialization
//
//   sampler.rs    — the per-token Gibbs update: remove,
//                   resample from the collapsed conditional,
//                   re-insert
//
//   estimator.rs  — the single-threaded training loop with
//                   convergence diagnostics and persistence
//
//   inferencer.rs — the parallel inference loop: statically
//                   partitioned documents, fork-join sweeps
//                   against a frozen phi
//
//   projector.rs  — counts → normalized phi/theta, with the
//                   running average used by inference
//
//   evaluate.rs   — log-likelihood and held-out perplexity

/// Dirichlet priors
pub mod params;

/// Count tables and topic assignments
pub mod counts;

/// The per-token Gibbs update
pub mod sampler;

/// Single-threaded training loop
pub mod estimator;

/// Parallel inference loop
pub mod inferencer;

/// Counts → probability tables
pub mod projector;

/// Likelihood-based scoring
pub mod evaluate;
