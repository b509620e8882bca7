// ============================================================
// Model Error Taxonomy
// ============================================================
// Typed errors for the sampling core. I/O errors stay as
// anyhow errors with context at the application boundary;
// these variants cover the failures the model itself can
// produce and that callers must be able to match on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LdaError {
    /// Rejected at model construction: dimensions or priors
    /// that make the conditional distribution meaningless.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The cumulative sampling distribution for a token summed to
    /// zero or a non-finite value. Fatal: continuing would assign
    /// topics from garbage.
    #[error(
        "numeric degeneracy sampling document {doc}, token {token}: \
         cumulative mass {mass}"
    )]
    NumericDegeneracy { doc: usize, token: usize, mass: f64 },

    /// A worker failed during a parallel inference sweep.
    /// Fatal to the current run; never swallowed.
    #[error("inference worker failed: {0}")]
    Worker(String),
}
