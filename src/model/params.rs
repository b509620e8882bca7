// ============================================================
// Model — Hyperparameters
// ============================================================
// The Dirichlet priors, validated once at construction and
// immutable afterwards. alpha is a length-K vector (symmetric
// by default — every entry the same configured scalar) so an
// asymmetric prior stays a constructor away; beta is scalar
// with its V-scaled sum precomputed for the sampling kernel.

use crate::error::LdaError;

#[derive(Debug, Clone)]
pub struct Hyperparameters {
    /// Document-topic prior, length K
    pub alpha: Vec<f64>,

    /// Topic-word prior
    pub beta: f64,

    /// beta * V, the denominator constant of the Gibbs conditional
    pub beta_sum: f64,
}

impl Hyperparameters {
    /// Build a symmetric prior for K topics over a V-word vocabulary.
    /// Rejects non-positive dimensions and priors — the conditional
    /// distribution is meaningless for any of them.
    pub fn symmetric(k: usize, v: usize, alpha: f64, beta: f64) -> Result<Self, LdaError> {
        if k == 0 {
            return Err(LdaError::Config("topic count K must be positive".into()));
        }
        if v == 0 {
            return Err(LdaError::Config("vocabulary size V must be positive".into()));
        }
        if !(alpha > 0.0) {
            return Err(LdaError::Config(format!("alpha must be positive, got {alpha}")));
        }
        if !(beta > 0.0) {
            return Err(LdaError::Config(format!("beta must be positive, got {beta}")));
        }
        Ok(Self {
            alpha: vec![alpha; k],
            beta,
            beta_sum: beta * v as f64,
        })
    }

    /// K — number of topics
    pub fn num_topics(&self) -> usize {
        self.alpha.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_fill() {
        let hyper = Hyperparameters::symmetric(4, 10, 0.5, 0.1).unwrap();
        assert_eq!(hyper.alpha, vec![0.5; 4]);
        assert!((hyper.beta_sum - 1.0).abs() < 1e-12);
        assert_eq!(hyper.num_topics(), 4);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(Hyperparameters::symmetric(0, 10, 0.5, 0.1).is_err());
        assert!(Hyperparameters::symmetric(4, 0, 0.5, 0.1).is_err());
        assert!(Hyperparameters::symmetric(4, 10, 0.0, 0.1).is_err());
        assert!(Hyperparameters::symmetric(4, 10, -0.5, 0.1).is_err());
        assert!(Hyperparameters::symmetric(4, 10, 0.5, 0.0).is_err());
        assert!(Hyperparameters::symmetric(4, 10, f64::NAN, 0.1).is_err());
    }
}
