// ============================================================
// Model — Projector
// ============================================================
// Converts the count tables into normalized probability tables.
// phi and theta are derived values, recomputed on demand and
// always reconstructible from counts + priors — the counts stay
// the source of truth.
//
//   phi[k][w]   ∝ nw[k][w]  + beta
//   theta[d][k] ∝ nd[d][k]  + alpha[k]
//
// Inference accumulates theta as a running mean over
// sampling-lag-spaced snapshots: each averaged projection
// bumps a monotonically increasing sample counter n and folds
// the fresh normalized snapshot in with weight 1/n.

use crate::model::counts::CountStore;
use crate::model::params::Hyperparameters;

#[derive(Debug, Clone)]
pub struct Projector {
    /// K×V topic-word table
    pub phi: Vec<Vec<f64>>,

    /// M×K document-topic table
    pub theta: Vec<Vec<f64>>,

    /// Number of snapshots folded into the running theta average
    num_samples: usize,
}

impl Projector {
    /// Fresh projector for training: phi and theta both start zeroed.
    pub fn new(m: usize, k: usize, v: usize) -> Self {
        Self {
            phi: vec![vec![0.0; v]; k],
            theta: vec![vec![0.0; k]; m],
            num_samples: 0,
        }
    }

    /// Projector for inference: phi is the pretrained table, frozen;
    /// only theta is ever recomputed.
    pub fn with_pretrained_phi(phi: Vec<Vec<f64>>, m: usize) -> Self {
        let k = phi.len();
        Self {
            phi,
            theta: vec![vec![0.0; k]; m],
            num_samples: 0,
        }
    }

    /// Recompute phi from the training counts. A topic row whose raw
    /// total is zero (topic never assigned) stays all-zero instead of
    /// dividing by zero.
    pub fn project_phi(&mut self, counts: &CountStore, hyper: &Hyperparameters) {
        for (k, row) in self.phi.iter_mut().enumerate() {
            for (w, cell) in row.iter_mut().enumerate() {
                *cell = counts.nw[k][w] + hyper.beta;
            }
            l1_normalize(row);
        }
    }

    /// Recompute theta from nd. With `average` set, fold the snapshot
    /// into the running mean instead of overwriting.
    pub fn project_theta(&mut self, counts: &CountStore, hyper: &Hyperparameters, average: bool) {
        if average {
            self.num_samples += 1;
        }
        let n = self.num_samples as f64;
        let k_topics = hyper.num_topics();
        let mut snapshot = vec![0.0; k_topics];
        for (d, row) in self.theta.iter_mut().enumerate() {
            for (k, cell) in snapshot.iter_mut().enumerate() {
                *cell = counts.nd[d][k] + hyper.alpha[k];
            }
            l1_normalize(&mut snapshot);
            if average {
                for (cell, &snap) in row.iter_mut().zip(snapshot.iter()) {
                    *cell = (*cell * (n - 1.0) + snap) / n;
                }
            } else {
                row.copy_from_slice(&snapshot);
            }
        }
    }
}

/// L1-normalize in place: divide every entry by the row sum.
/// A zero-sum row is left untouched rather than turned into NaN.
pub fn l1_normalize(row: &mut [f64]) {
    let sum: f64 = row.iter().sum();
    if sum == 0.0 {
        return;
    }
    for cell in row.iter_mut() {
        *cell /= sum;
    }
}
