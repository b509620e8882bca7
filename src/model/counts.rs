// ============================================================
// Model — Count Store
// ============================================================
// Owns the mutable state of a sampling run: the three count
// tables and the per-token topic assignments.
//
//   nd[d][k]  — tokens of document d assigned to topic k
//   nw[k][w]  — occurrences of word w assigned to topic k
//   nwsum[k]  — total tokens assigned to topic k
//   z[d][w]   — current topic of the w-th token of document d
//
// nw and nwsum exist only in training mode; inference applies a
// frozen pretrained phi and evolves nd/z alone.
//
// Invariants, after initialize and after every sampling step:
//   Σ_k nd[d][k] == seeded_len(d)   for every document d
//   Σ_w nw[k][w] == nwsum[k]        for every topic k
//   Σ_k nwsum[k] == total seeded token count
//
// seeded_len(d) is the document length, except in
// inference-with-perplexity mode where only the first
// floor(len/2) tokens seed counts and the rest are held out
// for likelihood scoring. Sweeps must never visit a held-out
// token: its count was never added, so removal would go
// negative.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::domain::corpus::Corpus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Training,
    /// holdout=true withholds the second half of every document
    /// from the counts for perplexity scoring
    Inference { holdout: bool },
}

#[derive(Debug, Clone)]
pub struct CountStore {
    pub mode: Mode,

    /// nd[d][k], M rows of K
    pub nd: Vec<Vec<f64>>,

    /// nw[k][w], K rows of V. Empty in inference mode.
    pub nw: Vec<Vec<f64>>,

    /// nwsum[k], length K. Empty in inference mode.
    pub nwsum: Vec<f64>,

    /// z[d][w], row length = document length
    pub z: Vec<Vec<usize>>,

    /// Tokens of each document that participate in counts
    pub seeded_len: Vec<usize>,
}

impl CountStore {
    pub fn new(corpus: &Corpus, k: usize, mode: Mode) -> Self {
        let m = corpus.num_docs();
        let v = corpus.vocab_size();
        let (nw, nwsum) = match mode {
            Mode::Training => (vec![vec![0.0; v]; k], vec![0.0; k]),
            Mode::Inference { .. } => (Vec::new(), Vec::new()),
        };
        let seeded_len = corpus
            .docs()
            .iter()
            .map(|doc| match mode {
                Mode::Inference { holdout: true } => doc.len() / 2,
                _ => doc.len(),
            })
            .collect();
        Self {
            mode,
            nd: vec![vec![0.0; k]; m],
            nw,
            nwsum,
            z: corpus.docs().iter().map(|doc| vec![0; doc.len()]).collect(),
            seeded_len,
        }
    }

    /// One-time random assignment: every seeded token draws a uniform
    /// topic, and the counts are populated to match. Zero-length
    /// documents contribute nothing and produce an empty z row.
    pub fn initialize(&mut self, corpus: &Corpus, rng: &mut SmallRng) {
        let k = match self.nd.first() {
            Some(row) => row.len(),
            None => return,
        };
        let training = self.mode == Mode::Training;
        for (d, doc) in corpus.docs().iter().enumerate() {
            for w in 0..self.seeded_len[d] {
                let topic = rng.gen_range(0..k);
                let word = doc.words[w];
                self.z[d][w] = topic;
                self.nd[d][topic] += 1.0;
                if training {
                    self.nw[topic][word] += 1.0;
                    self.nwsum[topic] += 1.0;
                }
            }
        }
    }

    /// Verify the count-table invariants against the corpus.
    /// Cheap enough to debug_assert after initialization; tests call
    /// it after every sweep.
    pub fn invariants_hold(&self, corpus: &Corpus) -> bool {
        for (d, row) in self.nd.iter().enumerate() {
            if self.z[d].len() != corpus.doc(d).len() {
                return false;
            }
            let sum: f64 = row.iter().sum();
            if sum != self.seeded_len[d] as f64 {
                return false;
            }
        }
        if self.mode == Mode::Training {
            let mut grand_total = 0.0;
            for (k, row) in self.nw.iter().enumerate() {
                let sum: f64 = row.iter().sum();
                if sum != self.nwsum[k] {
                    return false;
                }
                grand_total += self.nwsum[k];
            }
            let seeded: usize = self.seeded_len.iter().sum();
            if grand_total != seeded as f64 {
                return false;
            }
        }
        true
    }
}
