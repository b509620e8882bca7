// ============================================================
// Model — Gibbs Sampler
// ============================================================
// The per-token topic reassignment step. For each token of a
// document, in index order:
//
//   1. Remove the token's contribution from the counts.
//   2. Build the cumulative unnormalized conditional over the
//      K topics.
//   3. Draw u ∈ [0,1) and pick the smallest k whose partial
//      sum exceeds u * total.
//   4. Re-insert the token under the new topic.
//
// Remove-then-reinsert keeps the count invariants intact across
// the whole sweep, and each token costs O(K).
//
// Training uses the count-based collapsed conditional
//
//   (nw[k][w] + beta) * (nd[d][k] + alpha[k]) / (nwsum[k] + betaSum)
//
// Inference replaces the topic-word factor with the frozen
// pretrained phi[k][w]; only nd and z evolve.
//
// A zero or non-finite cumulative total is a fatal
// NumericDegeneracy — continuing would draw topics from
// garbage. The clamp to topic K-1 survives only for the benign
// case where rounding leaves u * total a hair above the last
// partial sum.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::domain::document::Document;
use crate::error::LdaError;
use crate::model::counts::CountStore;
use crate::model::params::Hyperparameters;

pub struct GibbsSampler {
    /// Scratch cumulative distribution, length K. Reused across
    /// tokens so a sweep allocates nothing.
    cdf: Vec<f64>,
}

impl GibbsSampler {
    pub fn new(k: usize) -> Self {
        Self { cdf: vec![0.0; k] }
    }

    /// One full training sweep over document `d`: every token is
    /// removed, resampled from the collapsed conditional, and
    /// re-inserted. Mutates nd, nw, nwsum, and z.
    pub fn sweep_training(
        &mut self,
        d: usize,
        doc: &Document,
        counts: &mut CountStore,
        hyper: &Hyperparameters,
        rng: &mut SmallRng,
    ) -> Result<(), LdaError> {
        let k_topics = self.cdf.len();
        for (w, &word) in doc.words.iter().enumerate() {
            let old = counts.z[d][w];
            counts.nw[old][word] -= 1.0;
            counts.nd[d][old] -= 1.0;
            counts.nwsum[old] -= 1.0;

            let mut cum = 0.0;
            for k in 0..k_topics {
                let prob = (counts.nw[k][word] + hyper.beta)
                    * (counts.nd[d][k] + hyper.alpha[k])
                    / (counts.nwsum[k] + hyper.beta_sum);
                cum += prob;
                self.cdf[k] = cum;
            }

            let new = draw(&self.cdf, rng)
                .map_err(|mass| LdaError::NumericDegeneracy { doc: d, token: w, mass })?;

            counts.nw[new][word] += 1.0;
            counts.nd[d][new] += 1.0;
            counts.nwsum[new] += 1.0;
            counts.z[d][w] = new;
        }
        Ok(())
    }

    /// One inference sweep over document `d` against a frozen phi.
    /// Only the seeded prefix of the document is visited — held-out
    /// tokens never entered the counts. The caller passes this
    /// document's own nd and z rows; in parallel inference those
    /// rows come from a worker's exclusive partition.
    #[allow(clippy::too_many_arguments)]
    pub fn sweep_inference(
        &mut self,
        d: usize,
        doc: &Document,
        seeded_len: usize,
        nd_row: &mut [f64],
        z_row: &mut [usize],
        phi: &[Vec<f64>],
        alpha: &[f64],
        rng: &mut SmallRng,
    ) -> Result<(), LdaError> {
        let k_topics = self.cdf.len();
        for w in 0..seeded_len {
            let word = doc.words[w];
            let old = z_row[w];
            nd_row[old] -= 1.0;

            let mut cum = 0.0;
            for k in 0..k_topics {
                let prob = phi[k][word] * (nd_row[k] + alpha[k]);
                cum += prob;
                self.cdf[k] = cum;
            }

            let new = draw(&self.cdf, rng)
                .map_err(|mass| LdaError::NumericDegeneracy { doc: d, token: w, mass })?;

            nd_row[new] += 1.0;
            z_row[w] = new;
        }
        Ok(())
    }
}

/// Sample a topic index from an unnormalized cumulative distribution.
/// Err carries the degenerate total for the caller's error.
fn draw(cdf: &[f64], rng: &mut SmallRng) -> Result<usize, f64> {
    let total = cdf[cdf.len() - 1];
    if !total.is_finite() || total <= 0.0 {
        return Err(total);
    }
    let u = rng.gen::<f64>() * total;
    for (k, &partial) in cdf.iter().enumerate() {
        if partial > u {
            return Ok(k);
        }
    }
    // Rounding left u * total marginally above the last partial sum.
    Ok(cdf.len() - 1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::corpus::Corpus;
    use crate::model::counts::Mode;
    use rand::SeedableRng;

    fn corpus() -> Corpus {
        Corpus::new(
            vec![
                Document::new("d0", vec![0, 1, 2, 0, 3, 1]),
                Document::new("d1", vec![3, 3, 1, 2]),
            ],
            4,
        )
    }

    fn trained_setup(k: usize, seed: u64) -> (Corpus, CountStore, Hyperparameters, SmallRng) {
        let corpus = corpus();
        let hyper = Hyperparameters::symmetric(k, corpus.vocab_size(), 0.5, 0.1).unwrap();
        let mut counts = CountStore::new(&corpus, k, Mode::Training);
        let mut rng = SmallRng::seed_from_u64(seed);
        counts.initialize(&corpus, &mut rng);
        (corpus, counts, hyper, rng)
    }

    #[test]
    fn test_sweep_preserves_invariants() {
        let (corpus, mut counts, hyper, mut rng) = trained_setup(3, 11);
        let mut sampler = GibbsSampler::new(3);
        for _ in 0..20 {
            for d in 0..corpus.num_docs() {
                sampler
                    .sweep_training(d, corpus.doc(d), &mut counts, &hyper, &mut rng)
                    .unwrap();
                assert!(counts.invariants_hold(&corpus));
            }
        }
    }

    #[test]
    fn test_sweeps_are_deterministic_under_seed() {
        let run = |seed: u64| {
            let (corpus, mut counts, hyper, mut rng) = trained_setup(3, seed);
            let mut sampler = GibbsSampler::new(3);
            for _ in 0..5 {
                for d in 0..corpus.num_docs() {
                    sampler
                        .sweep_training(d, corpus.doc(d), &mut counts, &hyper, &mut rng)
                        .unwrap();
                }
            }
            counts.z
        };
        assert_eq!(run(123), run(123));
    }

    #[test]
    fn test_single_word_single_topic_converges_immediately() {
        // K=1: the only topic is 0 and every draw lands there.
        let corpus = Corpus::new(vec![Document::new("only", vec![0])], 1);
        let hyper = Hyperparameters::symmetric(1, 1, 0.5, 0.1).unwrap();
        let mut counts = CountStore::new(&corpus, 1, Mode::Training);
        let mut rng = SmallRng::seed_from_u64(0);
        counts.initialize(&corpus, &mut rng);

        let mut sampler = GibbsSampler::new(1);
        sampler
            .sweep_training(0, corpus.doc(0), &mut counts, &hyper, &mut rng)
            .unwrap();

        assert_eq!(counts.z[0], vec![0]);
        assert_eq!(counts.nd[0], vec![1.0]);
    }

    #[test]
    fn test_inference_sweep_touches_only_nd_and_z() {
        let corpus = corpus();
        let k = 2;
        let hyper = Hyperparameters::symmetric(k, corpus.vocab_size(), 0.5, 0.1).unwrap();
        let mut counts = CountStore::new(&corpus, k, Mode::Inference { holdout: false });
        let mut rng = SmallRng::seed_from_u64(3);
        counts.initialize(&corpus, &mut rng);

        // A fixed, well-formed phi
        let phi = vec![vec![0.4, 0.3, 0.2, 0.1], vec![0.1, 0.2, 0.3, 0.4]];
        let mut sampler = GibbsSampler::new(k);
        for d in 0..corpus.num_docs() {
            let seeded = counts.seeded_len[d];
            let (nd_row, z_row) = (&mut counts.nd[d], &mut counts.z[d]);
            sampler
                .sweep_inference(d, corpus.doc(d), seeded, nd_row, z_row, &phi, &hyper.alpha, &mut rng)
                .unwrap();
        }
        assert!(counts.invariants_hold(&corpus));
        assert!(counts.nw.is_empty());
    }

    #[test]
    fn test_degenerate_distribution_is_an_error() {
        // An all-zero phi makes every topic weight zero: the cumulative
        // total is 0 and the sweep must fail loudly, not clamp.
        let corpus = Corpus::new(vec![Document::new("d0", vec![0, 1])], 2);
        let alpha = vec![0.5, 0.5];
        let phi = vec![vec![0.0, 0.0], vec![0.0, 0.0]];
        let mut nd_row = vec![2.0, 0.0];
        let mut z_row = vec![0, 0];

        let mut sampler = GibbsSampler::new(2);
        let err = sampler
            .sweep_inference(
                0,
                corpus.doc(0),
                2,
                &mut nd_row,
                &mut z_row,
                &phi,
                &alpha,
                &mut SmallRng::seed_from_u64(5),
            )
            .unwrap_err();
        match err {
            LdaError::NumericDegeneracy { doc, token, mass } => {
                assert_eq!(doc, 0);
                assert_eq!(token, 0);
                assert_eq!(mass, 0.0);
            }
            other => panic!("expected NumericDegeneracy, got {other}"),
        }
    }
}
