// ============================================================
// Model — Evaluation
// ============================================================
// Likelihood-based scoring of a projected model.
//
// Log-likelihood sums log(Σ_k phi[k][w]·theta[d][k]) over every
// token. Terms where either factor is exactly zero are skipped
// inside the inner sum to avoid polluting it, but a token whose
// dense probability comes out zero contributes ln(0) = -∞ and
// that -∞ propagates — a model that assigns a token zero mass
// has -∞ likelihood, not a quietly smaller one.
//
// Perplexity scores the held-out tokens of an inference run:
// the second half (index ≥ floor(len/2)) of every document,
// exactly the tokens initialize withheld from the counts.

use crate::domain::corpus::Corpus;

/// Index of the first held-out token of a document of length `len`.
pub fn holdout_start(len: usize) -> usize {
    len / 2
}

/// Full-corpus log-likelihood under phi and theta.
pub fn log_likelihood(corpus: &Corpus, phi: &[Vec<f64>], theta: &[Vec<f64>]) -> f64 {
    let k_topics = phi.len();
    let mut ll = 0.0;
    for (d, doc) in corpus.docs().iter().enumerate() {
        for &word in &doc.words {
            let mut l = 0.0;
            for k in 0..k_topics {
                if phi[k][word] != 0.0 && theta[d][k] != 0.0 {
                    l += phi[k][word] * theta[d][k];
                }
            }
            ll += l.ln();
        }
    }
    ll
}

/// Held-out perplexity: exp(-Σ log p / N) over the withheld second
/// half of every document. Returns NaN when nothing is held out; a
/// zero-probability token drives the value to +∞.
pub fn perplexity(corpus: &Corpus, phi: &[Vec<f64>], theta: &[Vec<f64>]) -> f64 {
    let k_topics = phi.len();
    let mut ll = 0.0;
    let mut held_out = 0usize;
    for (d, doc) in corpus.docs().iter().enumerate() {
        for &word in &doc.words[holdout_start(doc.len())..] {
            let mut p = 0.0;
            for k in 0..k_topics {
                p += phi[k][word] * theta[d][k];
            }
            ll += p.ln();
            held_out += 1;
        }
    }
    if held_out == 0 {
        return f64::NAN;
    }
    (-ll / held_out as f64).exp()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Document;

    fn corpus() -> Corpus {
        Corpus::new(
            vec![
                Document::new("d0", vec![0, 1, 0, 1]),
                Document::new("d1", vec![1, 1]),
            ],
            2,
        )
    }

    #[test]
    fn test_log_likelihood_of_certain_model_is_zero() {
        // One word, one topic: every token has probability 1, so the
        // log-likelihood is exactly 0.
        let corpus = Corpus::new(vec![Document::new("d0", vec![0, 0])], 1);
        let phi = vec![vec![1.0]];
        let theta = vec![vec![1.0]];
        let ll = log_likelihood(&corpus, &phi, &theta);
        assert_eq!(ll, 0.0);
    }

    #[test]
    fn test_log_likelihood_is_negative_for_uncertain_model() {
        let phi = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let theta = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let ll = log_likelihood(&corpus(), &phi, &theta);
        // Every token has probability 0.5 → ll = 6 * ln(0.5)
        assert!((ll - 6.0 * 0.5f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_probability_token_gives_negative_infinity() {
        // Word 1 has zero mass under every topic.
        let phi = vec![vec![1.0, 0.0], vec![1.0, 0.0]];
        let theta = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let ll = log_likelihood(&corpus(), &phi, &theta);
        assert!(ll.is_infinite() && ll < 0.0);
    }

    #[test]
    fn test_perplexity_of_uniform_model() {
        // Every held-out token has probability 0.5 → perplexity 2.
        let phi = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let theta = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let ppx = perplexity(&corpus(), &phi, &theta);
        assert!((ppx - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_perplexity_counts_only_held_out_half() {
        // d0 has len 4 → holdout starts at 2; d1 len 2 → starts at 1.
        assert_eq!(holdout_start(4), 2);
        assert_eq!(holdout_start(2), 1);
        assert_eq!(holdout_start(1), 0);
        assert_eq!(holdout_start(0), 0);
    }

    #[test]
    fn test_perplexity_with_no_held_out_tokens_is_nan() {
        let empty = Corpus::new(vec![Document::new("e", vec![])], 2);
        let phi = vec![vec![0.5, 0.5]];
        let theta = vec![vec![1.0]];
        assert!(perplexity(&empty, &phi, &theta).is_nan());
    }
}
