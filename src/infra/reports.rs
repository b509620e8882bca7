// ============================================================
// Infra — Plain-Text Reports
// ============================================================
// Human-readable exports written after a run:
//
//   bipartitions.<name> — per document: its id, then the top-N
//                         topics by descending theta weight
//   twords.<name>       — per topic: the top-N words by
//                         descending phi weight, surface form
//   diag_<iter>.txt     — per-topic convergence gap for
//                         document 0 at checkpoint iterations
//
// These are secondary outputs: the caller treats a write
// failure here as surfaceable-but-recoverable, unlike the
// phi/theta matrices.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::data::vocabulary::Vocabulary;
use crate::domain::corpus::Corpus;

/// Indices of the `n` largest weights, descending; ties broken by
/// ascending index so output order is stable.
fn top_indices(weights: &[f64], n: usize) -> Vec<(usize, f64)> {
    let mut pairs: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
    pairs.sort_by(|(idx_a, weight_a), (idx_b, weight_b)| {
        weight_b
            .partial_cmp(weight_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| idx_a.cmp(idx_b))
    });
    pairs.truncate(n.min(pairs.len()));
    pairs
}

/// For each document: `id:` then one `\t<topic>\t<weight>` line per
/// top-ranked topic.
pub fn write_bipartitions(
    path: &Path,
    corpus: &Corpus,
    theta: &[Vec<f64>],
    top_n: usize,
) -> Result<()> {
    let mut out = String::new();
    for (d, doc) in corpus.docs().iter().enumerate() {
        out.push_str(&format!("{}:\n", doc.id));
        for (topic, weight) in top_indices(&theta[d], top_n) {
            out.push_str(&format!("\t{topic}\t{weight}\n"));
        }
    }
    fs::write(path, out)
        .with_context(|| format!("Cannot write bipartitions to '{}'", path.display()))
}

/// For each topic: `Label no<k+1>:` then one `\t<word>\t<weight>`
/// line per top-ranked vocabulary word.
pub fn write_top_words(
    path: &Path,
    vocab: &Vocabulary,
    phi: &[Vec<f64>],
    top_n: usize,
) -> Result<()> {
    let mut out = String::new();
    for (k, row) in phi.iter().enumerate() {
        out.push_str(&format!("Label no{}:\n", k + 1));
        for (word_id, weight) in top_indices(row, top_n) {
            out.push_str(&format!("\t{}\t{weight}\n", vocab.word(word_id)));
        }
    }
    fs::write(path, out)
        .with_context(|| format!("Cannot write top words to '{}'", path.display()))
}

/// Per-topic convergence gaps for one diagnostic checkpoint:
/// `<topic> <gap>` per line.
pub fn write_convergence_snapshot(path: &Path, gaps: &[f64]) -> Result<()> {
    let mut out = String::new();
    for (k, gap) in gaps.iter().enumerate() {
        out.push_str(&format!("{k} {gap}\n"));
    }
    fs::write(path, out)
        .with_context(|| format!("Cannot write diagnostic to '{}'", path.display()))
}
