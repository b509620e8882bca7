// ============================================================
// Domain — Document
// ============================================================
// A single document as the sampler sees it: an opaque id and
// an ordered sequence of word ids. By the time a Document
// exists, tokenisation and vocabulary lookup have already
// happened in the data layer.

use serde::{Deserialize, Serialize};

/// One corpus document in word-id form.
/// The id is used only for labeling output (bipartitions report);
/// the core never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier carried through to reports
    pub id: String,

    /// Ordered word ids, each in [0, V)
    pub words: Vec<usize>,
}

impl Document {
    pub fn new(id: impl Into<String>, words: Vec<usize>) -> Self {
        Self { id: id.into(), words }
    }

    /// Number of tokens in this document. May be zero.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
