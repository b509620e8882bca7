// ============================================================
// Domain — Corpus
// ============================================================
// An ordered, immutable collection of documents plus the two
// dimensions the sampler derives from it: M (document count)
// and V (vocabulary size). The core holds this read-only for
// the life of a run; only the data layer constructs one.

use crate::domain::document::Document;

#[derive(Debug, Clone)]
pub struct Corpus {
    docs: Vec<Document>,
    vocab_size: usize,
}

impl Corpus {
    pub fn new(docs: Vec<Document>, vocab_size: usize) -> Self {
        Self { docs, vocab_size }
    }

    /// M — number of documents
    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    /// V — vocabulary size the word ids were mapped against
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn doc(&self, d: usize) -> &Document {
        &self.docs[d]
    }

    /// Total token count across all documents
    pub fn total_tokens(&self) -> usize {
        self.docs.iter().map(Document::len).sum()
    }
}
