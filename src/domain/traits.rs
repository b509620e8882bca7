// ============================================================
// Domain — Core Traits
// ============================================================
// The loading seam between the sampler and whatever produces
// documents. The application layer programs against this trait
// so the text-file loader can be swapped without touching the
// training or inference pipelines.

use anyhow::Result;

/// A document before vocabulary lookup: an id plus surface-form tokens.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub id: String,
    pub tokens: Vec<String>,
}

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce raw documents.
///
/// Implementations:
///   - TextCorpusLoader → one document per line of a plain-text file
pub trait CorpusSource {
    /// Load all documents from this source, in corpus order.
    fn load_all(&self) -> Result<Vec<RawDocument>>;
}
