// ============================================================
// Data — Corpus Loader
// ============================================================
// Loads a plain-text corpus file: one document per non-empty
// line, formatted as
//
//   doc-id<TAB>token token token ...
//
// Lines without a tab get a positional id ("doc0", "doc1", ...).
// A document line with an id but no tokens is kept as an empty
// document — the sampler must handle those, so the loader does
// not filter them out.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::traits::{CorpusSource, RawDocument};

/// Loads documents from a single plain-text corpus file.
/// Implements the CorpusSource trait from the domain layer.
pub struct TextCorpusLoader {
    path: PathBuf,
}

impl TextCorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CorpusSource for TextCorpusLoader {
    fn load_all(&self) -> Result<Vec<RawDocument>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))?;

        let docs = parse_corpus(&text);
        tracing::info!(
            "Loaded {} documents from '{}'",
            docs.len(),
            self.path.display()
        );
        Ok(docs)
    }
}

/// Parse corpus text into raw documents, preserving line order.
fn parse_corpus(text: &str) -> Vec<RawDocument> {
    let mut docs = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (id, body) = match line.split_once('\t') {
            Some((id, rest)) => (id.trim().to_string(), rest),
            None => (format!("doc{}", docs.len()), line),
        };
        let tokens: Vec<String> = body.split_whitespace().map(str::to_string).collect();
        docs.push(RawDocument { id, tokens });
    }
    docs
}

/// Convenience used by both use cases: load and parse in one call.
pub fn load_corpus_file(path: &Path) -> Result<Vec<RawDocument>> {
    TextCorpusLoader::new(path).load_all()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parses_ids_and_tokens() {
        let docs = parse_corpus("pmid1\tthe cat sat\npmid2\tdog ran\n");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "pmid1");
        assert_eq!(docs[0].tokens, vec!["the", "cat", "sat"]);
        assert_eq!(docs[1].id, "pmid2");
    }

    #[test]
    fn test_positional_ids_without_tab() {
        let docs = parse_corpus("alpha beta\ngamma\n");
        assert_eq!(docs[0].id, "doc0");
        assert_eq!(docs[1].id, "doc1");
        assert_eq!(docs[1].tokens, vec!["gamma"]);
    }

    #[test]
    fn test_keeps_empty_document() {
        let docs = parse_corpus("empty\t\nfull\ta b\n");
        assert_eq!(docs.len(), 2);
        assert!(docs[0].tokens.is_empty());
        assert_eq!(docs[1].tokens.len(), 2);
    }

    #[test]
    fn test_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "d1\tone two three").unwrap();
        writeln!(file, "d2\tfour").unwrap();

        let docs = load_corpus_file(file.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].tokens, vec!["four"]);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_corpus_file(Path::new("/nonexistent/corpus.txt")).is_err());
    }
}
