// ============================================================
// Data — Vocabulary
// ============================================================
// The word ↔ id mapping shared by training and inference.
//
// Ids are assigned by descending corpus frequency (ties broken
// alphabetically) so low ids are common words — handy when
// eyeballing the top-words report. The mapping is persisted as
// a plain-text wordmap so an inference run maps new documents
// through exactly the vocabulary the model was trained with.
//
// Wordmap format:
//   line 1:  vocabulary size
//   line 2+: word<TAB>id

use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::domain::document::Document;
use crate::domain::traits::RawDocument;

#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_to_id: HashMap<String, usize>,
    id_to_word: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary from raw documents: count every surface form,
    /// then assign ids by descending frequency, alphabetical on ties.
    pub fn build(docs: &[RawDocument]) -> Self {
        let mut freqs: BTreeMap<&str, u64> = BTreeMap::new();
        for doc in docs {
            for tok in &doc.tokens {
                *freqs.entry(tok.as_str()).or_insert(0) += 1;
            }
        }

        let mut by_freq: Vec<(&str, u64)> = freqs.into_iter().collect();
        by_freq.sort_unstable_by(|(word_a, freq_a), (word_b, freq_b)| {
            freq_b.cmp(freq_a).then_with(|| word_a.cmp(word_b))
        });

        let mut word_to_id = HashMap::with_capacity(by_freq.len());
        let mut id_to_word = Vec::with_capacity(by_freq.len());
        for (idx, (word, _)) in by_freq.into_iter().enumerate() {
            word_to_id.insert(word.to_string(), idx);
            id_to_word.push(word.to_string());
        }
        Self { word_to_id, id_to_word }
    }

    /// V — number of distinct words
    pub fn len(&self) -> usize {
        self.id_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_word.is_empty()
    }

    pub fn id(&self, word: &str) -> Option<usize> {
        self.word_to_id.get(word).copied()
    }

    /// Surface form for a word id. Used by the top-words report.
    pub fn word(&self, id: usize) -> &str {
        &self.id_to_word[id]
    }

    /// Map raw documents into word-id documents.
    /// Tokens missing from the vocabulary are dropped (they have no
    /// column in phi); returns how many were dropped so the caller
    /// can log it.
    pub fn encode(&self, docs: &[RawDocument]) -> (Vec<Document>, usize) {
        let mut dropped = 0usize;
        let encoded = docs
            .iter()
            .map(|raw| {
                let words: Vec<usize> = raw
                    .tokens
                    .iter()
                    .filter_map(|tok| {
                        let id = self.id(tok);
                        if id.is_none() {
                            dropped += 1;
                        }
                        id
                    })
                    .collect();
                Document::new(raw.id.clone(), words)
            })
            .collect();
        (encoded, dropped)
    }

    /// Write the wordmap: size header, then one `word<TAB>id` per line.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.len()));
        for (id, word) in self.id_to_word.iter().enumerate() {
            out.push_str(&format!("{word}\t{id}\n"));
        }
        fs::write(path, out)
            .with_context(|| format!("Cannot write wordmap to '{}'", path.display()))
    }

    /// Read a wordmap written by `save`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read wordmap from '{}'", path.display()))?;
        let mut lines = text.lines();

        let count: usize = lines
            .next()
            .context("wordmap is empty")?
            .trim()
            .parse()
            .context("wordmap header is not a count")?;

        let mut id_to_word = vec![String::new(); count];
        let mut word_to_id = HashMap::with_capacity(count);
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let (word, id_str) = line
                .split_once('\t')
                .with_context(|| format!("malformed wordmap line: '{line}'"))?;
            let id: usize = id_str
                .trim()
                .parse()
                .with_context(|| format!("malformed word id in line: '{line}'"))?;
            if id >= count {
                bail!("word id {id} out of range (vocabulary size {count})");
            }
            id_to_word[id] = word.to_string();
            word_to_id.insert(word.to_string(), id);
        }
        if word_to_id.len() != count {
            bail!(
                "wordmap lists {} words but header says {}",
                word_to_id.len(),
                count
            );
        }
        Ok(Self { word_to_id, id_to_word })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, tokens: &[&str]) -> RawDocument {
        RawDocument {
            id: id.to_string(),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_ids_by_descending_frequency() {
        let docs = vec![raw("d0", &["cat", "dog", "cat"]), raw("d1", &["cat", "ant"])];
        let vocab = Vocabulary::build(&docs);
        assert_eq!(vocab.len(), 3);
        // "cat" appears 3 times → id 0
        assert_eq!(vocab.id("cat"), Some(0));
        // "ant" and "dog" both appear once → alphabetical
        assert_eq!(vocab.id("ant"), Some(1));
        assert_eq!(vocab.id("dog"), Some(2));
        assert_eq!(vocab.word(0), "cat");
    }

    #[test]
    fn test_encode_drops_unknown_words() {
        let vocab = Vocabulary::build(&[raw("d0", &["cat", "dog"])]);
        let (encoded, dropped) = vocab.encode(&[raw("new", &["cat", "unseen", "dog"])]);
        assert_eq!(dropped, 1);
        assert_eq!(encoded[0].words.len(), 2);
        assert_eq!(encoded[0].id, "new");
    }

    #[test]
    fn test_wordmap_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordmap.txt");

        let vocab = Vocabulary::build(&[raw("d0", &["cat", "dog", "cat", "ant"])]);
        vocab.save(&path).unwrap();

        let loaded = Vocabulary::load(&path).unwrap();
        assert_eq!(loaded.len(), vocab.len());
        for id in 0..vocab.len() {
            assert_eq!(loaded.word(id), vocab.word(id));
        }
        assert_eq!(loaded.id("dog"), vocab.id("dog"));
    }

    #[test]
    fn test_load_rejects_truncated_wordmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordmap.txt");
        fs::write(&path, "3\ncat\t0\n").unwrap();
        assert!(Vocabulary::load(&path).is_err());
    }
}
