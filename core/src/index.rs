use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    /// Canonical filesystem path of the source file.
    pub path: String,
    /// Number of terms produced by the tokenizer.
    pub length: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub build_millis: u64,
    pub skipped_files: u32,
}

/// Complete term -> posting list and doc id -> document mapping.
///
/// Built once per run and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct Index {
    pub(crate) postings: HashMap<String, Vec<Posting>>, // postings sorted by doc_id
    pub(crate) docs: HashMap<DocId, Document>,
    pub(crate) stats: BuildStats,
}

impl Index {
    pub fn new() -> Self { Self::default() }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn stats(&self) -> BuildStats { self.stats }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.docs.get(&doc_id)
    }

    /// Documents ordered by id.
    pub fn documents(&self) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self.docs.values().collect();
        docs.sort_by_key(|d| d.id);
        docs
    }

    /// Terms with their posting lists, ordered by term.
    pub fn terms(&self) -> Vec<(&str, &[Posting])> {
        let mut terms: Vec<(&str, &[Posting])> =
            self.postings.iter().map(|(t, p)| (t.as_str(), p.as_slice())).collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));
        terms
    }

    /// Check the structural invariants: every posting points at a known document,
    /// term frequencies are at least one, and each posting list is strictly
    /// increasing by doc id.
    pub fn validate(&self) -> Result<(), String> {
        for (id, doc) in &self.docs {
            if doc.id != *id {
                return Err(format!("document keyed {id} carries id {}", doc.id));
            }
        }
        for (term, plist) in &self.postings {
            if term.is_empty() {
                return Err("empty term in dictionary".into());
            }
            if plist.is_empty() {
                return Err(format!("term '{term}' has an empty posting list"));
            }
            let mut prev: Option<DocId> = None;
            for p in plist {
                if !self.docs.contains_key(&p.doc_id) {
                    return Err(format!("term '{term}' references unknown document {}", p.doc_id));
                }
                if p.term_frequency == 0 {
                    return Err(format!("term '{term}' has zero frequency in document {}", p.doc_id));
                }
                if prev.is_some_and(|prev| prev >= p.doc_id) {
                    return Err(format!("posting list for '{term}' is not strictly ordered"));
                }
                prev = Some(p.doc_id);
            }
        }
        Ok(())
    }

    /// Rebuild from the persisted document and term tables.
    pub(crate) fn from_tables(docs: Vec<Document>, terms: Vec<(String, Vec<Posting>)>, stats: BuildStats) -> Self {
        Self {
            docs: docs.into_iter().map(|d| (d.id, d)).collect(),
            postings: terms.into_iter().collect(),
            stats,
        }
    }

    /// Append a worker's partial index. Local ids are shifted past every document
    /// already present, so posting lists stay sorted as long as partials are
    /// merged in the order their files were enumerated.
    pub(crate) fn merge(&mut self, partial: PartialIndex) {
        let offset = self.docs.len() as DocId;
        for mut doc in partial.docs {
            doc.id += offset;
            self.docs.insert(doc.id, doc);
        }
        for (term, plist) in partial.postings {
            self.postings.entry(term).or_default().extend(
                plist.into_iter().map(|p| Posting { doc_id: p.doc_id + offset, ..p }),
            );
        }
        self.stats.skipped_files += partial.skipped_files;
    }

    pub(crate) fn sort_postings(&mut self) {
        for plist in self.postings.values_mut() {
            plist.sort_by_key(|p| p.doc_id);
        }
    }
}

/// Worker-private index over one chunk of files, with dense local doc ids.
#[derive(Debug, Default)]
pub struct PartialIndex {
    pub(crate) docs: Vec<Document>,
    pub(crate) postings: HashMap<String, Vec<Posting>>,
    pub(crate) skipped_files: u32,
}

impl PartialIndex {
    pub fn new() -> Self { Self::default() }

    /// Add one document's terms; returns the local id it was assigned.
    pub fn add_document(&mut self, path: String, terms: Vec<String>) -> DocId {
        let doc_id = self.docs.len() as DocId;
        let mut tf_counts: HashMap<String, u32> = HashMap::new();
        for term in &terms {
            *tf_counts.entry(term.clone()).or_insert(0) += 1;
        }
        for (term, term_frequency) in tf_counts {
            self.postings.entry(term).or_default().push(Posting { doc_id, term_frequency });
        }
        self.docs.push(Document { id: doc_id, path, length: terms.len() as u32 });
        doc_id
    }

    pub fn skip(&mut self) {
        self.skipped_files += 1;
    }
}
