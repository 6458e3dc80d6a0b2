use crate::config::SearchConfig;
use crate::index::{DocId, Document, Index};
use crate::tokenizer::{SimpleTokenizer, Tokenizer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Corpus statistics a scorer may use for one (term, document) pair.
#[derive(Debug, Clone, Copy)]
pub struct TermStats {
    pub term_frequency: u32,
    pub doc_freq: u32,
    pub num_docs: u32,
    pub doc_length: u32,
}

/// Contribution of one matching query term to a document's score.
/// A document's final score is the sum over the distinct query terms it contains.
pub trait Scorer: Send + Sync {
    fn score(&self, stats: &TermStats) -> f32;

    fn name(&self) -> &'static str;
}

/// Plain term-frequency sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfScorer;

impl Scorer for TfScorer {
    fn score(&self, stats: &TermStats) -> f32 {
        stats.term_frequency as f32
    }

    fn name(&self) -> &'static str {
        "tf"
    }
}

/// `(1 + ln tf) * ln(1 + N / df)`, so rare terms outweigh common ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfScorer;

impl Scorer for TfIdfScorer {
    fn score(&self, stats: &TermStats) -> f32 {
        if stats.term_frequency == 0 {
            return 0.0;
        }
        let tf = 1.0 + (stats.term_frequency as f32).ln();
        let df = stats.doc_freq.max(1) as f32;
        let idf = (1.0 + stats.num_docs.max(1) as f32 / df).ln();
        tf * idf
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scoring {
    #[default]
    Tf,
    TfIdf,
}

impl Scoring {
    pub fn scorer(self) -> Arc<dyn Scorer> {
        match self {
            Scoring::Tf => Arc::new(TfScorer),
            Scoring::TfIdf => Arc::new(TfIdfScorer),
        }
    }
}

impl FromStr for Scoring {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tf" => Ok(Scoring::Tf),
            "tfidf" | "tf-idf" => Ok(Scoring::TfIdf),
            other => Err(format!("unknown scoring '{other}' (expected tf or tfidf)")),
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scoring::Tf => "tf",
            Scoring::TfIdf => "tfidf",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub document: Document,
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    /// Matching documents before truncation to `max_results`.
    pub total_hits: usize,
    pub hits: Vec<Hit>,
}

impl SearchHits {
    pub fn is_empty(&self) -> bool { self.total_hits == 0 }
}

/// Read-only query engine over a built index. Shareable across threads.
pub struct Searcher<'a> {
    index: &'a Index,
    tokenizer: Arc<dyn Tokenizer>,
    scorer: Arc<dyn Scorer>,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self { index, tokenizer: Arc::new(SimpleTokenizer), scorer: Arc::new(TfScorer) }
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn search(&self, query_text: &str, max_results: usize) -> SearchHits {
        let start = Instant::now();
        // Repeated query terms count once.
        let terms: BTreeSet<String> = self.tokenizer.tokenize(query_text).into_iter().collect();
        if terms.is_empty() {
            tracing::debug!(query = query_text, "query has no terms");
            return SearchHits::default();
        }

        let num_docs = self.index.num_docs() as u32;
        let mut scores: HashMap<DocId, f32> = HashMap::new();
        for term in &terms {
            let Some(plist) = self.index.postings(term) else { continue };
            let doc_freq = plist.len() as u32;
            for p in plist {
                let doc_length = self.index.document(p.doc_id).map_or(0, |d| d.length);
                let stats = TermStats { term_frequency: p.term_frequency, doc_freq, num_docs, doc_length };
                *scores.entry(p.doc_id).or_insert(0.0) += self.scorer.score(&stats);
            }
        }

        let mut scored: Vec<(DocId, f32)> = scores.into_iter().collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let total_hits = scored.len();
        let hits: Vec<Hit> = scored
            .into_iter()
            .take(max_results)
            .filter_map(|(doc_id, score)| {
                self.index.document(doc_id).map(|d| Hit { document: d.clone(), score })
            })
            .collect();

        tracing::debug!(
            query = query_text,
            tokenizer = self.tokenizer.name(),
            scorer = self.scorer.name(),
            total_hits,
            took_us = start.elapsed().as_micros() as u64,
            "search complete"
        );
        SearchHits { total_hits, hits }
    }
}

/// Search with the default tokenizer and term-frequency scoring.
pub fn search(index: &Index, query_text: &str, max_results: usize) -> SearchHits {
    Searcher::new(index).search(query_text, max_results)
}

/// Search using the query, result limit and scoring from `config`; `tokenizer`
/// must match the one the index was built with.
pub fn search_with_config(index: &Index, tokenizer: Arc<dyn Tokenizer>, config: &SearchConfig) -> SearchHits {
    Searcher::new(index)
        .with_tokenizer(tokenizer)
        .with_scorer(config.scoring.scorer())
        .search(&config.query, config.max_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::PartialIndex;

    fn index_of(docs: &[(&str, &str)]) -> Index {
        let mut partial = PartialIndex::new();
        for (path, text) in docs {
            partial.add_document(path.to_string(), crate::tokenizer::tokenize(text));
        }
        let mut index = Index::new();
        index.merge(partial);
        index.sort_postings();
        index
    }

    #[test]
    fn scores_sum_term_frequencies() {
        let index = index_of(&[("a", "java java index"), ("b", "index")]);
        let res = search(&index, "java index", 5);
        assert_eq!(res.total_hits, 2);
        assert_eq!(res.hits[0].document.path, "a");
        assert_eq!(res.hits[0].score, 3.0);
        assert_eq!(res.hits[1].score, 1.0);
    }

    #[test]
    fn repeated_query_terms_count_once() {
        let index = index_of(&[("a", "java")]);
        assert_eq!(search(&index, "java JAVA java", 5).hits[0].score, 1.0);
    }

    #[test]
    fn truncation_keeps_total_hits() {
        let index = index_of(&[("a", "x"), ("b", "x"), ("c", "x")]);
        let res = search(&index, "x", 2);
        assert_eq!(res.total_hits, 3);
        let paths: Vec<_> = res.hits.iter().map(|h| h.document.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b"]);

        let none = search(&index, "x", 0);
        assert_eq!(none.total_hits, 3);
        assert!(none.hits.is_empty());
    }

    #[test]
    fn tfidf_prefers_rare_terms() {
        let index = index_of(&[("a", "common rare"), ("b", "common common"), ("c", "common")]);
        let res = Searcher::new(&index).with_scorer(Arc::new(TfIdfScorer)).search("common rare", 3);
        assert_eq!(res.hits[0].document.path, "a");
    }

    #[test]
    fn scoring_parses_names() {
        assert_eq!("tf-idf".parse::<Scoring>().unwrap(), Scoring::TfIdf);
        assert_eq!(Scoring::Tf.to_string(), "tf");
    }
}
