//! Inverted-index search over a directory of plain-text files.
//!
//! [`IndexBuilder`] walks a directory and produces an [`Index`], [`persist`]
//! stores and reloads it, and [`Searcher`] answers keyword queries against it.

pub mod builder;
pub mod config;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use builder::{rebuild, IndexBuilder};
pub use config::{Config, IndexConfig, SearchConfig};
pub use error::{Result, SearchError};
pub use index::{BuildStats, DocId, Document, Index, PartialIndex, Posting};
pub use query::{search, search_with_config, Hit, Scorer, Scoring, SearchHits, Searcher, TermStats, TfIdfScorer, TfScorer};
pub use tokenizer::{tokenize, Analyzer, CjkTokenizer, EnglishTokenizer, SimpleTokenizer, Tokenizer};
