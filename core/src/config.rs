use crate::error::{Result, SearchError};
use crate::query::Scoring;
use crate::tokenizer::Analyzer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory whose immediate files are indexed.
    pub data_dir: PathBuf,
    /// Where the index is persisted; rebuilt from scratch on every build.
    pub index_dir: PathBuf,
    /// Only files whose name ends with this suffix are indexed.
    pub suffix: String,
    pub analyzer: Analyzer,
    /// Tokenize files on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            index_dir: PathBuf::from("./index"),
            suffix: ".txt".into(),
            analyzer: Analyzer::default(),
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub query: String,
    pub max_results: usize,
    pub scoring: Scoring,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { query: "java".into(), max_results: 5, scoring: Scoring::default() }
    }
}

impl Config {
    /// Load a JSON config file. Missing fields fall back to their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SearchError::io(path, e))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| SearchError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index.suffix.is_empty() {
            return Err(SearchError::Config("index.suffix must not be empty".into()));
        }
        if self.index.data_dir.as_os_str().is_empty() || self.index.index_dir.as_os_str().is_empty() {
            return Err(SearchError::Config("index.data_dir and index.index_dir must be set".into()));
        }
        Ok(())
    }
}
