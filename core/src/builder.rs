use crate::config::IndexConfig;
use crate::error::{Result, SearchError};
use crate::index::{Index, PartialIndex};
use crate::persist::{self, IndexPaths};
use crate::tokenizer::{SimpleTokenizer, Tokenizer};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

/// Builds an [`Index`] from the immediate files of a directory.
///
/// Every call is a full rebuild; there is no incremental update.
pub struct IndexBuilder {
    tokenizer: Arc<dyn Tokenizer>,
    suffix: String,
    parallel: bool,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self { tokenizer: Arc::new(SimpleTokenizer), suffix: ".txt".into(), parallel: false }
    }
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn from_config(config: &IndexConfig) -> Self {
        Self { tokenizer: config.analyzer.tokenizer(), suffix: config.suffix.clone(), parallel: config.parallel }
    }

    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build<P: AsRef<Path>>(&self, directory: P) -> Result<Index> {
        let start = Instant::now();
        let directory = directory.as_ref();
        let files = self.list_files(directory)?;
        tracing::info!(
            dir = %directory.display(),
            files = files.len(),
            tokenizer = self.tokenizer.name(),
            parallel = self.parallel,
            "building index"
        );

        let mut index = Index::new();
        if self.parallel && files.len() > 1 {
            let chunk = files.len().div_ceil(rayon::current_num_threads()).max(1);
            let partials: Vec<PartialIndex> = files.par_chunks(chunk).map(|c| self.index_files(c)).collect();
            // par_chunks + collect preserves chunk order
            for partial in partials {
                index.merge(partial);
            }
        } else {
            index.merge(self.index_files(&files));
        }
        index.sort_postings();
        index.stats.build_millis = start.elapsed().as_millis() as u64;

        tracing::info!(
            num_docs = index.num_docs(),
            num_terms = index.num_terms(),
            skipped = index.stats.skipped_files,
            build_millis = index.stats.build_millis,
            "index built"
        );
        Ok(index)
    }

    /// Immediate regular files of `directory` carrying the configured suffix, by name.
    fn list_files(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let meta = fs::metadata(directory).map_err(|e| SearchError::io(directory, e))?;
        if !meta.is_dir() {
            return Err(SearchError::NotADirectory(directory.to_path_buf()));
        }
        let mut files = Vec::new();
        let walker = WalkDir::new(directory).min_depth(1).max_depth(1).sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if e.depth() == 0 => {
                    let source = e.into_io_error().unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    return Err(SearchError::io(directory, source));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let matches = entry.file_name().to_str().is_some_and(|n| n.ends_with(&self.suffix));
            if !matches {
                continue;
            }
            // Follows symlinks so a linked note still counts as a file. A dangling
            // link is kept so that reading it fails and it is counted as skipped.
            match fs::metadata(entry.path()) {
                Ok(m) if !m.is_file() => {}
                _ => files.push(entry.into_path()),
            }
        }
        Ok(files)
    }

    fn index_files(&self, files: &[PathBuf]) -> PartialIndex {
        let mut partial = PartialIndex::new();
        for file in files {
            match read_document(file) {
                Ok((path, text)) => {
                    let terms = self.tokenizer.tokenize(&text);
                    partial.add_document(path, terms);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping file");
                    partial.skip();
                }
            }
        }
        partial
    }
}

fn read_document(file: &Path) -> Result<(String, String)> {
    let bytes = fs::read(file).map_err(|e| SearchError::io(file, e))?;
    let canonical = fs::canonicalize(file).map_err(|e| SearchError::io(file, e))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok((canonical.to_string_lossy().into_owned(), text))
}

/// Build `config.data_dir` and persist the result to `config.index_dir`,
/// replacing whatever index was there.
pub fn rebuild(config: &IndexConfig) -> Result<Index> {
    let index = IndexBuilder::from_config(config).build(&config.data_dir)?;
    persist::save(&IndexPaths::new(&config.index_dir), &index)?;
    Ok(index)
}
