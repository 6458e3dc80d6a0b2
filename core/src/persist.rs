use crate::error::{Result, SearchError};
use crate::index::{BuildStats, Document, Index, Posting};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub build_millis: u64,
    pub skipped_files: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn terms(&self) -> PathBuf { self.root.join("terms.bin") }

    /// Whether a (possibly stale) index has been written here.
    pub fn exists(&self) -> bool { self.meta().is_file() }
}

/// Write `index` to `paths`, replacing any index already stored there.
///
/// `meta.json` is removed first and written last, so an interrupted save
/// leaves a directory that `load` refuses instead of a half-updated index.
pub fn save(paths: &IndexPaths, index: &Index) -> Result<()> {
    create_dir_all(&paths.root).map_err(|e| SearchError::io(&paths.root, e))?;
    match fs::remove_file(paths.meta()) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(SearchError::io(paths.meta(), e)),
    }

    let docs: Vec<&Document> = index.documents();
    write_bin(&paths.docs(), &docs)?;
    let terms: Vec<(&str, &[Posting])> = index.terms();
    write_bin(&paths.terms(), &terms)?;

    let stats = index.stats();
    let meta = MetaFile {
        version: FORMAT_VERSION,
        num_docs: docs.len() as u32,
        num_terms: terms.len() as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        build_millis: stats.build_millis,
        skipped_files: stats.skipped_files,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "index saved");
    Ok(())
}

pub fn load(paths: &IndexPaths) -> Result<Index> {
    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        return Err(SearchError::VersionMismatch { found: meta.version, expected: FORMAT_VERSION });
    }
    let docs: Vec<Document> = read_bin(&paths.docs())?;
    let terms: Vec<(String, Vec<Posting>)> = read_bin(&paths.terms())?;
    if docs.len() != meta.num_docs as usize || terms.len() != meta.num_terms as usize {
        return Err(SearchError::corrupt(
            &paths.root,
            format!(
                "meta.json lists {} documents and {} terms, tables hold {} and {}",
                meta.num_docs,
                meta.num_terms,
                docs.len(),
                terms.len()
            ),
        ));
    }

    let stats = BuildStats { build_millis: meta.build_millis, skipped_files: meta.skipped_files };
    let index = Index::from_tables(docs, terms, stats);
    if index.num_docs() != meta.num_docs as usize || index.num_terms() != meta.num_terms as usize {
        return Err(SearchError::corrupt(&paths.root, "duplicate document ids or terms"));
    }
    index.validate().map_err(|reason| SearchError::corrupt(&paths.root, reason))?;
    tracing::info!(root = %paths.root.display(), num_docs = index.num_docs(), "index loaded");
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let path = paths.meta();
    let json = serde_json::to_string_pretty(meta).map_err(|e| SearchError::corrupt(&path, e.to_string()))?;
    let mut f = File::create(&path).map_err(|e| SearchError::io(&path, e))?;
    f.write_all(json.as_bytes()).map_err(|e| SearchError::io(&path, e))?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    let mut buf = String::new();
    File::open(&path)
        .and_then(|mut f| f.read_to_string(&mut buf))
        .map_err(|e| SearchError::io(&path, e))?;
    serde_json::from_str(&buf).map_err(|e| SearchError::corrupt(&path, e.to_string()))
}

fn write_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = bincode::serialize(value).map_err(|e| SearchError::corrupt(path, e.to_string()))?;
    let mut f = File::create(path).map_err(|e| SearchError::io(path, e))?;
    f.write_all(&bytes).map_err(|e| SearchError::io(path, e))?;
    Ok(())
}

fn read_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut buf = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut buf))
        .map_err(|e| SearchError::io(path, e))?;
    bincode::deserialize(&buf).map_err(|e| SearchError::corrupt(path, e.to_string()))
}
