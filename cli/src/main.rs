use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use localsearch::persist::{self, IndexPaths};
use localsearch::{rebuild, search_with_config, Analyzer, Config, Index, Scoring, SearchHits};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "localsearch")]
#[command(about = "Index a directory of text files and run keyword queries against it", long_about = None)]
struct Cli {
    /// JSON config file; flags given on the command line take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from the data directory, replacing any existing index
    Build {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Query a previously built index
    Search {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Rebuild the index, then query it
    Run {
        #[command(flatten)]
        index: IndexArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args, Default)]
struct IndexArgs {
    /// Directory whose files are indexed
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Output index directory
    #[arg(long)]
    index_dir: Option<PathBuf>,
    /// Only index files whose name ends with this suffix
    #[arg(long)]
    suffix: Option<String>,
    /// Tokenizer: simple, english or cjk (must match between build and search)
    #[arg(long)]
    analyzer: Option<Analyzer>,
    /// Tokenize files in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Args, Default)]
struct StoreArgs {
    /// Index directory to query
    #[arg(long)]
    index_dir: Option<PathBuf>,
    /// Tokenizer the index was built with: simple, english or cjk
    #[arg(long)]
    analyzer: Option<Analyzer>,
}

#[derive(Args, Default)]
struct SearchArgs {
    /// Query string
    #[arg(long, short)]
    query: Option<String>,
    /// Maximum number of results to print
    #[arg(long, short = 'k')]
    max_results: Option<usize>,
    /// Ranking function: tf or tfidf
    #[arg(long)]
    scoring: Option<Scoring>,
}

impl IndexArgs {
    fn apply(self, config: &mut Config) {
        let c = &mut config.index;
        if let Some(v) = self.data_dir { c.data_dir = v; }
        if let Some(v) = self.index_dir { c.index_dir = v; }
        if let Some(v) = self.suffix { c.suffix = v; }
        if let Some(v) = self.analyzer { c.analyzer = v; }
        c.parallel |= self.parallel;
    }
}

impl StoreArgs {
    fn apply(self, config: &mut Config) {
        let c = &mut config.index;
        if let Some(v) = self.index_dir { c.index_dir = v; }
        if let Some(v) = self.analyzer { c.analyzer = v; }
    }
}

impl SearchArgs {
    fn apply(self, config: &mut Config) {
        let c = &mut config.search;
        if let Some(v) = self.query { c.query = v; }
        if let Some(v) = self.max_results { c.max_results = v; }
        if let Some(v) = self.scoring { c.scoring = v; }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Build { index } => {
            index.apply(&mut config);
            config.validate()?;
            build(&config)?;
        }
        Commands::Search { store, search } => {
            store.apply(&mut config);
            search.apply(&mut config);
            config.validate()?;
            let paths = IndexPaths::new(&config.index.index_dir);
            let loaded = persist::load(&paths)
                .with_context(|| format!("loading index from {} (run `localsearch build` first)", paths.root.display()))?;
            query(&config, &loaded);
        }
        Commands::Run { index, search } => {
            index.apply(&mut config);
            search.apply(&mut config);
            config.validate()?;
            build(&config)?;
            let loaded = persist::load(&IndexPaths::new(&config.index.index_dir))?;
            query(&config, &loaded);
        }
    }
    Ok(())
}

fn build(config: &Config) -> Result<Index> {
    let data_dir = &config.index.data_dir;
    let index = rebuild(&config.index).with_context(|| format!("indexing {}", data_dir.display()))?;
    let stats = index.stats();
    println!("{} indexed in {} ms ({} documents)", data_dir.display(), stats.build_millis, index.num_docs());
    if stats.skipped_files > 0 {
        tracing::warn!(skipped = stats.skipped_files, "some files could not be read");
    }
    Ok(index)
}

fn query(config: &Config, index: &Index) {
    let hits = search_with_config(index, config.index.analyzer.tokenizer(), &config.search);
    for line in render(&hits) {
        println!("{line}");
    }
}

fn render(hits: &SearchHits) -> Vec<String> {
    let mut lines = vec![format!("hits: {}", hits.total_hits)];
    for hit in &hits.hits {
        lines.push(format!("{}\t{}", hit.document.path, format_score(hit.score)));
    }
    lines
}

fn format_score(score: f32) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{score:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use localsearch::{Document, Hit};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["localsearch", "run", "--data-dir", "notes", "-q", "rust", "-k", "3", "--analyzer", "cjk"]);
        let mut config = Config::default();
        match cli.command {
            Commands::Run { index, search } => {
                index.apply(&mut config);
                search.apply(&mut config);
            }
            _ => panic!("expected run"),
        }
        assert_eq!(config.index.data_dir, PathBuf::from("notes"));
        assert_eq!(config.index.index_dir, PathBuf::from("./index"));
        assert_eq!(config.index.analyzer, Analyzer::Cjk);
        assert_eq!(config.search.query, "rust");
        assert_eq!(config.search.max_results, 3);
    }

    #[test]
    fn search_only_takes_store_and_query_flags() {
        let cli = Cli::try_parse_from(["localsearch", "search", "--index-dir", "idx", "--analyzer", "english", "-q", "java"]).unwrap();
        let mut config = Config::default();
        match cli.command {
            Commands::Search { store, search } => {
                store.apply(&mut config);
                search.apply(&mut config);
            }
            _ => panic!("expected search"),
        }
        assert_eq!(config.index.index_dir, PathBuf::from("idx"));
        assert_eq!(config.index.analyzer, Analyzer::English);
        assert_eq!(config.search.query, "java");

        for flag in [["--data-dir", "notes"], ["--suffix", ".md"]] {
            assert!(Cli::try_parse_from(["localsearch", "search", flag[0], flag[1]]).is_err());
        }
        assert!(Cli::try_parse_from(["localsearch", "search", "--parallel"]).is_err());
    }

    #[test]
    fn renders_hit_count_then_results() {
        let hits = SearchHits {
            total_hits: 2,
            hits: vec![Hit { document: Document { id: 0, path: "/n/a.txt".into(), length: 3 }, score: 1.0 }],
        };
        assert_eq!(render(&hits), vec!["hits: 2".to_string(), "/n/a.txt\t1".to_string()]);
        assert_eq!(format_score(0.6931), "0.6931");
        assert_eq!(render(&SearchHits::default()), vec!["hits: 0".to_string()]);
    }
}
