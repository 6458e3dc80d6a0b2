use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\p{Alphabetic}\p{N}]+").expect("valid regex");
    static ref CJK: Regex = Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        // Contractions are split by the word pattern, so only bare forms are listed.
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Turns raw text into a sequence of normalized terms.
///
/// Implementations must be pure: the same input always yields the same terms.
/// The index and the query side must use the same tokenizer.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Name used in configuration and logs.
    fn name(&self) -> &'static str;
}

/// Splits on non-alphanumeric boundaries and lower-cases every token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}

/// Simple tokenization followed by stopword removal and English stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTokenizer;

impl Tokenizer for EnglishTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|t| !is_stopword(t))
            .map(|t| STEMMER.stem(&t).into_owned())
            .collect()
    }

    fn name(&self) -> &'static str {
        "english"
    }
}

/// Like [`SimpleTokenizer`], but Han, Hiragana and Katakana runs are emitted
/// one character per term, since those scripts do not separate words with spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct CjkTokenizer;

impl Tokenizer for CjkTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for token in tokenize(text) {
            if !CJK.is_match(&token) {
                out.push(token);
                continue;
            }
            let mut rest = String::new();
            for ch in token.chars() {
                let mut buf = [0u8; 4];
                if CJK.is_match(ch.encode_utf8(&mut buf)) {
                    if !rest.is_empty() {
                        out.push(std::mem::take(&mut rest));
                    }
                    out.push(ch.to_string());
                } else {
                    rest.push(ch);
                }
            }
            if !rest.is_empty() {
                out.push(rest);
            }
        }
        out
    }

    fn name(&self) -> &'static str {
        "cjk"
    }
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text using NFKC normalization and lowercasing, splitting on anything
/// that is not a letter or a digit. Empty tokens never appear in the output.
pub fn tokenize(text: &str) -> Vec<String> {
    // Per-character lowercasing: `str::to_lowercase` maps a word-final sigma to
    // `ς`, which would make "ΣΑΣ" and "σασ" different terms.
    let normalized: String = text.nfkc().flat_map(char::to_lowercase).collect();
    WORD.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

/// Tokenizer selection as it appears in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analyzer {
    #[default]
    Simple,
    English,
    Cjk,
}

impl Analyzer {
    pub fn tokenizer(self) -> Arc<dyn Tokenizer> {
        match self {
            Analyzer::Simple => Arc::new(SimpleTokenizer),
            Analyzer::English => Arc::new(EnglishTokenizer),
            Analyzer::Cjk => Arc::new(CjkTokenizer),
        }
    }
}

impl FromStr for Analyzer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Analyzer::Simple),
            "english" => Ok(Analyzer::English),
            "cjk" => Ok(Analyzer::Cjk),
            other => Err(format!("unknown analyzer '{other}' (expected simple, english or cjk)")),
        }
    }
}

impl fmt::Display for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Analyzer::Simple => "simple",
            Analyzer::English => "english",
            Analyzer::Cjk => "cjk",
        })
    }
}
