use localsearch::tokenizer::{tokenize, Analyzer, EnglishTokenizer, Tokenizer};

#[test]
fn it_is_case_insensitive() {
    assert_eq!(tokenize("Java Code"), tokenize("java code"));
    assert_eq!(tokenize("Java Code"), vec!["java", "code"]);
}

#[test]
fn greek_final_sigma_folds_like_other_sigmas() {
    assert_eq!(tokenize("ΣΑΣ"), vec!["σασ"]);
    assert_eq!(tokenize("ΣΑΣ"), tokenize("σασ"));
    assert_eq!(tokenize("ΟΔΟΣ οδοσ"), vec!["οδοσ", "οδοσ"]);
}

#[test]
fn it_splits_on_non_alphanumerics() {
    let words = tokenize("foo_bar-baz/qux.txt x2 don't");
    assert_eq!(words, vec!["foo", "bar", "baz", "qux", "txt", "x2", "don", "t"]);
}

#[test]
fn it_normalizes_unicode() {
    // Full-width letters fold to ASCII under NFKC.
    assert_eq!(tokenize("ＪＡＶＡ Café"), vec!["java", "café"]);
}

#[test]
fn punctuation_only_yields_nothing() {
    assert!(tokenize("?!... --- ,,;").is_empty());
    assert!(tokenize("").is_empty());
}

#[test]
fn it_filters_stopwords_in_english_mode() {
    let words = EnglishTokenizer.tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"quick".to_string()));
}

#[test]
fn every_analyzer_is_deterministic() {
    let text = "Running Runners RUN! 全文检索 in 2024";
    for analyzer in [Analyzer::Simple, Analyzer::English, Analyzer::Cjk] {
        let t = analyzer.tokenizer();
        assert_eq!(t.tokenize(text), t.tokenize(text));
        assert_eq!(t.tokenize(text), t.tokenize(&text.to_uppercase()));
    }
}
