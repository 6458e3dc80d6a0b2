use criterion::{criterion_group, criterion_main, Criterion};
use localsearch::tokenizer::{tokenize, EnglishTokenizer, Tokenizer};

const TEXT: &str = include_str!("../src/tokenizer.rs");

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_simple", |b| b.iter(|| tokenize(TEXT)));
    c.bench_function("tokenize_english", |b| b.iter(|| EnglishTokenizer.tokenize(TEXT)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
