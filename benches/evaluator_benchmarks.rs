use criterion::{Criterion, black_box, criterion_group, criterion_main};

use dictum::catalog::{Catalog, Mode, Tier};
use dictum::engine::evaluator::{compare_words, is_correct, normalize};

fn long_sentence(words: usize) -> String {
    let vocab = ["Quietly,", "the", "ferryman's", "lantern", "swung;", "rain", "kept", "falling."];
    (0..words)
        .map(|i| vocab[i % vocab.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_normalize(c: &mut Criterion) {
    let sentence = long_sentence(40);

    c.bench_function("normalize (40 words)", |b| {
        b.iter(|| normalize(black_box(&sentence)))
    });
}

fn bench_catalog_sentences(c: &mut Criterion) {
    let Ok(catalog) = Catalog::builtin() else {
        return;
    };
    let sentences = catalog.pool(Tier::VeryHard, Mode::Sentence).to_vec();
    let typed: Vec<String> = sentences.iter().map(|s| s.to_lowercase()).collect();

    c.bench_function("is_correct (builtin very-hard sentences)", |b| {
        b.iter(|| {
            sentences
                .iter()
                .zip(&typed)
                .filter(|(expected, user)| is_correct(black_box(user), black_box(expected)))
                .count()
        })
    });
}

fn bench_compare_words(c: &mut Criterion) {
    let expected = long_sentence(40);
    let typed: String = expected
        .split_whitespace()
        .enumerate()
        .filter(|(i, _)| i % 9 != 0)
        .map(|(i, w)| if i % 5 == 0 { "oops" } else { w })
        .collect::<Vec<_>>()
        .join(" ");

    c.bench_function("compare_words (40 words, with misses)", |b| {
        b.iter(|| compare_words(black_box(&typed), black_box(&expected)))
    });
}

criterion_group!(benches, bench_normalize, bench_catalog_sentences, bench_compare_words);
criterion_main!(benches);
