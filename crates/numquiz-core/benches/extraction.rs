use criterion::{black_box, criterion_group, criterion_main, Criterion};

use numquiz_core::evaluator::AnswerEvaluator;
use numquiz_core::extractor::{levenshtein, NumberExtractor};

fn bench_extract(c: &mut Criterion) {
    let extractor = NumberExtractor::default();
    let mut group = c.benchmark_group("extract");

    // One input per strategy, from the cheapest to the fuzzy fallback.
    let cases = [
        ("exact_canonical", "dix-sept"),
        ("exact_correction", "c'est"),
        ("canonical_substring", "je pense que la réponse est quatorze"),
        ("correction_substring", "alors la carte"),
        ("digits", "12"),
        ("fuzzy", "quatr"),
        ("not_found", "pomme"),
        ("hesitation", "euh"),
    ];

    for (name, transcript) in cases {
        group.bench_function(name, |b| b.iter(|| extractor.extract(black_box(transcript))));
    }

    let long = "alors euh ".repeat(40) + "onze";
    group.bench_function("long_transcript", |b| {
        b.iter(|| extractor.extract(black_box(&long)))
    });

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let evaluator = AnswerEvaluator::default();
    let transcripts: Vec<String> = (0..=20).map(|n| n.to_string()).collect();

    c.bench_function("evaluate_quiz_range", |b| {
        b.iter(|| {
            for (expected, transcript) in transcripts.iter().enumerate() {
                black_box(evaluator.evaluate(transcript, expected as u32));
            }
        })
    });
}

fn bench_levenshtein(c: &mut Criterion) {
    c.bench_function("levenshtein", |b| {
        b.iter(|| levenshtein(black_box("quatorze"), black_box("quatrorse")))
    });
}

criterion_group!(benches, bench_extract, bench_evaluate, bench_levenshtein);
criterion_main!(benches);
