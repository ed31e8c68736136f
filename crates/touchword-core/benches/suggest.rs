use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use touchword_core::{KeyboardLayout, LexiconBuilder, Suggest, TraverseSession, TrieLexicon};

fn bench_lexicon() -> TrieLexicon {
    let mut b = LexiconBuilder::new();
    for (word, prob) in [
        ("the", 240),
        ("this", 180),
        ("these", 160),
        ("that", 190),
        ("those", 150),
        ("there", 185),
        ("their", 170),
        ("then", 165),
        ("they", 200),
        ("is", 220),
        ("it", 225),
        ("in", 230),
        ("he", 200),
        ("her", 190),
        ("here", 175),
        ("hers", 120),
        ("was", 210),
        ("with", 195),
        ("what", 180),
        ("when", 175),
    ] {
        b.add_word(word, prob);
    }
    b.add_bigram("he", "is", 210);
    b.add_bigram("this", "is", 200);
    b.build()
}

fn tap_input(typed: &str) -> (Vec<i32>, Vec<i32>, Vec<i32>, Vec<i32>, Vec<char>) {
    let code_points: Vec<char> = typed.chars().collect();
    let n = code_points.len();
    (
        vec![-1; n],
        vec![-1; n],
        (0..n as i32).map(|i| i * 100).collect(),
        vec![0; n],
        code_points,
    )
}

fn bench_suggest(c: &mut Criterion) {
    let lexicon = bench_lexicon();
    let layout = KeyboardLayout::qwerty();
    let suggest = Suggest::typing();

    let mut group = c.benchmark_group("suggest");
    for typed in ["this", "ths", "thsi", "hevis", "thhhiis"] {
        let (xs, ys, times, pointer_ids, code_points) = tap_input(typed);
        group.bench_with_input(BenchmarkId::from_parameter(typed), &typed, |bench, _| {
            bench.iter(|| {
                let mut session = TraverseSession::new(&lexicon, &layout);
                suggest.get_suggestions(
                    &mut session,
                    &xs,
                    &ys,
                    &times,
                    &pointer_ids,
                    &code_points,
                    0,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_suggest);
criterion_main!(benches);
