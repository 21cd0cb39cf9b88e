//! Value table and policy benchmarks
//!
//! Hot paths, one call each per simulated timestep:
//! 1. StateKey::encode - percept to table key
//! 2. ValueTable::get - initialising read
//! 3. EpsilonGreedy::select - action choice over a warm table
//! 4. LearningUpdate::apply - overwrite and blended updates

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use smartcab_core::{Action, Light, Percept};
use smartcab_rl::{EpsilonGreedy, Knowledge, LearningUpdate, StateKey, Transition, ValueTable};

fn all_keys() -> Vec<StateKey> {
    StateKey::all().collect()
}

fn warm_knowledge() -> Knowledge {
    let mut knowledge = Knowledge::default();
    for (i, key) in all_keys().into_iter().enumerate() {
        knowledge.mark_visited(key);
        knowledge
            .table
            .set(key, Action::ALL[i % Action::COUNT], i as f64 * 0.1);
    }
    knowledge
}

// ============================================================================
// Encoding
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let percept = Percept {
        light: Light::Green,
        oncoming: Action::Left,
        left: Action::Forward,
        right: Action::Stay,
    };

    c.bench_function("state/encode", |b| {
        b.iter(|| StateKey::encode(black_box(&percept), black_box(Action::Right)))
    });

    let key = StateKey::encode(&percept, Action::Right);
    c.bench_function("state/display", |b| b.iter(|| black_box(&key).to_string()));
}

// ============================================================================
// Table access
// ============================================================================

fn bench_table_get(c: &mut Criterion) {
    let keys = all_keys();

    let mut group = c.benchmark_group("table/get");
    group.bench_function("cold", |b| {
        b.iter(|| {
            let mut table = ValueTable::default();
            for key in &keys {
                black_box(table.get(*key, Action::Forward));
            }
            table.len()
        })
    });

    let mut warm = warm_knowledge();
    group.bench_function("warm", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(warm.table.get(*key, Action::Forward));
            }
        })
    });
    group.finish();
}

// ============================================================================
// Policy
// ============================================================================

fn bench_select(c: &mut Criterion) {
    let keys = all_keys();

    let mut group = c.benchmark_group("policy/select");
    for epsilon in [0.0, 0.5, 1.0] {
        group.bench_with_input(BenchmarkId::from_parameter(epsilon), &epsilon, |b, &eps| {
            let mut knowledge = warm_knowledge();
            let mut rng = StdRng::seed_from_u64(17);
            b.iter(|| {
                for key in &keys {
                    black_box(EpsilonGreedy.select(&mut knowledge, *key, eps, &mut rng));
                }
            })
        });
    }
    group.finish();
}

// ============================================================================
// Updates
// ============================================================================

fn bench_apply(c: &mut Criterion) {
    let keys = all_keys();
    let transitions: Vec<Transition> = keys
        .iter()
        .zip(keys.iter().skip(1))
        .enumerate()
        .map(|(i, (s, next))| Transition::new(*s, Action::ALL[i % 4], 2.0, *next, false))
        .collect();

    let mut group = c.benchmark_group("learning/apply");
    for (name, rule) in [
        ("overwrite", LearningUpdate::overwrite()),
        ("blended", LearningUpdate::new(0.5, 0.9).expect("valid rule")),
    ] {
        group.bench_function(name, |b| {
            let mut table = ValueTable::default();
            b.iter(|| {
                for t in &transitions {
                    black_box(rule.apply(&mut table, t));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    name = table_benchmarks;
    config = Criterion::default();
    targets =
        bench_encode,
        bench_table_get,
        bench_select,
        bench_apply,
);

criterion_main!(table_benchmarks);
