use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use sectree_core::hierarchy::{SpatialRules, build_hierarchy};
use sectree_core::normalize::{Normalizer, Session, ShapeRecord, SlideInfo};
use sectree_core::{Bounds, NormalizeParams, Section, SectionKind};

/// A slide with `blocks` columns of `per_block` stacked shapes, each column
/// grouped, and every pair of neighbouring shapes grouped again.
fn synthetic_session(blocks: usize, per_block: usize) -> Session {
    let mut session = Session::new(SlideInfo::new(1, 960.0, 540.0));
    for b in 0..blocks {
        let mut column = Vec::with_capacity(per_block);
        for k in 0..per_block {
            let id = format!("{b}-{k}");
            session.push_shape(ShapeRecord::new(
                id.clone(),
                10.0 + 60.0 * b as f64,
                5.0 + 10.0 * k as f64,
                50.0,
                8.0,
            ));
            column.push(id);
        }
        for pair in column.chunks(2) {
            session.push_group(format!("pair {b}"), pair.to_vec());
        }
        session.push_group(format!("column {b}"), column);
    }
    session
}

fn synthetic_sections(n: usize) -> Vec<Section> {
    (0..n)
        .map(|i| {
            let members: Vec<String> = (0..=i % 8).map(|m| format!("{}", i / 8 * 8 + m)).collect();
            Section::with_members(SectionKind::ShapeGroup, members, format!("s{i}"))
                .map(|s| s.bounds(Bounds::new(i as f64, (i % 8) as f64, 100.0, 100.0)))
                .unwrap_or_else(|e| panic!("synthetic section: {e}"))
        })
        .collect()
}

fn bench_build_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_hierarchy");
    for n in [64usize, 256, 1024] {
        let sections = synthetic_sections(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &sections, |b, sections| {
            b.iter(|| build_hierarchy(black_box(sections), &SpatialRules))
        });
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_session");
    let normalizer = Normalizer::new(NormalizeParams::default());
    for blocks in [4usize, 16] {
        let session = synthetic_session(blocks, 12);
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &session, |b, session| {
            b.iter(|| normalizer.run(black_box(session)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_hierarchy, bench_normalize);
criterion_main!(benches);
