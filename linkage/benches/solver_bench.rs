//! Benchmarks for the linkage solver.
use std::{hint::black_box, str::FromStr};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use linkage::{Config, Scene, Strategy, textual::Problem};

/// General benchmark template.
/// Opens a given test case from the `test_cases`/ dir,
/// benchmarks running its drags.
fn bench_case(c: &mut Criterion, test_case: &'static str) {
    let txt = std::fs::read_to_string(format!("../test_cases/{test_case}/problem.txt")).unwrap();
    c.bench_function(&format!("drag_{test_case}"), |b| {
        let problem = Problem::from_str(txt.as_str()).unwrap();
        b.iter(|| {
            let _actual = black_box(problem.run(Config::default()).unwrap());
        });
    });
}

fn drag_four_bar(c: &mut Criterion) {
    bench_case(c, "four_bar");
}

fn drag_triangle(c: &mut Criterion) {
    bench_case(c, "triangle");
}

fn drag_contradictory(c: &mut Criterion) {
    bench_case(c, "contradictory");
}

/// The four-bar drag, once per solver strategy.
fn four_bar_by_strategy(c: &mut Criterion) {
    let mut group = c.benchmark_group("four_bar_by_strategy");
    for strategy in [Strategy::Relaxation, Strategy::GaussNewton, Strategy::Penalty] {
        let mut scene = Scene::new(Config::default().with_strategy(strategy)).unwrap();
        scene.add_point("a", 200.0, 100.0).unwrap();
        scene.add_point("b", 200.0, 300.0).unwrap();
        scene.add_point("c", 500.0, 400.0).unwrap();
        scene.add_point("d", 500.0, 100.0).unwrap();
        scene.link("a", "b").unwrap();
        scene.link("c", "d").unwrap();
        scene.link("b", "c").unwrap();
        scene.pin("a").unwrap();
        scene.pin("b").unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy),
            &scene,
            |b, scene| {
                b.iter(|| {
                    let mut scene = scene.clone();
                    let _actual = black_box(scene.displace("c", 50.0, 0.0).unwrap());
                });
            },
        );
    }
    group.finish();
}

/// A chain of links pinned at one end, dragged from the other.
fn drag_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag_chain");
    for num_links in [10u64, 50, 150] {
        let mut scene = Scene::default();
        for i in 0..=num_links {
            scene.add_point(&format!("p{i}"), i as f64 * 10.0, 0.0).unwrap();
        }
        for i in 0..num_links {
            scene
                .link(&format!("p{i}"), &format!("p{}", i + 1))
                .unwrap();
        }
        scene.pin("p0").unwrap();
        let last = format!("p{num_links}");

        // Each link has 2 points, each point has two coordinates.
        group.throughput(Throughput::Elements(num_links * 4));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_links),
            &scene,
            |b, scene| {
                b.iter(|| {
                    let mut scene = scene.clone();
                    let _actual = black_box(scene.displace(&last, 0.0, 25.0).unwrap());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    drag_four_bar,
    drag_triangle,
    drag_contradictory,
    four_bar_by_strategy,
    drag_chain,
);
criterion_main!(benches);
