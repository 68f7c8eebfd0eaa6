//! Benchmarks for the per-step integrity evaluation and the lattice stepper

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use braid_lab::prelude::*;

fn large_braid() -> (BraidStructure, StrandMaterial) {
    let geometry = BraidGeometry {
        num_strands: 16,
        num_layers: 30,
        radius: 0.15,
        pitch: 1.13,
        radius_taper: 0.0,
    };
    let material = StrandMaterial::rubber(0.005);
    let structure = BraidStructure::build(&geometry, &material).unwrap();
    (structure, material)
}

fn benchmark_integrity_evaluation(c: &mut Criterion) {
    let (structure, _) = large_braid();
    let positions = structure.initial_positions();
    let initial_bounds = BoundingBox::from_points(&positions).unwrap();
    let thresholds = FailureThresholds::default();

    c.bench_function("integrity_evaluate_16x30", |b| {
        let mut aggregator =
            IntegrityAggregator::new(structure.node_count(), structure.beam_count());
        aggregator.prime(structure.beams(), &positions);
        let mut time_passed = 0.0;
        b.iter(|| {
            time_passed += 0.01;
            let report = aggregator.evaluate(
                time_passed,
                structure.beams(),
                &positions,
                &initial_bounds,
                &thresholds,
            );
            black_box(report);
        })
    });
}

fn benchmark_lattice_step(c: &mut Criterion) {
    let (structure, material) = large_braid();

    c.bench_function("lattice_advance_16x30", |b| {
        let mut engine = LatticeEngine::new(&structure, &material, LatticeParams::default());
        b.iter(|| {
            engine.advance(0.0001);
            black_box(engine.time());
        })
    });
}

fn benchmark_monitored_step(c: &mut Criterion) {
    let (structure, material) = large_braid();

    c.bench_function("monitored_step_16x30", |b| {
        let mut engine = LatticeEngine::new(&structure, &material, LatticeParams::default());
        let initial_bounds = BoundingBox::from_points(engine.positions()).unwrap();
        let thresholds = FailureThresholds::default();
        let mut aggregator =
            IntegrityAggregator::new(structure.node_count(), structure.beam_count());
        aggregator.prime(structure.beams(), engine.positions());

        b.iter(|| {
            engine.advance(0.0001);
            let report = aggregator.evaluate(
                engine.time(),
                structure.beams(),
                engine.positions(),
                &initial_bounds,
                &thresholds,
            );
            black_box(report);
        })
    });
}

criterion_group!(
    benches,
    benchmark_integrity_evaluation,
    benchmark_lattice_step,
    benchmark_monitored_step,
);

criterion_main!(benches);
