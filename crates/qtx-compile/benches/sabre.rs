//! Benchmarks for SABRE layout and routing.
//!
//! Run with: cargo bench -p qtx-compile

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qtx_compile::{CouplingMap, SabreLayout, SabreSwap, TranspilationContext};
use qtx_compile::Pass;
use qtx_ir::{Circuit, Gate, QubitId};

fn linear_entangling_circuit(n: usize) -> Circuit {
    let gates: Vec<Gate> = (0..n - 1).map(|i| Gate::Cz(QubitId(i as u32), QubitId((i + 1) as u32))).collect();
    Circuit::from_gates(n, gates).unwrap()
}

fn bench_sabre_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("sabre_layout");

    for &n in &[5, 10, 20, 50] {
        let coupling = CouplingMap::linear(n).unwrap();
        let circuit = linear_entangling_circuit(n);
        group.bench_with_input(BenchmarkId::new("linear_device", n), &n, |b, _| {
            b.iter(|| {
                let mut ctx = TranspilationContext::new();
                let pass = SabreLayout::new(coupling.clone()).with_seed(Some(1)).with_num_trials(4);
                black_box(pass.run(&circuit, &mut ctx).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_sabre_swap(c: &mut Criterion) {
    let mut group = c.benchmark_group("sabre_swap");

    for &n in &[5, 10, 20] {
        let coupling = CouplingMap::linear(n).unwrap();
        // Worst case for a linear device: every gate spans the two endpoints.
        let gates = vec![Gate::Cz(QubitId(0), QubitId((n - 1) as u32)); 4];
        let circuit = Circuit::from_gates(n, gates).unwrap();
        group.bench_with_input(BenchmarkId::new("linear_device", n), &n, |b, _| {
            b.iter(|| {
                let mut ctx = TranspilationContext::new();
                let pass = SabreSwap::new(coupling.clone()).with_seed(Some(1));
                black_box(pass.run(&circuit, &mut ctx).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sabre_layout, bench_sabre_swap);
criterion_main!(benches);
