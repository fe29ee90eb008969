// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Trajectory Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use shield_core::field::dipole_field;
use shield_core::sweep::{dipole_for_sweep, simulate_energy};
use shield_types::config::SweepConfig;
use std::hint::black_box;

fn bench_dipole_field(c: &mut Criterion) {
    let config = SweepConfig::default();
    let dipole = dipole_for_sweep(&config).expect("dipole should build");
    c.bench_function("dipole_field_point", |b| {
        b.iter(|| {
            let field = dipole_field(black_box([-0.3, 0.02, 0.01]), &dipole)
                .expect("field should evaluate");
            black_box(field[2]);
        })
    });
}

fn bench_energy_trajectory(c: &mut Criterion) {
    let config = SweepConfig::default();
    let dipole = dipole_for_sweep(&config).expect("dipole should build");
    let mut group = c.benchmark_group("energy_trajectory");
    group.sample_size(20);

    for &energy_kev in &[1.0, 10.0, 100.0] {
        let label = format!("{energy_kev}keV");
        group.bench_function(&label, |b| {
            b.iter(|| {
                let run = simulate_energy(energy_kev, &config, &dipole)
                    .expect("trajectory should integrate");
                black_box(run.result.min_distance_m);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dipole_field, bench_energy_trajectory);
criterion_main!(benches);
