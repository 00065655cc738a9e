//! # Swerve Kinematics Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use swerve_lib::swerve_ctrl::{
    desaturate, ChassisMotion, SwerveKinematics,
};

fn kinematics_benchmark(c: &mut Criterion) {
    // ---- Build the kinematics for a 0.5 m square vehicle ----

    let kinematics = SwerveKinematics::new(&[
        [0.25, 0.25],
        [0.25, -0.25],
        [-0.25, 0.25],
        [-0.25, -0.25],
    ])
    .unwrap();

    // A mixed translation and rotation demand which saturates the outside
    // modules
    let motion = ChassisMotion {
        vx_ms: 3.2,
        vy_ms: -1.1,
        omega_rads: 5.4,
    };

    c.bench_function("SwerveKinematics::to_module_states", |b| {
        b.iter(|| kinematics.to_module_states(black_box(&motion)))
    });

    let states = kinematics.to_module_states(&motion);

    c.bench_function("SwerveKinematics::to_chassis_motion", |b| {
        b.iter(|| kinematics.to_chassis_motion(black_box(&states)))
    });

    c.bench_function("desaturate", |b| {
        b.iter(|| {
            let mut states = black_box(states);
            desaturate(&mut states, 4.0)
        })
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);
