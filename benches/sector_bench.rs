use bevy::math::Vec2;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arsenal_core::geometry::{build_sector, segment_count, ArcSpan, Sweep};
use arsenal_core::presets;
use arsenal_core::target::TargetId;
use arsenal_core::weapon::Hand;

fn bench_sectors(c: &mut Criterion) {
    c.bench_function("build_sector_70deg", |b| {
        let segments = segment_count(70.0);
        b.iter(|| {
            build_sector(
                black_box(Vec2::ZERO),
                black_box(18.0),
                black_box(28.0),
                black_box(-0.6),
                black_box(0.6),
                segments,
            )
        })
    });

    c.bench_function("build_sector_full_ring", |b| {
        let segments = segment_count(360.0);
        b.iter(|| {
            build_sector(
                black_box(Vec2::new(3.0, -2.0)),
                black_box(10.0),
                black_box(40.0),
                0.0,
                std::f32::consts::TAU,
                segments,
            )
        })
    });
}

fn bench_sweep(c: &mut Criterion) {
    c.bench_function("sweep_240deg_to_completion", |b| {
        let arc = ArcSpan::centered(0.0, 240f32.to_radians());
        let segments = segment_count(240.0);
        b.iter(|| {
            let mut sweep = Sweep::new(Vec2::ZERO, 22.0, 40.0, arc, segments, 6.0, false);
            while !sweep.advance().is_complete() {}
            black_box(sweep.iterations())
        })
    });
}

fn bench_controller(c: &mut Criterion) {
    c.bench_function("sword_swing_with_contacts", |b| {
        let loadout = presets::crescent_sword();
        b.iter(|| {
            let mut weapon = loadout.controller();
            weapon.attack(Hand::Heavy, black_box(Vec2::new(30.0, 5.0))).ok();
            for i in 0..20 {
                weapon.tick(1.0 / 60.0);
                weapon.report_contact(TargetId(i % 4));
            }
            black_box(weapon.drain_events().len())
        })
    });

    c.bench_function("staff_full_charge_volley", |b| {
        let loadout = presets::arcane_staff();
        b.iter(|| {
            let mut weapon = loadout.controller();
            weapon.start_charge(Hand::Heavy, Vec2::X).ok();
            for _ in 0..150 {
                weapon.tick(1.0 / 60.0);
            }
            weapon.execute_charged_heavy(black_box(Vec2::new(50.0, 10.0))).ok();
            black_box(weapon.drain_events().len())
        })
    });
}

criterion_group!(benches, bench_sectors, bench_sweep, bench_controller);
criterion_main!(benches);
