//! Benchmarks for obs-scene
//!
//! Measures render traversal, enumeration and structural operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use obs_scene::{
    render_scene, GraphicsContext, MatrixStack, OrderMovement, Scene, Source, SourceRef,
    SourceRegistry,
};
use std::sync::Arc;

struct Solid(String);

impl Source for Solid {
    fn name(&self) -> &str {
        &self.0
    }

    fn video_render(&self, gfx: &mut dyn GraphicsContext) {
        black_box(gfx.current());
    }
}

fn solid(i: usize) -> SourceRef {
    Arc::new(Solid(format!("source-{i}")))
}

fn populated(count: usize) -> Scene {
    let scene = Scene::new("bench");
    for i in 0..count {
        if let Some(item) = scene.add(solid(i)) {
            item.set_pos(Vec2::new((i * 10) as f32, (i * 10) as f32));
            item.set_scale(Vec2::new(1.5, 1.5));
            item.set_rot(i as f32 * 0.1);
        }
    }
    scene
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for item_count in [10, 50, 100, 200].iter() {
        let scene = populated(*item_count);
        let mut stack = MatrixStack::new();

        group.bench_with_input(
            BenchmarkId::from_parameter(item_count),
            item_count,
            |b, _| {
                b.iter(|| scene.render(&mut stack));
            },
        );
    }

    group.finish();
}

fn bench_render_commands(c: &mut Criterion) {
    let scene = populated(100);

    c.bench_function("render_commands_100", |b| {
        b.iter(|| black_box(render_scene(&scene)));
    });
}

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumeration");

    for item_count in [10, 100].iter() {
        let scene = populated(*item_count);

        group.bench_with_input(
            BenchmarkId::from_parameter(item_count),
            item_count,
            |b, _| {
                b.iter(|| {
                    let mut count = 0;
                    scene.for_each(|_, _| {
                        count += 1;
                        true
                    });
                    black_box(count);
                });
            },
        );
    }

    group.finish();
}

fn bench_item_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_operations");

    group.bench_function("add_remove", |b| {
        let scene = populated(100);
        let source = solid(0);

        b.iter(|| {
            if let Some(item) = scene.add(source.clone()) {
                item.remove();
            }
        });
    });

    group.bench_function("set_order", |b| {
        let scene = populated(100);
        let items = scene.items();
        let mut idx = 0;

        b.iter(|| {
            let movement = match idx % 4 {
                0 => OrderMovement::Up,
                1 => OrderMovement::Down,
                2 => OrderMovement::Top,
                _ => OrderMovement::Bottom,
            };
            items[idx % items.len()].set_order(movement);
            idx += 1;
        });
    });

    group.bench_function("find_by_name", |b| {
        let scene = populated(100);

        b.iter(|| black_box(scene.find_by_name("source-99")));
    });

    group.finish();
}

fn bench_persistence(c: &mut Criterion) {
    let registry = SourceRegistry::new();
    for i in 0..50 {
        registry.register(solid(i));
    }
    let scene = populated(50);
    let records = scene.save();

    c.bench_function("save_50", |b| {
        b.iter(|| black_box(scene.save()));
    });

    c.bench_function("load_50", |b| {
        let target = Scene::new("target");
        b.iter(|| black_box(target.load(&records, &registry)));
    });
}

criterion_group!(
    benches,
    bench_render,
    bench_render_commands,
    bench_enumeration,
    bench_item_operations,
    bench_persistence
);
criterion_main!(benches);
