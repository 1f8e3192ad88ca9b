//! Benchmarks comparing the concurrent and sequential executors.
//!
//! Run with: cargo bench -p stagehand-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::DynamicImage;
use stagehand_core::{Config, ExecutionMode, ImageTransforms, Pipeline};
use std::path::PathBuf;

/// Write `count` synthetic images under `<dir>/images/`.
fn fixture(dir: &std::path::Path, count: usize) -> Vec<PathBuf> {
    let images = dir.join("images");
    std::fs::create_dir_all(&images).unwrap();
    (0..count)
        .map(|i| {
            let path = images.join(format!("image{i}.png"));
            DynamicImage::new_rgb8(800, 600).save(&path).unwrap();
            path
        })
        .collect()
}

fn benchmark_modes(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let batch = fixture(dir.path(), 8);

    let config = Config::default();
    let pipeline = Pipeline::new(ImageTransforms::from_config(&config), &config);
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("pipeline_8_images");
    group.sample_size(10);
    for mode in [ExecutionMode::Concurrent, ExecutionMode::Sequential] {
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| {
                let report = rt
                    .block_on(pipeline.run(black_box(batch.clone()), mode))
                    .unwrap();
                assert_eq!(report.succeeded(), batch.len());
            })
        });
    }
    group.finish();
}

fn benchmark_transforms(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1920, 1080);
    let filter = image::imageops::FilterType::Lanczos3;

    c.bench_function("resize_1080p_to_500", |b| {
        b.iter(|| stagehand_core::pipeline::imaging::resize(black_box(&img), 500, 500, filter))
    });

    let small = DynamicImage::new_rgb8(500, 500);
    c.bench_function("grayscale_500", |b| {
        b.iter(|| stagehand_core::pipeline::imaging::grayscale(black_box(&small)))
    });
}

criterion_group!(benches, benchmark_modes, benchmark_transforms);
criterion_main!(benches);
