//! Converter hot-path benchmarks
//!
//! The contract under test: `convert()` does no planning and no
//! allocation, so per-call cost should track the stage count alone.

use criterion::{criterion_group, criterion_main, black_box, Criterion};

use chromaflow::white_point::{D50, D65};
use chromaflow::{Color, Converter, RgbColorspace};

fn bench_assign(c: &mut Criterion) {
    let mut input = Color::lab(50.0, 20.0, -30.0, D50);
    let mut output = Color::lab(0.0, 0.0, 0.0, D50);
    let mut converter = Converter::new(&mut input, &mut output).unwrap();

    c.bench_function("convert/assign", |b| {
        b.iter(|| {
            converter.convert().unwrap();
            black_box(converter.output().values()[0])
        })
    });
}

fn bench_xyz_to_lab(c: &mut Criterion) {
    let mut input = Color::xyz(0.3, 0.4, 0.5, D65);
    let mut output = Color::lab(0.0, 0.0, 0.0, D65);
    let mut converter = Converter::new(&mut input, &mut output).unwrap();

    c.bench_function("convert/xyz_to_lab", |b| {
        b.iter(|| {
            converter.convert().unwrap();
            black_box(converter.output().values()[0])
        })
    });
}

fn bench_rgb_preset_change(c: &mut Criterion) {
    // Decode → fused matrix → encode
    let mut input = Color::rgb(0.35, 0.17, 0.63, RgbColorspace::SRGB);
    let mut output = Color::rgb(0.0, 0.0, 0.0, RgbColorspace::ADOBE_RGB);
    let mut converter = Converter::new(&mut input, &mut output).unwrap();

    c.bench_function("convert/srgb_to_adobe", |b| {
        b.iter(|| {
            converter.convert().unwrap();
            black_box(converter.output().values()[0])
        })
    });
}

fn bench_rgb_to_lab_with_cat(c: &mut Criterion) {
    let mut input = Color::rgb(0.35, 0.17, 0.63, RgbColorspace::SRGB);
    let mut output = Color::lab(0.0, 0.0, 0.0, D50);
    let mut converter = Converter::new(&mut input, &mut output).unwrap();

    c.bench_function("convert/srgb_to_lab_d50", |b| {
        b.iter(|| {
            converter.convert().unwrap();
            black_box(converter.output().values()[0])
        })
    });
}

fn bench_construction(c: &mut Criterion) {
    c.bench_function("construct/srgb_to_lab_d50", |b| {
        b.iter(|| {
            let mut input = Color::rgb(0.35, 0.17, 0.63, RgbColorspace::SRGB);
            let mut output = Color::lab(0.0, 0.0, 0.0, D50);
            let converter = Converter::new(&mut input, &mut output).unwrap();
            black_box(converter.stage_kinds().len())
        })
    });
}

criterion_group!(
    benches,
    bench_assign,
    bench_xyz_to_lab,
    bench_rgb_preset_change,
    bench_rgb_to_lab_with_cat,
    bench_construction,
);

criterion_main!(benches);
