//! Screenshot pipeline benchmarks
//!
//! Measures the two CPU-bound steps between capture and response on a 2x
//! 4K-class frame (3840x2160): halving the resolution and PNG encoding.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use desktop_mcp::util::{
    encode::{encode_png, encode_png_with_compression},
    image_buffer::ImageBuffer,
};
use image::codecs::png::CompressionType;

fn create_4k_test_image() -> ImageBuffer {
    ImageBuffer::from_test_pattern(3840, 2160)
}

fn bench_downscale_half(c: &mut Criterion) {
    let img = create_4k_test_image();

    c.bench_function("downscale_half_4k", |b| {
        b.iter(|| black_box(&img).downscale_half());
    });
}

fn bench_png_encoding_fast(c: &mut Criterion) {
    let img = create_4k_test_image();

    c.bench_function("encode_png_fast_4k", |b| {
        b.iter(|| {
            encode_png(black_box(&img)).unwrap();
        });
    });
}

fn bench_png_encoding_default(c: &mut Criterion) {
    let img = create_4k_test_image();

    c.bench_function("encode_png_default_4k", |b| {
        b.iter(|| {
            encode_png_with_compression(black_box(&img), CompressionType::Default).unwrap();
        });
    });
}

// The path taken by a reduced full-screen screenshot on a Retina display
fn bench_reduced_screenshot_pipeline(c: &mut Criterion) {
    let img = create_4k_test_image();

    c.bench_function("downscale_then_encode_4k", |b| {
        b.iter(|| {
            let reduced = black_box(&img).downscale_half();
            encode_png(&reduced).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_downscale_half,
    bench_png_encoding_fast,
    bench_png_encoding_default,
    bench_reduced_screenshot_pipeline
);
criterion_main!(benches);
