use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ffed_protosat_rs::image_pipeline::capture_sharpen::{
    sharpen, CfaPlane, Params, RgbImage, Roi, SensorPattern, SharpenFlags, BAYER_RGGB,
};

fn checkerboard(width: usize, height: usize) -> (Vec<f32>, Vec<f32>) {
    let mut cfa = vec![0.2f32; width * height];
    let mut rgba = vec![0.0f32; width * height * 4];
    for row in 0..height {
        for col in 0..width {
            let k = row * width + col;
            let v = if (row + col) % 8 < 4 { 0.2 } else { 0.6 };
            cfa[k] = v;
            rgba[k * 4] = v;
            rgba[k * 4 + 1] = v;
            rgba[k * 4 + 2] = v;
        }
    }
    (cfa, rgba)
}

fn benchmark_sharpen_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_sharpen_by_size");

    for (width, height, label) in [(128, 128, "128x128"), (256, 256, "256x256"), (512, 512, "512x512")] {
        let (cfa_data, rgba_data) = checkerboard(width, height);

        group.bench_with_input(BenchmarkId::from_parameter(label), &(cfa_data, rgba_data), |b, (cfa_data, rgba_data)| {
            b.iter(|| {
                let cfa = CfaPlane::new(cfa_data, width, height);
                let mut rgba = rgba_data.clone();
                let mut rgb = RgbImage::new(&mut rgba, width, height);
                let roi = Roi::full(width, height);
                let mut params = Params { radius: 0.3, iterations: 3, boost: 0.2, center: 0.1, threshold: 0.2, white_balance: None };
                let _ = sharpen(
                    black_box(&cfa),
                    &mut rgb,
                    roi,
                    SensorPattern::Bayer { filters: BAYER_RGGB },
                    [u16::MAX; 4],
                    &mut params,
                    SharpenFlags::default(),
                    &|| false,
                );
            });
        });
    }

    group.finish();
}

fn benchmark_iteration_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_sharpen_iterations");
    let width = 256;
    let height = 256;
    let (cfa_data, rgba_data) = checkerboard(width, height);

    for iterations in [1u32, 3, 6] {
        group.bench_with_input(BenchmarkId::from_parameter(iterations), &iterations, |b, &iterations| {
            b.iter(|| {
                let cfa = CfaPlane::new(&cfa_data, width, height);
                let mut rgba = rgba_data.clone();
                let mut rgb = RgbImage::new(&mut rgba, width, height);
                let roi = Roi::full(width, height);
                let mut params = Params { radius: 0.3, iterations, boost: 0.0, center: 0.0, threshold: 0.2, white_balance: None };
                let _ = sharpen(
                    black_box(&cfa),
                    &mut rgb,
                    roi,
                    SensorPattern::Bayer { filters: BAYER_RGGB },
                    [u16::MAX; 4],
                    &mut params,
                    SharpenFlags::default(),
                    &|| false,
                );
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_sharpen_sizes, benchmark_iteration_count);
criterion_main!(benches);
