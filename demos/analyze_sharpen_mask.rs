//! Dumps blend-mask and sigma-index statistics for a converted TIFF, to
//! help tune sharpening parameters by hand.

use std::collections::HashMap;

use ffed_protosat_rs::image_pipeline::capture_sharpen::{
    sharpen, CfaPlane, Params, RgbImage, Roi, SensorPattern, SharpenFlags, BAYER_RGGB,
};

fn main() -> anyhow::Result<()> {
    let mut decoder = tiff::decoder::Decoder::new(std::fs::File::open("output.tiff")?)?;
    let (width, height) = decoder.dimensions()?;
    let width = width as usize;
    let height = height as usize;

    println!("Image: {}x{} pixels", width, height);

    let image = decoder.read_image()?;
    let data = match image {
        tiff::decoder::DecodingResult::U16(data) => data,
        _ => anyhow::bail!("expected 16-bit RGB TIFF"),
    };

    let mut rgba: Vec<f32> = vec![0.0; width * height * 4];
    for (i, chunk) in data.chunks_exact(3).enumerate() {
        rgba[i * 4] = chunk[0] as f32 / u16::MAX as f32;
        rgba[i * 4 + 1] = chunk[1] as f32 / u16::MAX as f32;
        rgba[i * 4 + 2] = chunk[2] as f32 / u16::MAX as f32;
    }
    // Synthesize a CFA plane from luminance for demonstration purposes;
    // a real caller would carry the original raw plane alongside the TIFF.
    let cfa_data: Vec<f32> = (0..width * height)
        .map(|i| (rgba[i * 4] + rgba[i * 4 + 1] + rgba[i * 4 + 2]) / 3.0)
        .collect();

    let cfa = CfaPlane::new(&cfa_data, width, height);
    let mut rgb = RgbImage::new(&mut rgba, width, height);
    let roi = Roi::full(width, height);
    let mut params = Params { radius: 0.3, iterations: 0, boost: 0.2, center: 0.0, threshold: 0.2, white_balance: None };
    let flags = SharpenFlags { show_variance_mask: true, ..Default::default() };

    sharpen(
        &cfa,
        &mut rgb,
        roi,
        SensorPattern::Bayer { filters: BAYER_RGGB },
        [u16::MAX; 4],
        &mut params,
        flags,
        &|| false,
    )?;

    let mut histogram: HashMap<u8, usize> = HashMap::new();
    for k in 0..width * height {
        let [_r, _g, _b, a] = rgb.pixel(k);
        let bucket = (a * 10.0).clamp(0.0, 10.0) as u8;
        *histogram.entry(bucket).or_insert(0) += 1;
    }

    println!("Blend mask histogram (10 buckets over [0, 1]):");
    for bucket in 0..=10u8 {
        let count = histogram.get(&bucket).copied().unwrap_or(0);
        println!("  [{:>2}/10]: {}", bucket, count);
    }

    Ok(())
}
