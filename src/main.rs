use ffed_protosat_rs::logger::{self, error, info};
use ffed_protosat_rs::image_pipeline::{ConversionConfig, SharpenParams, SharpenPipeline, TiffCompression};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init();

    info!("Starting ffed_protosat...");

    let config = ConversionConfig::builder()
        .compression(TiffCompression::Lzw)
        .predictor(Some(2))
        .validate_dimensions(true)
        .debayer(true)
        .sharpen(Some(SharpenParams::default()))
        .build();

    let pipeline = SharpenPipeline::new(config)?;

    info!("RAW to sharpened TIFF pipeline initialized");
    info!("Compression: {:?}", pipeline.config().compression);

    match pipeline.convert_file("input.arw", "output.tiff") {
        Ok(_) => info!("Conversion successful!"),
        Err(e) => error!("Conversion failed: {}", e),
    }

    Ok(())
}
