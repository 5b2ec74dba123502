use tracing::{info, instrument};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    raw::{RawImageData, RawImageReader, RawLoaderReader},
    tiff::{TiffWriter, StandardTiffWriter, ConversionConfig},
    debayer::{CpuDebayer, RgbImageData},
    capture_sharpen::{self, CfaPlane, Params, RgbImage, Roi, SensorPattern, SharpenFlags, SharpenParams, BAYER_RGGB},
};

/// RAW decode -> CPU debayer -> capture sharpen -> TIFF encode, mirroring
/// `RawToTiffPipeline`'s shape but with a CPU debayer and the sharpening
/// core always available in the build (no CUDA/NPP requirement).
pub struct SharpenPipeline<R: RawImageReader, W: TiffWriter> {
    reader: R,
    writer: W,
    debayer: CpuDebayer,
    config: ConversionConfig,
}

impl SharpenPipeline<RawLoaderReader, StandardTiffWriter> {
    pub fn new(config: ConversionConfig) -> Result<Self> {
        Self::with_custom(RawLoaderReader, StandardTiffWriter, config)
    }
}

impl<R: RawImageReader, W: TiffWriter> SharpenPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Result<Self> {
        let debayer = CpuDebayer::new()
            .map_err(|e| ConversionError::CudaError(format!("Failed to initialize CPU debayer: {}", e)))?;

        Ok(Self { reader, writer, debayer, config })
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        Ok(())
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<()> {
        info!("Starting RAW to sharpened TIFF conversion");

        let raw_image = {
            let _span = tracing::info_span!("decode_raw").entered();
            self.reader.read_raw(input_data)?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = raw_image.width,
                height = raw_image.height
            ).entered();
            self.validate_dimensions(raw_image.width, raw_image.height)?;
        }

        let mut rgb_image = {
            let _span = tracing::info_span!("debayer").entered();
            self.debayer
                .process(&raw_image)
                .map_err(|e| ConversionError::CudaError(format!("Debayering failed: {}", e)))?
        };

        if let Some(sharpen_params) = self.config.sharpen {
            let _span = tracing::info_span!("capture_sharpen").entered();
            apply_sharpen(&raw_image, &mut rgb_image, sharpen_params)?;
        }

        {
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_rgb_tiff(&rgb_image, output, &self.config)?;
        }

        info!(width = rgb_image.width, height = rgb_image.height, "Sharpened conversion complete");
        Ok(())
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, output_path: Q) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = std::fs::read(input_path)
            .map_err(|e| ConversionError::InputReadError(format!("{}: {}", input_path.display(), e)))?;
        let mut output_file = std::fs::File::create(output_path)
            .map_err(|e| ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e)))?;

        self.convert(&input_data, &mut output_file)
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}

/// Convert raw/RGB u16 planes to the f32 planes `capture_sharpen::sharpen`
/// operates on, run it, then write the sharpened values back.
fn apply_sharpen(raw_image: &RawImageData, rgb_image: &mut RgbImageData, sharpen_params: SharpenParams) -> Result<()> {
    let width = raw_image.width;
    let height = raw_image.height;
    let scale = u16::MAX as f32;

    let cfa_data: Vec<f32> = raw_image.data.iter().map(|&v| v as f32 / scale).collect();
    let cfa = CfaPlane::new(&cfa_data, width, height);

    let mut rgba_data = vec![0.0f32; width * height * 4];
    for (i, chunk) in rgb_image.data.chunks_exact(3).enumerate() {
        let base = i * 4;
        rgba_data[base] = chunk[0] as f32 / scale;
        rgba_data[base + 1] = chunk[1] as f32 / scale;
        rgba_data[base + 2] = chunk[2] as f32 / scale;
    }

    let mut params: Params = sharpen_params.into();
    {
        let mut rgba = RgbImage::new(&mut rgba_data, width, height);
        let roi = Roi::full(width, height);
        capture_sharpen::sharpen(
            &cfa,
            &mut rgba,
            roi,
            SensorPattern::Bayer { filters: BAYER_RGGB },
            raw_image.whitelevels,
            &mut params,
            SharpenFlags::default(),
            &|| false,
        )?;
    }

    for (i, chunk) in rgb_image.data.chunks_exact_mut(3).enumerate() {
        let base = i * 4;
        chunk[0] = (rgba_data[base] * scale).clamp(0.0, scale) as u16;
        chunk[1] = (rgba_data[base + 1] * scale).clamp(0.0, scale) as u16;
        chunk[2] = (rgba_data[base + 2] * scale).clamp(0.0, scale) as u16;
    }

    Ok(())
}
