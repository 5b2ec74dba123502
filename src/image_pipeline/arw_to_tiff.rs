mod error;
mod types;
mod reader;
mod writer;
mod rawloader_reader;
mod standard_tiff_writer;
mod pipeline;
mod timing;


pub use error::{ConversionError, Result};
pub use types::{RawImageData, ConversionConfig, TiffCompression, ConversionConfigBuilder};
pub use reader::RawImageReader;
pub use writer::TiffWriter;
pub use rawloader_reader::RawLoaderReader;
pub use standard_tiff_writer::StandardTiffWriter;
pub use pipeline::ArwToTiffPipeline;
pub use timing::{PipelineTimings, StepTiming, Timer};