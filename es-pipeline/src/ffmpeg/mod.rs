//! FFmpeg-backed decoder and converter.

pub mod decoder;
pub mod scaler;

pub use decoder::H264Decoder;
pub use scaler::SwsConverter;

use std::fs::File;
use std::path::Path;

use ffmpeg_next::format::Pixel;

use crate::{
    config::{PipelineConfig, PixelFormat},
    error::Result,
    pipeline::Pipeline,
    source::ByteSource,
};

/// Registers FFmpeg components and quiets its own logging. Call once at startup.
pub fn init() -> anyhow::Result<()> {
    ffmpeg_next::init().map_err(|e| anyhow::anyhow!("ffmpeg_next init: {}", e))?;
    ffmpeg_next::util::log::set_level(ffmpeg_next::util::log::Level::Error);
    Ok(())
}

impl From<PixelFormat> for Pixel {
    fn from(format: PixelFormat) -> Self {
        match format {
            PixelFormat::Yuv420p => Pixel::YUV420P,
            PixelFormat::Nv12 => Pixel::NV12,
            PixelFormat::Bgr24 => Pixel::BGR24,
            PixelFormat::Rgb24 => Pixel::RGB24,
        }
    }
}

/// Pipeline over an input file with the FFmpeg collaborators.
pub type FilePipeline = Pipeline<File, H264Decoder, SwsConverter>;

/// Opens the input, finds its first start code, then opens the decoder and converter.
pub fn open_file(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<FilePipeline> {
    let source = ByteSource::open(path)?;
    Pipeline::open(config, source, H264Decoder::new, SwsConverter::new)
}
