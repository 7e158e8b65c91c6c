use ffmpeg_next::software::scaling::{Context, Flags};

use crate::{
    config::{PipelineConfig, PixelFormat},
    decoder::FrameConverter,
    error::{PlaybackError, Result},
    frame::{DisplayFrame, pack_rows},
};

pub struct Scaler {
    context: Context,
}

impl Scaler {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub fn run(
        &mut self,
        frame: &ffmpeg_next::frame::Video,
        dst: &mut ffmpeg_next::frame::Video,
    ) -> anyhow::Result<()> {
        self.context.run(frame, dst).map_err(|e| e.into())
    }
}

unsafe impl Send for Scaler {}

/// swscale conversion from the decoder's layout to the interleaved display layout, same
/// resolution on both sides.
pub struct SwsConverter {
    scaler: Scaler,
    output: ffmpeg_next::frame::Video,
    width: u32,
    height: u32,
    format: PixelFormat,
    row_len: usize,
}

unsafe impl Send for SwsConverter {}

impl SwsConverter {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let stream = &config.stream;
        let row_len = config
            .output_format
            .packed_bytes_per_pixel()
            .map(|bpp| bpp * stream.width as usize)
            .ok_or_else(|| {
                PlaybackError::ConverterInitFailure(format!(
                    "{} is not an interleaved format",
                    config.output_format.name()
                ))
            })?;

        let context = Context::get(
            stream.pixel_format.into(),
            stream.width,
            stream.height,
            config.output_format.into(),
            stream.width,
            stream.height,
            Flags::BICUBIC,
        )
        .map_err(|e| PlaybackError::ConverterInitFailure(e.to_string()))?;
        log::info!(
            "output: {}x{},{}",
            stream.width,
            stream.height,
            config.output_format.name()
        );

        Ok(Self {
            scaler: Scaler::new(context),
            output: ffmpeg_next::frame::Video::new(
                config.output_format.into(),
                stream.width,
                stream.height,
            ),
            width: stream.width,
            height: stream.height,
            format: config.output_format,
            row_len,
        })
    }
}

impl FrameConverter<ffmpeg_next::frame::Video> for SwsConverter {
    fn convert(&mut self, picture: &ffmpeg_next::frame::Video) -> Result<DisplayFrame> {
        self.scaler.run(picture, &mut self.output).map_err(|e| {
            PlaybackError::Conversion(format!(
                "{:#} ({}x{} {:?} in)",
                e,
                picture.width(),
                picture.height(),
                picture.format()
            ))
        })?;
        let data = pack_rows(
            self.output.data(0),
            self.output.stride(0),
            self.row_len,
            self.height as usize,
        );
        Ok(DisplayFrame::new(data, self.width, self.height, self.format))
    }
}
