use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use es_pipeline::{
    PixelFormat,
    frame::DisplayFrame,
    sink::{PresentationSink, SinkControl},
};
use jpeg_encoder::{ColorType, Encoder};

/// Running frame counter on stderr.
pub struct StatusSink<W = std::io::Stderr> {
    out: W,
    shown: u64,
}

impl StatusSink {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> StatusSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, shown: 0 }
    }
}

impl<W: Write> PresentationSink for StatusSink<W> {
    fn present(&mut self, _frame: &DisplayFrame) -> anyhow::Result<SinkControl> {
        self.shown += 1;
        write!(self.out, "\rframe {}", self.shown)?;
        self.out.flush()?;
        Ok(SinkControl::Continue)
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        if self.shown > 0 {
            writeln!(self.out)?;
        }
        Ok(())
    }
}

/// Dumps every `every`-th picture as `frame-NNNNNN.jpg`.
pub struct JpegSink {
    dir: PathBuf,
    every: u64,
    quality: u8,
    written: u64,
}

impl JpegSink {
    pub fn new(dir: impl AsRef<Path>, every: u64, quality: u8) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create jpeg dir {}", dir.display()))?;
        Ok(Self {
            dir,
            every: every.max(1),
            quality: quality.clamp(1, 100),
            written: 0,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn path_for(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame-{:06}.jpg", index))
    }
}

fn color_type(format: PixelFormat) -> anyhow::Result<ColorType> {
    match format {
        PixelFormat::Bgr24 => Ok(ColorType::Bgr),
        PixelFormat::Rgb24 => Ok(ColorType::Rgb),
        other => anyhow::bail!("cannot encode {} as jpeg", other.name()),
    }
}

impl PresentationSink for JpegSink {
    fn present(&mut self, frame: &DisplayFrame) -> anyhow::Result<SinkControl> {
        if frame.index % self.every != 0 {
            return Ok(SinkControl::Continue);
        }

        let width = u16::try_from(frame.width).context("frame too wide for jpeg")?;
        let height = u16::try_from(frame.height).context("frame too tall for jpeg")?;
        let path = self.path_for(frame.index);
        let encoder = Encoder::new_file(&path, self.quality)
            .with_context(|| format!("open {}", path.display()))?;
        encoder
            .encode(&frame.data, width, height, color_type(frame.format)?)
            .with_context(|| format!("encode {}", path.display()))?;
        self.written += 1;
        log::debug!("wrote {}", path.display());
        Ok(SinkControl::Continue)
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        log::info!("{} jpeg files in {}", self.written, self.dir.display());
        Ok(())
    }
}

/// Presents to every inner sink; quits as soon as one of them asks to.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn PresentationSink + Send>>,
}

impl FanoutSink {
    pub fn push(&mut self, sink: impl PresentationSink + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }
}

impl PresentationSink for FanoutSink {
    fn present(&mut self, frame: &DisplayFrame) -> anyhow::Result<SinkControl> {
        let mut control = SinkControl::Continue;
        for sink in &mut self.sinks {
            if sink.present(frame)? == SinkControl::Quit {
                control = SinkControl::Quit;
            }
        }
        Ok(control)
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        for sink in &mut self.sinks {
            sink.finish()?;
        }
        Ok(())
    }
}
