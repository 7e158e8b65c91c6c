use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use es_pipeline::{PipelineConfig, PlaybackError, ScanPolicy, TrailingUnit};

#[derive(Parser, Debug)]
#[clap(name = "es-player")]
#[clap(about = "Play a raw start-code-delimited H.264 stream", long_about = None)]
pub struct Cli {
    /// Raw H.264 elementary stream
    pub input: PathBuf,

    /// JSON pipeline configuration, flags below take precedence
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[clap(long)]
    pub width: Option<u32>,
    #[clap(long)]
    pub height: Option<u32>,
    #[clap(long)]
    pub fps: Option<u32>,

    /// Lookahead window used to find the next start code
    #[clap(long, value_name = "BYTES")]
    pub scan_window: Option<usize>,

    #[clap(long, value_name = "BYTES")]
    pub max_packet_size: Option<usize>,

    /// Double the lookahead window up to MAX when it holds no start code
    #[clap(long, value_name = "MAX")]
    pub grow_window: Option<usize>,

    /// Decode the bytes after the last start code as a final unit
    #[clap(long)]
    pub emit_trailing: bool,

    /// Present pictures as fast as they decode
    #[clap(long)]
    pub no_pace: bool,

    /// Write presented pictures as JPEG files into DIR
    #[clap(long, value_name = "DIR")]
    pub jpeg_dir: Option<PathBuf>,

    #[clap(long, value_name = "N", default_value_t = 1)]
    pub jpeg_every: u64,

    #[clap(long, value_name = "Q", default_value_t = 85)]
    pub jpeg_quality: u8,
}

/// Turns a clap rejection into a usage error. Help and version requests are not errors.
pub fn usage_error(err: &clap::Error) -> Option<PlaybackError> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => Some(PlaybackError::Usage(err.render().to_string())),
    }
}

impl Cli {
    /// Defaults, then the config file, then flags.
    pub fn pipeline_config(&self) -> es_pipeline::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(width) = self.width {
            config.stream.width = width;
        }
        if let Some(height) = self.height {
            config.stream.height = height;
        }
        if let Some(fps) = self.fps {
            config.stream.fps = fps;
        }
        if let Some(window) = self.scan_window {
            config.scan_window = window;
        }
        if let Some(size) = self.max_packet_size {
            config.max_packet_size = size;
        }
        if let Some(max_window) = self.grow_window {
            config.scan_policy = ScanPolicy::Grow { max_window };
        }
        if self.emit_trailing {
            config.trailing = TrailingUnit::Emit;
        }
    }
}
