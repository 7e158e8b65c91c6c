//! Playback of raw, start-code-delimited H.264 elementary streams.
//!
//! ```text
//! ByteSource ─► Extractor ─► FrameDecoder ─► FrameConverter ─► Pacer ─► PresentationSink
//!               (Scanner)    └────────────── Pipeline ───────────┘      └──── Player ────┘
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod extractor;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod frame;
pub mod pacer;
pub mod packet;
pub mod pipeline;
pub mod player;
pub mod scanner;
pub mod sink;
pub mod source;

pub use config::{PipelineConfig, PixelFormat, ScanPolicy, StreamConfig, TrailingUnit};
pub use error::{PlaybackError, Result};
pub use pipeline::{Pipeline, PipelineState};

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::init;
