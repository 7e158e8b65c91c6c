use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Every failure the playback pipeline can report.
///
/// Startup failures (`FileNotFound` through `ConverterInitFailure`) abort the session.
/// Per-unit failures are skipped by the controller, see [`PlaybackError::is_recoverable`].
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("no start code found within the first {window} bytes")]
    NoBoundaryFound { window: usize },

    #[error("decoder not available: {0}")]
    UnsupportedCodec(String),

    #[error("unable to allocate decoder context")]
    ContextAllocationFailure,

    #[error("failed to open decoder: {0}")]
    DecoderOpenFailure(String),

    #[error("failed to initialise converter: {0}")]
    ConverterInitFailure(String),

    #[error("unit of {needed} bytes does not fit packet buffer of {capacity} bytes")]
    BufferTooSmall { needed: usize, capacity: usize },

    #[error("empty unit between adjacent start codes at offset {offset}")]
    CorruptFrame { offset: u64 },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unable to allocate {size} byte buffer")]
    AllocationFailure { size: usize },

    #[error("presentation sink failed: {0:#}")]
    Sink(anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PlaybackError {
    /// Recoverable errors skip the offending unit and leave the pipeline state untouched.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlaybackError::BufferTooSmall { .. }
                | PlaybackError::CorruptFrame { .. }
                | PlaybackError::Decode(_)
                | PlaybackError::Conversion(_)
        )
    }
}

impl From<serde_json::Error> for PlaybackError {
    fn from(e: serde_json::Error) -> Self {
        PlaybackError::Config(e.to_string())
    }
}
