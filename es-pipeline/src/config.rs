use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlaybackError, Result};

/// At 10 Mbps and 30 fps one frame is about 42 KB.
pub const DEFAULT_SCAN_WINDOW: usize = 42_000;
pub const DEFAULT_MAX_PACKET_SIZE: usize = 42_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Yuv420p,
    Nv12,
    Bgr24,
    Rgb24,
}

impl PixelFormat {
    /// Bytes per pixel for interleaved layouts, `None` for planar ones.
    pub fn packed_bytes_per_pixel(&self) -> Option<usize> {
        match self {
            PixelFormat::Bgr24 | PixelFormat::Rgb24 => Some(3),
            PixelFormat::Yuv420p | PixelFormat::Nv12 => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Nv12 => "nv12",
            PixelFormat::Bgr24 => "bgr24",
            PixelFormat::Rgb24 => "rgb24",
        }
    }
}

/// Fixed description of the elementary stream. The stream carries no header we read,
/// so these values are supplied up front and never change during a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub pixel_format: PixelFormat,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            pixel_format: PixelFormat::Yuv420p,
        }
    }
}

/// What to do when a full lookahead window holds no start code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Give up after one window. A start code straddling the window edge is missed.
    Fixed,
    /// Double the window and rescan until `max_window` is reached.
    Grow { max_window: usize },
}

/// What happens to bytes after the last start code in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingUnit {
    Drop,
    /// Treat end of file as an implicit final boundary.
    Emit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub stream: StreamConfig,
    // layout handed to the presentation sink
    pub output_format: PixelFormat,
    pub scan_window: usize,
    pub max_packet_size: usize,
    pub scan_policy: ScanPolicy,
    pub trailing: TrailingUnit,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            output_format: PixelFormat::Bgr24,
            scan_window: DEFAULT_SCAN_WINDOW,
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            scan_policy: ScanPolicy::Fixed,
            trailing: TrailingUnit::Drop,
        }
    }
}

impl PipelineConfig {
    /// Loads a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlaybackError::FileNotFound(path.to_path_buf()),
            _ => PlaybackError::Io(e),
        })?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let stream = &self.stream;
        if stream.width == 0 || stream.height == 0 {
            return Err(PlaybackError::Config(format!(
                "invalid video size {}x{}",
                stream.width, stream.height
            )));
        }
        if stream.fps == 0 {
            return Err(PlaybackError::Config("fps must be positive".to_string()));
        }
        if self.output_format.packed_bytes_per_pixel().is_none() {
            return Err(PlaybackError::Config(format!(
                "output format {} is not interleaved",
                self.output_format.name()
            )));
        }
        if self.scan_window < crate::scanner::START_CODE.len() {
            return Err(PlaybackError::Config(format!(
                "scan window of {} bytes cannot hold a start code",
                self.scan_window
            )));
        }
        if self.max_packet_size == 0 {
            return Err(PlaybackError::Config(
                "max packet size must be positive".to_string(),
            ));
        }
        if let ScanPolicy::Grow { max_window } = self.scan_policy {
            if max_window < self.scan_window {
                return Err(PlaybackError::Config(format!(
                    "max window {} is smaller than scan window {}",
                    max_window, self.scan_window
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.stream.width, 640);
        assert_eq!(config.stream.height, 480);
        assert_eq!(config.stream.fps, 30);
        assert_eq!(config.stream.pixel_format, PixelFormat::Yuv420p);
        assert_eq!(config.output_format, PixelFormat::Bgr24);
        assert_eq!(config.scan_window, 42_000);
        assert_eq!(config.scan_policy, ScanPolicy::Fixed);
        assert_eq!(config.trailing, TrailingUnit::Drop);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"stream": {{"width": 1280, "height": 720}}, "scan_policy": {{"mode": "grow", "max_window": 1000000}}, "trailing": "emit"}}"#
        )
        .unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.stream.width, 1280);
        assert_eq!(config.stream.height, 720);
        assert_eq!(config.stream.fps, 30);
        assert_eq!(
            config.scan_policy,
            ScanPolicy::Grow {
                max_window: 1_000_000
            }
        );
        assert_eq!(config.trailing, TrailingUnit::Emit);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = PipelineConfig::default();
        config.stream.fps = 0;
        assert!(matches!(config.validate(), Err(PlaybackError::Config(_))));

        let mut config = PipelineConfig::default();
        config.output_format = PixelFormat::Yuv420p;
        assert!(matches!(config.validate(), Err(PlaybackError::Config(_))));

        let mut config = PipelineConfig::default();
        config.scan_policy = ScanPolicy::Grow { max_window: 10 };
        assert!(matches!(config.validate(), Err(PlaybackError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PlaybackError::FileNotFound(_)));
    }
}
