use std::io::Write;

use es_pipeline::{
    PipelineConfig, PipelineState, PixelFormat, PlaybackError, Result, TrailingUnit,
    decoder::{FrameConverter, FrameDecoder},
    extractor::{Extracted, Extractor},
    frame::DisplayFrame,
    pacer::{ManualClock, Pacer},
    packet::{Packet, PacketCmd},
    pipeline::Pipeline,
    player::{PlaybackEnd, Player},
    scanner::START_CODE,
    sink::CollectSink,
    source::ByteSource,
};
use tokio_util::sync::CancellationToken;

fn write_stream(units: &[&[u8]], trailer: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for unit in units {
        file.write_all(&START_CODE).unwrap();
        file.write_all(unit).unwrap();
    }
    file.write_all(&START_CODE).unwrap();
    file.write_all(trailer).unwrap();
    file.flush().unwrap();
    file
}

struct PassThrough(Option<Vec<u8>>);

impl FrameDecoder for PassThrough {
    type Picture = Vec<u8>;

    fn decode(&mut self, cmd: PacketCmd<'_>) -> Result<Option<&Vec<u8>>> {
        self.0 = match cmd {
            PacketCmd::Data(data) => Some(data.to_vec()),
            PacketCmd::Eof => None,
        };
        Ok(self.0.as_ref())
    }
}

struct Wrap;

impl FrameConverter<Vec<u8>> for Wrap {
    fn convert(&mut self, picture: &Vec<u8>) -> Result<DisplayFrame> {
        Ok(DisplayFrame::new(picture.clone(), 1, 1, PixelFormat::Bgr24))
    }
}

#[test]
fn test_extract_from_file() {
    let file = write_stream(&[b"AAAA", b"BBBBBB"], b"C");
    let mut source = ByteSource::open(file.path()).unwrap();
    let mut extractor = Extractor::from_config(&PipelineConfig::default());
    let mut packet = Packet::with_capacity(42_000).unwrap();

    let mut units = Vec::new();
    while let Extracted::Packet(_) = extractor.extract_next(&mut source, &mut packet).unwrap() {
        units.push(packet.data().to_vec());
    }
    assert_eq!(units, vec![b"AAAA".to_vec(), b"BBBBBB".to_vec()]);
}

#[test]
fn test_play_file_with_trailing_unit() {
    let file = write_stream(&[b"one", b"two"], b"three");
    let config = PipelineConfig {
        trailing: TrailingUnit::Emit,
        ..Default::default()
    };
    let source = ByteSource::open(file.path()).unwrap();
    let mut pipeline = Pipeline::new(&config, source, PassThrough(None), Wrap).unwrap();

    let clock = ManualClock::new();
    let mut player = Player::new(Pacer::with_clock(&clock, config.stream.fps), CancellationToken::new());
    let mut sink = CollectSink::default();
    let summary = player.run(&mut pipeline, &mut sink).unwrap();

    assert_eq!(summary.end, PlaybackEnd::Drained);
    assert_eq!(summary.frames, 3);
    let shown: Vec<&[u8]> = sink.frames.iter().map(|f| f.data.as_ref()).collect();
    assert_eq!(shown, vec![b"one".as_slice(), b"two", b"three"]);
    assert_eq!(pipeline.state(), PipelineState::Terminated);
}

#[test]
fn test_open_missing_file() {
    let err = ByteSource::open("/no/such/dir/stream.h264").err().unwrap();
    assert!(matches!(err, PlaybackError::FileNotFound(_)));
}

#[cfg(feature = "ffmpeg")]
mod ffmpeg {
    use super::*;
    use es_pipeline::ffmpeg::{H264Decoder, SwsConverter, open_file};

    #[test]
    fn test_garbage_units_decode_to_nothing() {
        es_pipeline::init().unwrap();
        let file = write_stream(&[&[0xff; 64], &[0x80; 32]], b"");
        let pipeline = open_file(file.path(), &PipelineConfig::default()).unwrap();

        let frames: Vec<_> = pipeline.collect();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_input_without_start_code() {
        es_pipeline::init().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x42; 1024]).unwrap();
        file.flush().unwrap();

        let err = open_file(file.path(), &PipelineConfig::default()).err().unwrap();
        assert!(matches!(err, PlaybackError::NoBoundaryFound { .. }));
    }

    #[test]
    fn test_decoder_flush_without_input() {
        es_pipeline::init().unwrap();
        let mut decoder = H264Decoder::new(&PipelineConfig::default().stream).unwrap();
        assert!(decoder.decode(PacketCmd::Eof).unwrap().is_none());
        assert!(decoder.decode(PacketCmd::Eof).unwrap().is_none());
    }

    #[test]
    fn test_convert_grey_picture_to_bgr() {
        es_pipeline::init().unwrap();
        let config = PipelineConfig::default();
        let stream = config.stream;
        let mut converter = SwsConverter::new(&config).unwrap();

        let mut picture = ffmpeg_next::frame::Video::new(
            ffmpeg_next::format::Pixel::YUV420P,
            stream.width,
            stream.height,
        );
        for plane in 0..3 {
            picture.data_mut(plane).fill(128);
        }

        let frame = converter.convert(&picture).unwrap();
        assert_eq!((frame.width, frame.height), (640, 480));
        assert_eq!(frame.format, PixelFormat::Bgr24);
        assert_eq!(frame.data.len(), 640 * 480 * 3);
        assert!(frame.data.iter().all(|&b| (120..=136).contains(&b)));
    }
}
