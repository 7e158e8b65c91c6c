use std::collections::VecDeque;

use ffmpeg_next::format::Pixel;

use crate::{
    config::StreamConfig,
    decoder::FrameDecoder,
    error::{PlaybackError, Result},
    packet::PacketCmd,
    scanner::START_CODE,
};

fn is_again(err: &ffmpeg_next::Error) -> bool {
    matches!(err, ffmpeg_next::Error::Other { errno } if *errno == ffmpeg_next::util::error::EAGAIN)
}

/// Software H.264 decoder fed with bare units.
///
/// Pictures the codec releases in bursts are queued and handed out one per call.
pub struct H264Decoder {
    inner: ffmpeg_next::codec::decoder::Video,
    // unit with its start code restored, as the codec expects Annex B input
    annexb: Vec<u8>,
    pending: VecDeque<ffmpeg_next::frame::Video>,
    current: Option<ffmpeg_next::frame::Video>,
    flushing: bool,
}

unsafe impl Send for H264Decoder {}

impl H264Decoder {
    pub fn new(stream: &StreamConfig) -> Result<Self> {
        let codec = ffmpeg_next::decoder::find(ffmpeg_next::codec::Id::H264)
            .ok_or_else(|| PlaybackError::UnsupportedCodec("h264".to_string()))?;

        let mut context = ffmpeg_next::codec::Context::new_with_codec(codec);
        unsafe {
            let ptr = context.as_mut_ptr();
            if ptr.is_null() {
                return Err(PlaybackError::ContextAllocationFailure);
            }
            (*ptr).width = stream.width as i32;
            (*ptr).height = stream.height as i32;
            (*ptr).pix_fmt = Pixel::from(stream.pixel_format).into();
        }

        let inner = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.video())
            .map_err(|e| PlaybackError::DecoderOpenFailure(e.to_string()))?;
        log::info!(
            "decoder opened: {} {}x{} {}",
            codec.name(),
            stream.width,
            stream.height,
            stream.pixel_format.name()
        );

        Ok(Self {
            inner,
            annexb: Vec::with_capacity(START_CODE.len()),
            pending: VecDeque::new(),
            current: None,
            flushing: false,
        })
    }

    fn send_unit(&mut self, payload: &[u8]) -> Result<()> {
        self.annexb.clear();
        self.annexb.extend_from_slice(&START_CODE);
        self.annexb.extend_from_slice(payload);
        let packet = ffmpeg_next::Packet::copy(&self.annexb);

        match self.inner.send_packet(&packet) {
            Ok(()) => Ok(()),
            // output is full, collect it and retry once
            Err(e) if is_again(&e) => {
                self.receive_all()?;
                self.inner
                    .send_packet(&packet)
                    .map_err(|e| PlaybackError::Decode(e.to_string()))
            }
            Err(e) => Err(PlaybackError::Decode(e.to_string())),
        }
    }

    fn receive_all(&mut self) -> Result<()> {
        loop {
            let mut frame = ffmpeg_next::frame::Video::empty();
            match self.inner.receive_frame(&mut frame) {
                Ok(()) => self.pending.push_back(frame),
                Err(ffmpeg_next::Error::Eof) => return Ok(()),
                Err(e) if is_again(&e) => return Ok(()),
                Err(e) => return Err(PlaybackError::Decode(e.to_string())),
            }
        }
    }
}

impl FrameDecoder for H264Decoder {
    type Picture = ffmpeg_next::frame::Video;

    fn decode(&mut self, cmd: PacketCmd<'_>) -> Result<Option<&Self::Picture>> {
        self.current = None;
        match cmd {
            PacketCmd::Data(payload) => self.send_unit(payload)?,
            PacketCmd::Eof => {
                if !self.flushing {
                    self.inner
                        .send_eof()
                        .map_err(|e| PlaybackError::Decode(e.to_string()))?;
                    self.flushing = true;
                }
            }
        }
        self.receive_all()?;
        self.current = self.pending.pop_front();
        Ok(self.current.as_ref())
    }
}
