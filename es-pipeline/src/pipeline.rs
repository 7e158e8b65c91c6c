//! Decode/drain state machine.
//!
//! ```text
//! Initializing ──► Streaming ──(end of stream)──► Draining ──(no picture)──► Terminated
//!                      │                                                       ▲
//!                      └──────────────────(fatal error)────────────────────────┘
//! ```
//!
//! While streaming, each step extracts one unit and submits it. Once the extractor reports
//! end of stream only empty sentinels are submitted, one per step, until the decoder has
//! nothing left to give.

use std::io::{Read, Seek};
use std::iter::FusedIterator;

use crate::{
    config::{PipelineConfig, StreamConfig},
    decoder::{FrameConverter, FrameDecoder},
    error::{PlaybackError, Result},
    extractor::{Extracted, Extractor},
    frame::DisplayFrame,
    packet::{Packet, PacketCmd},
    source::ByteSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initializing,
    Streaming,
    Draining,
    Terminated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Units handed to the decoder.
    pub packets: u64,
    /// Units rejected by the extractor and stepped over.
    pub skipped: u64,
    /// Units the decoder rejected.
    pub decode_errors: u64,
    /// Pictures lost to conversion errors.
    pub dropped: u64,
    pub sentinels: u64,
    pub pictures: u64,
}

/// Outcome of one controller step.
#[derive(Debug)]
pub enum Step {
    Frame(DisplayFrame),
    /// The step consumed input but produced nothing to show.
    NoPicture,
    Finished,
}

enum Submitted {
    Frame(DisplayFrame),
    NoPicture,
    // decoder produced a picture but it could not be converted
    Dropped(PlaybackError),
}

fn submit<D, C>(decoder: &mut D, converter: &mut C, cmd: PacketCmd<'_>) -> Result<Submitted>
where
    D: FrameDecoder,
    C: FrameConverter<D::Picture>,
{
    let Some(picture) = decoder.decode(cmd)? else {
        return Ok(Submitted::NoPicture);
    };
    match converter.convert(picture) {
        Ok(frame) => Ok(Submitted::Frame(frame)),
        Err(e) if e.is_recoverable() => Ok(Submitted::Dropped(e)),
        Err(e) => Err(e),
    }
}

struct Resources<R, D, C> {
    source: ByteSource<R>,
    decoder: D,
    converter: C,
}

pub struct Pipeline<R, D, C> {
    state: PipelineState,
    stream: StreamConfig,
    extractor: Extractor,
    packet: Packet,
    resources: Option<Resources<R, D, C>>,
    stats: PipelineStats,
}

impl<R, D, C> Pipeline<R, D, C>
where
    R: Read + Seek,
    D: FrameDecoder,
    C: FrameConverter<D::Picture>,
{
    /// Acquires everything the session needs, in order: the first start code, the decoder,
    /// the converter. Any failure drops what was already acquired and is returned as is.
    pub fn open<FD, FC>(
        config: &PipelineConfig,
        mut source: ByteSource<R>,
        open_decoder: FD,
        open_converter: FC,
    ) -> Result<Self>
    where
        FD: FnOnce(&StreamConfig) -> Result<D>,
        FC: FnOnce(&PipelineConfig) -> Result<C>,
    {
        let mut state = PipelineState::Initializing;
        config.validate()?;

        let mut extractor = Extractor::from_config(config);
        let first = extractor.align(&mut source)?;
        log::info!("first start code at offset {}", first);

        let decoder = open_decoder(&config.stream)?;
        let converter = open_converter(config)?;
        let packet = Packet::with_capacity(config.max_packet_size)?;

        log::debug!("pipeline {:?} -> {:?}", state, PipelineState::Streaming);
        state = PipelineState::Streaming;
        Ok(Self {
            state,
            stream: config.stream,
            extractor,
            packet,
            resources: Some(Resources {
                source,
                decoder,
                converter,
            }),
            stats: PipelineStats::default(),
        })
    }

    /// Same as [`Pipeline::open`] with collaborators that already exist.
    pub fn new(
        config: &PipelineConfig,
        source: ByteSource<R>,
        decoder: D,
        converter: C,
    ) -> Result<Self> {
        Self::open(config, source, |_| Ok(decoder), |_| Ok(converter))
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn stream(&self) -> &StreamConfig {
        &self.stream
    }

    /// Advances the state machine by one iteration.
    pub fn step(&mut self) -> Result<Step> {
        match self.state {
            PipelineState::Streaming => self.stream_step(),
            PipelineState::Draining => self.drain_step(),
            PipelineState::Initializing | PipelineState::Terminated => Ok(Step::Finished),
        }
    }

    /// Stops early and releases the source and collaborators.
    pub fn close(&mut self) {
        if self.state != PipelineState::Terminated {
            self.terminate();
        }
    }

    fn stream_step(&mut self) -> Result<Step> {
        let Some(res) = self.resources.as_mut() else {
            self.terminate();
            return Ok(Step::Finished);
        };

        match self.extractor.extract_next(&mut res.source, &mut self.packet) {
            Ok(Extracted::Packet(_)) => {
                self.stats.packets += 1;
                let cmd = self.packet.as_cmd();
                match submit(&mut res.decoder, &mut res.converter, cmd) {
                    Ok(Submitted::Frame(frame)) => Ok(Step::Frame(self.emit(frame))),
                    Ok(Submitted::NoPicture) => Ok(Step::NoPicture),
                    Ok(Submitted::Dropped(e)) => {
                        log::warn!("dropping picture: {}", e);
                        self.stats.dropped += 1;
                        Ok(Step::NoPicture)
                    }
                    Err(e) if e.is_recoverable() => {
                        log::warn!("unit at offset {} not decoded: {}", self.packet.offset(), e);
                        self.stats.decode_errors += 1;
                        Ok(Step::NoPicture)
                    }
                    Err(e) => self.fail(e),
                }
            }
            Ok(Extracted::EndOfStream) => {
                log::info!(
                    "end of stream after {} units, draining decoder",
                    self.stats.packets
                );
                self.transition(PipelineState::Draining);
                self.drain_step()
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("skipping unit at offset {}: {}", res.source.position(), e);
                self.extractor.skip_unit(&mut res.source);
                self.stats.skipped += 1;
                Ok(Step::NoPicture)
            }
            Err(e) => self.fail(e),
        }
    }

    fn drain_step(&mut self) -> Result<Step> {
        let Some(res) = self.resources.as_mut() else {
            self.terminate();
            return Ok(Step::Finished);
        };

        self.stats.sentinels += 1;
        match submit(&mut res.decoder, &mut res.converter, PacketCmd::Eof) {
            Ok(Submitted::Frame(frame)) => Ok(Step::Frame(self.emit(frame))),
            Ok(Submitted::Dropped(e)) => {
                log::warn!("dropping flushed picture: {}", e);
                self.stats.dropped += 1;
                Ok(Step::NoPicture)
            }
            Ok(Submitted::NoPicture) => {
                self.terminate();
                Ok(Step::Finished)
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("decoder flush failed: {}", e);
                self.terminate();
                Ok(Step::Finished)
            }
            Err(e) => self.fail(e),
        }
    }

    fn emit(&mut self, mut frame: DisplayFrame) -> DisplayFrame {
        frame.index = self.stats.pictures;
        self.stats.pictures += 1;
        frame
    }

    fn fail(&mut self, e: PlaybackError) -> Result<Step> {
        log::error!("pipeline stopped: {}", e);
        self.terminate();
        Err(e)
    }

    fn transition(&mut self, next: PipelineState) {
        log::debug!("pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn terminate(&mut self) {
        self.transition(PipelineState::Terminated);
        // releases decoder, converter and input
        self.resources = None;
        log::info!(
            "pipeline terminated: {} units, {} pictures, {} skipped, {} decode errors",
            self.stats.packets,
            self.stats.pictures,
            self.stats.skipped,
            self.stats.decode_errors
        );
    }
}

impl<R, D, C> Iterator for Pipeline<R, D, C>
where
    R: Read + Seek,
    D: FrameDecoder,
    C: FrameConverter<D::Picture>,
{
    type Item = Result<DisplayFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step() {
                Ok(Step::Frame(frame)) => return Some(Ok(frame)),
                Ok(Step::NoPicture) => continue,
                Ok(Step::Finished) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<R, D, C> FusedIterator for Pipeline<R, D, C>
where
    R: Read + Seek,
    D: FrameDecoder,
    C: FrameConverter<D::Picture>,
{
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
