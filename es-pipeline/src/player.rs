use std::io::{Read, Seek};

use tokio_util::sync::CancellationToken;

use crate::{
    decoder::{FrameConverter, FrameDecoder},
    error::{PlaybackError, Result},
    pacer::{Clock, MonotonicClock, Pacer},
    pipeline::{Pipeline, PipelineStats},
    sink::{PresentationSink, SinkControl},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The decoder was drained.
    Drained,
    /// The sink asked to stop.
    Quit,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub frames: u64,
    pub end: PlaybackEnd,
    pub stats: PipelineStats,
}

/// Drives a pipeline to completion: pull, pace, present, count.
pub struct Player<K = MonotonicClock> {
    pacer: Pacer<K>,
    cancel: CancellationToken,
}

impl<K: Clock> Player<K> {
    pub fn new(pacer: Pacer<K>, cancel: CancellationToken) -> Self {
        Self { pacer, cancel }
    }

    pub fn run<R, D, C, S>(
        &mut self,
        pipeline: &mut Pipeline<R, D, C>,
        sink: &mut S,
    ) -> Result<PlaybackSummary>
    where
        R: Read + Seek,
        D: FrameDecoder,
        C: FrameConverter<D::Picture>,
        S: PresentationSink + ?Sized,
    {
        let mut frames = 0u64;
        let outcome = self.play(pipeline, sink, &mut frames);

        pipeline.close();
        // finished on every path, failed playback included
        let finished = sink.finish().map_err(PlaybackError::Sink);
        let end = outcome?;
        finished?;
        Ok(PlaybackSummary {
            frames,
            end,
            stats: pipeline.stats(),
        })
    }

    fn play<R, D, C, S>(
        &mut self,
        pipeline: &mut Pipeline<R, D, C>,
        sink: &mut S,
        frames: &mut u64,
    ) -> Result<PlaybackEnd>
    where
        R: Read + Seek,
        D: FrameDecoder,
        C: FrameConverter<D::Picture>,
        S: PresentationSink + ?Sized,
    {
        loop {
            // the only cancellation point, checked once per pass
            if self.cancel.is_cancelled() {
                log::info!("playback cancelled after {} frames", frames);
                return Ok(PlaybackEnd::Cancelled);
            }

            let frame = match pipeline.next() {
                Some(frame) => frame?,
                None => return Ok(PlaybackEnd::Drained),
            };

            self.pacer.wait();
            let control = sink.present(&frame).map_err(PlaybackError::Sink)?;
            *frames += 1;
            log::debug!("presented frame {}", frames);

            if control == SinkControl::Quit {
                log::info!("quit requested after {} frames", frames);
                return Ok(PlaybackEnd::Quit);
            }
        }
    }
}
