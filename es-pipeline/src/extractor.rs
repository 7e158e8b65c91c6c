use std::io::{Read, Seek};

use crate::{
    config::{PipelineConfig, ScanPolicy, TrailingUnit},
    error::{PlaybackError, Result},
    packet::Packet,
    scanner::{START_CODE, Scan, Scanner},
    source::ByteSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted {
    /// A unit of this many bytes is now in the packet buffer.
    Packet(usize),
    EndOfStream,
}

/// Cuts the input into units delimited by consecutive start codes.
pub struct Extractor {
    window: usize,
    policy: ScanPolicy,
    trailing: TrailingUnit,
    scanner: Scanner,
    // end of the unit rejected by the last call, consumed by `skip_unit`
    rejected_end: Option<u64>,
}

impl Extractor {
    pub fn new(window: usize, policy: ScanPolicy, trailing: TrailingUnit) -> Self {
        Self {
            window,
            policy,
            trailing,
            scanner: Scanner::new(),
            rejected_end: None,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.scan_window, config.scan_policy, config.trailing)
    }

    fn find_boundary<R: Read + Seek>(
        &mut self,
        source: &mut ByteSource<R>,
        from: u64,
    ) -> Result<Scan> {
        let mut window = self.window;
        loop {
            let scan = self.scanner.scan(source, from, window)?;
            match (scan, self.policy) {
                (Scan::NotFound { reached_end: false, .. }, ScanPolicy::Grow { max_window })
                    if window < max_window =>
                {
                    let next = window.saturating_mul(2).min(max_window);
                    log::debug!(
                        "no start code within {} bytes of offset {}, growing window to {}",
                        window,
                        from,
                        next
                    );
                    window = next;
                }
                _ => return Ok(scan),
            }
        }
    }

    /// Moves the committed cursor onto the first start code at or after it.
    pub fn align<R: Read + Seek>(&mut self, source: &mut ByteSource<R>) -> Result<u64> {
        let from = source.position();
        match self.find_boundary(source, from)? {
            Scan::Found(offset) => {
                let boundary = from + offset as u64;
                if boundary > from {
                    log::warn!("skipped {} leading bytes before first start code", offset);
                }
                source.commit(boundary);
                Ok(boundary)
            }
            Scan::NotFound { .. } => Err(PlaybackError::NoBoundaryFound {
                window: self.window,
            }),
        }
    }

    /// Reads the unit starting at the committed cursor into `packet` and commits the cursor
    /// to the next start code. `BufferTooSmall` and `CorruptFrame` leave the cursor where
    /// it was; call [`Extractor::skip_unit`] to step over the rejected unit.
    pub fn extract_next<R: Read + Seek>(
        &mut self,
        source: &mut ByteSource<R>,
        packet: &mut Packet,
    ) -> Result<Extracted> {
        self.rejected_end = None;
        packet.clear();

        if !source.is_aligned() {
            match self.align(source) {
                Ok(_) => {}
                Err(PlaybackError::NoBoundaryFound { .. }) => return Ok(Extracted::EndOfStream),
                Err(e) => return Err(e),
            }
        }

        let start = source.position();
        // step past the current start code so it is not matched again
        let from = start + 1;
        let (end, at_eof) = match self.find_boundary(source, from)? {
            Scan::Found(offset) => (from + offset as u64, false),
            Scan::NotFound {
                scanned,
                reached_end: true,
            } if self.trailing == TrailingUnit::Emit => (from + scanned as u64, true),
            Scan::NotFound { .. } => return Ok(Extracted::EndOfStream),
        };

        let payload_offset = start + START_CODE.len() as u64;
        let len = end.saturating_sub(payload_offset) as usize;
        if len == 0 {
            if at_eof {
                return Ok(Extracted::EndOfStream);
            }
            self.rejected_end = Some(end);
            return Err(PlaybackError::CorruptFrame { offset: start });
        }
        if len > packet.capacity() {
            self.rejected_end = Some(end);
            return Err(PlaybackError::BufferTooSmall {
                needed: len,
                capacity: packet.capacity(),
            });
        }

        packet.fill(source, start, payload_offset, len)?;
        source.commit(end);
        log::trace!("unit at {} len {}", start, len);
        Ok(Extracted::Packet(len))
    }

    /// Steps over the unit rejected by the previous `extract_next` call. Returns false when
    /// there was nothing to skip.
    pub fn skip_unit<R: Read + Seek>(&mut self, source: &mut ByteSource<R>) -> bool {
        match self.rejected_end.take() {
            Some(end) => {
                log::debug!("skipping unit {}..{}", source.position(), end);
                source.commit(end);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod extractor_test;
