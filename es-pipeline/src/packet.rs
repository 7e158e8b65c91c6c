use std::io::{Read, Seek};

use crate::error::{PlaybackError, Result};
use crate::source::ByteSource;

/// What the controller hands to a decoder on each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketCmd<'a> {
    /// One compressed unit, start code excluded.
    Data(&'a [u8]),
    /// Empty sentinel used to flush buffered pictures after end of stream.
    Eof,
}

/// Caller-owned buffer for one compressed unit. Never grows past its capacity.
pub struct Packet {
    data: Vec<u8>,
    capacity: usize,
    offset: u64,
}

impl Packet {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| PlaybackError::AllocationFailure { size: capacity })?;
        Ok(Self {
            data,
            capacity,
            offset: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Input offset of the start code that opened this unit.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn as_cmd(&self) -> PacketCmd<'_> {
        PacketCmd::Data(&self.data)
    }

    pub(crate) fn fill<R: Read + Seek>(
        &mut self,
        source: &mut ByteSource<R>,
        unit_offset: u64,
        payload_offset: u64,
        len: usize,
    ) -> Result<()> {
        if len > self.capacity {
            return Err(PlaybackError::BufferTooSmall {
                needed: len,
                capacity: self.capacity,
            });
        }
        self.data.resize(len, 0);
        if let Err(e) = source.read_exact_at(payload_offset, &mut self.data) {
            self.data.clear();
            return Err(e);
        }
        self.offset = unit_offset;
        Ok(())
    }
}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("len", &self.data.len())
            .field("capacity", &self.capacity)
            .field("offset", &self.offset)
            .finish()
    }
}
