use std::fmt::{Display, Formatter};

use bytes::Bytes;

use crate::config::PixelFormat;

/// Converted picture ready for presentation. Rows are tightly packed.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    // position in presentation order, starting at 0
    pub index: u64,
}

impl DisplayFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            data: Bytes::from(data),
            width,
            height,
            format,
            index: 0,
        }
    }

    pub fn stride(&self) -> usize {
        self.width as usize * self.format.packed_bytes_per_pixel().unwrap_or(1)
    }

    /// One row of pixels, `None` past the last row or a short buffer.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.stride();
        let start = y as usize * stride;
        self.data.get(start..start + stride)
    }
}

impl Display for DisplayFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "DisplayFrame index: {}, {}x{} {}, data_len: {}",
            self.index,
            self.width,
            self.height,
            self.format.name(),
            self.data.len()
        )
    }
}

/// Copies a strided plane into a tightly packed buffer.
pub fn pack_rows(src: &[u8], src_stride: usize, row_len: usize, rows: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(row_len * rows);
    for row in src.chunks(src_stride).take(rows) {
        out.extend_from_slice(&row[..row_len.min(row.len())]);
    }
    out
}
