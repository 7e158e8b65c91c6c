use std::io::{Read, Seek};

use crate::error::Result;
use crate::source::ByteSource;

/// Annex B four byte start code.
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Offset of the first start code byte, relative to the scan origin.
    Found(usize),
    /// `scanned` bytes were searched; `reached_end` is set when the window ran past the
    /// end of the input.
    NotFound { scanned: usize, reached_end: bool },
}

impl Scan {
    pub fn offset(&self) -> Option<usize> {
        match self {
            Scan::Found(offset) => Some(*offset),
            Scan::NotFound { .. } => None,
        }
    }
}

pub fn find_start_code(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(START_CODE.len())
        .position(|window| window == START_CODE)
}

/// Bounded lookahead search with a reusable scratch buffer.
#[derive(Default)]
pub struct Scanner {
    buf: Vec<u8>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches `window` bytes from `from` without moving the committed cursor. Only start
    /// codes lying entirely inside the window are reported.
    pub fn scan<R: Read + Seek>(
        &mut self,
        source: &mut ByteSource<R>,
        from: u64,
        window: usize,
    ) -> Result<Scan> {
        // one byte past the window tells a full window apart from end of input
        let read = source.peek_at(from, window.saturating_add(1), &mut self.buf)?;
        let scanned = read.min(window);
        Ok(match find_start_code(&self.buf[..scanned]) {
            Some(offset) => Scan::Found(offset),
            None => Scan::NotFound {
                scanned,
                reached_end: read <= window,
            },
        })
    }
}

/// One-shot form of [`Scanner::scan`].
pub fn locate<R: Read + Seek>(
    source: &mut ByteSource<R>,
    from: u64,
    window: usize,
) -> Result<Option<usize>> {
    Ok(Scanner::new().scan(source, from, window)?.offset())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn source(bytes: &[u8]) -> ByteSource<Cursor<Vec<u8>>> {
        ByteSource::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn test_find_start_code() {
        assert_eq!(find_start_code(&[0, 0, 0, 1]), Some(0));
        assert_eq!(find_start_code(&[9, 0, 0, 0, 1, 7]), Some(1));
        assert_eq!(find_start_code(&[0, 0, 1, 0, 0, 0, 1]), Some(3));
        assert_eq!(find_start_code(&[0, 0, 1]), None);
        assert_eq!(find_start_code(&[]), None);
    }

    #[test]
    fn test_locate_relative_offset() {
        let mut src = source(&[0, 0, 0, 1, 0xaa, 0xbb, 0, 0, 0, 1, 0xcc]);
        assert_eq!(locate(&mut src, 0, 64).unwrap(), Some(0));
        assert_eq!(locate(&mut src, 1, 64).unwrap(), Some(5));
        assert_eq!(locate(&mut src, 7, 64).unwrap(), None);
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn test_straddling_start_code_is_missed() {
        // start code occupies bytes 4..8, window covers 0..6
        let mut src = source(&[1, 2, 3, 4, 0, 0, 0, 1]);
        let mut scanner = Scanner::new();
        assert_eq!(
            scanner.scan(&mut src, 0, 6).unwrap(),
            Scan::NotFound {
                scanned: 6,
                reached_end: false
            }
        );
        assert_eq!(scanner.scan(&mut src, 0, 8).unwrap(), Scan::Found(4));
    }

    #[test]
    fn test_window_ending_exactly_at_eof() {
        let mut src = source(&[1, 2, 3, 4, 5, 6]);
        let mut scanner = Scanner::new();
        assert_eq!(
            scanner.scan(&mut src, 0, 6).unwrap(),
            Scan::NotFound {
                scanned: 6,
                reached_end: true
            }
        );
        assert_eq!(
            scanner.scan(&mut src, 0, 5).unwrap(),
            Scan::NotFound {
                scanned: 5,
                reached_end: false
            }
        );
    }

    #[test]
    fn test_reached_end() {
        let mut src = source(&[1, 2, 3]);
        assert_eq!(
            Scanner::new().scan(&mut src, 0, 16).unwrap(),
            Scan::NotFound {
                scanned: 3,
                reached_end: true
            }
        );
    }
}
