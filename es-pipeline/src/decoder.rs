//! Collaborator contracts the pipeline drives.

use crate::{error::Result, frame::DisplayFrame, packet::PacketCmd};

/// Turns compressed units into pictures.
///
/// Each call yields zero or one picture. The returned picture is borrowed from the decoder
/// and is gone by the next call. Malformed unit content is reported as
/// [`PlaybackError::Decode`](crate::error::PlaybackError::Decode); other errors are fatal.
pub trait FrameDecoder {
    type Picture;

    fn decode(&mut self, cmd: PacketCmd<'_>) -> Result<Option<&Self::Picture>>;
}

/// Converts a decoded picture into the session's display layout.
pub trait FrameConverter<P> {
    fn convert(&mut self, picture: &P) -> Result<DisplayFrame>;
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for Box<D> {
    type Picture = D::Picture;

    fn decode(&mut self, cmd: PacketCmd<'_>) -> Result<Option<&Self::Picture>> {
        (**self).decode(cmd)
    }
}

impl<P, C: FrameConverter<P> + ?Sized> FrameConverter<P> for Box<C> {
    fn convert(&mut self, picture: &P) -> Result<DisplayFrame> {
        (**self).convert(picture)
    }
}
