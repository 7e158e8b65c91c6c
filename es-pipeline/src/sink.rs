use crate::frame::DisplayFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    /// The viewer asked to stop.
    Quit,
}

/// Where paced pictures end up.
pub trait PresentationSink {
    fn present(&mut self, frame: &DisplayFrame) -> anyhow::Result<SinkControl>;

    /// Called once when playback stops, whether it drained, quit or failed.
    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<S: PresentationSink + ?Sized> PresentationSink for Box<S> {
    fn present(&mut self, frame: &DisplayFrame) -> anyhow::Result<SinkControl> {
        (**self).present(frame)
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        (**self).finish()
    }
}

/// Keeps every picture, optionally asking to quit after `limit` of them.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub frames: Vec<DisplayFrame>,
    pub limit: Option<usize>,
    pub finished: bool,
}

impl CollectSink {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }
}

impl PresentationSink for CollectSink {
    fn present(&mut self, frame: &DisplayFrame) -> anyhow::Result<SinkControl> {
        self.frames.push(frame.clone());
        match self.limit {
            Some(limit) if self.frames.len() >= limit => Ok(SinkControl::Quit),
            _ => Ok(SinkControl::Continue),
        }
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.finished = true;
        Ok(())
    }
}
