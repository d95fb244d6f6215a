//! Channel-based frame source.
//!
//! The host pushes one [`FrameSample`] per rendered frame through a tokio
//! watch channel. The overlay only cares about the latest frame, so a slow
//! consumer sees the newest sample rather than a backlog.

use tokio::sync::watch;

use framewatch_types::FrameSample;

use super::FrameSource;

/// A frame source fed through a watch channel.
///
/// # Example
///
/// ```
/// use framewatch::{ChannelSource, FrameSource};
/// use framewatch_types::FrameSample;
///
/// let (tx, mut source) = ChannelSource::create("game loop");
/// tx.send(FrameSample::builder().delta_ms(16.0).build()).unwrap();
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<FrameSample>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Wrap the receiving end of a watch channel.
    ///
    /// Frames already marked seen by the receiver are not returned again. A
    /// frame sent just before the sender was dropped is still delivered; the
    /// source reports itself closed once nothing is left to read.
    pub fn new(receiver: watch::Receiver<FrameSample>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a channel pair, returning `(sender, source)`.
    pub fn create(source_description: &str) -> (watch::Sender<FrameSample>, Self) {
        let (tx, rx) = watch::channel(FrameSample::default());
        (tx, Self::new(rx, source_description))
    }
}

impl FrameSource for ChannelSource {
    fn poll(&mut self) -> Option<FrameSample> {
        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            Ok(false) => None,
            Err(_) => {
                let pending = {
                    let frame = self.receiver.borrow_and_update();
                    frame.has_changed().then(|| FrameSample::clone(&frame))
                };
                if pending.is_none() && !self.closed {
                    tracing::debug!(source = %self.description, "Frame sender dropped");
                    self.closed = true;
                }
                pending
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.closed.then_some("sender closed")
    }
}
