//! Where metric values come from.
//!
//! Two seams live here:
//!
//! - [`MetricSource`] is what the rule engine and graphs read: the current
//!   value of a metric and whether its module is running.
//! - [`FrameSource`] is what feeds the overlay: raw [`FrameSample`]s pushed
//!   through a channel or replayed from a recording.
//!
//! [`MetricStore`] sits between the two, holding the latest readings and the
//! per-module availability.

mod channel;
mod file;
mod store;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use store::MetricStore;

use std::fmt::Debug;

use framewatch_types::{FrameSample, MetricId, ModuleKind};

/// Read access to current metric values.
///
/// Any `Fn(MetricId) -> Option<f64>` is a source whose modules are always
/// active.
///
/// # Example
///
/// ```
/// use framewatch::MetricSource;
/// use framewatch_types::MetricId;
///
/// let source = |metric: MetricId| (metric == MetricId::Fps).then_some(58.0);
/// assert_eq!(source.value(MetricId::Fps), Some(58.0));
/// assert_eq!(source.value(MetricId::AudioDb), None);
/// ```
pub trait MetricSource {
    /// Current value of a metric, or `None` if it has no reading.
    fn value(&self, metric: MetricId) -> Option<f64>;

    /// Whether the module producing a metric is running.
    ///
    /// Metrics of inactive modules must be treated as unavailable.
    fn is_active(&self, module: ModuleKind) -> bool {
        let _ = module;
        true
    }
}

impl<F> MetricSource for F
where
    F: Fn(MetricId) -> Option<f64>,
{
    fn value(&self, metric: MetricId) -> Option<f64> {
        self(metric)
    }
}

/// Trait for receiving frame samples from various sources.
///
/// Implementations of this trait provide frames from different backends:
/// in-process channels fed by the host, or recordings replayed from disk.
///
/// # Example
///
/// ```
/// use framewatch::{FileSource, FrameSource};
///
/// let mut source = FileSource::new("frames.jsonl");
/// if let Some(frame) = source.poll() {
///     println!("Got {} readings", frame.len());
/// }
/// ```
pub trait FrameSource: Send + Debug {
    /// Poll for the next frame.
    ///
    /// Returns `Some(frame)` if a new frame is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<FrameSample>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if an error occurred during the last poll.
    fn error(&self) -> Option<&str>;
}
