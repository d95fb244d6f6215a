//! Per-frame numeric state: rolling series, thresholds, presets and graphs.
//!
//! ## Submodules
//!
//! - [`series`]: Fixed-capacity rolling windows with window-max or decaying peaks
//! - [`average`]: The circular rolling average used for allocations
//! - [`threshold`]: Severity classification with self-correcting thresholds
//! - [`preset`]: Bit-packed module presets and the preset cycle
//! - [`graph`]: Graph state for the FPS, RAM, memory and allocation graphs
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "2s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! FrameSample
//!        │
//!        ▼
//! MetricStore::update()
//!        │
//!        ├──▶ GraphSet::update() (MetricSeries per graph, normalized by peak)
//!        │
//!        └──▶ ThresholdClassifier::classify() (Severity per module)
//! ```

pub mod average;
pub mod duration;
pub mod graph;
pub mod preset;
pub mod series;
pub mod threshold;

pub use average::{RollingAverage, ALLOCATION_AVERAGE_WINDOW};
pub use graph::{AllocationGraph, FpsGraph, GraphMode, GraphResolutions, GraphSet, StackedGraph};
pub use preset::{ModulePreset, PresetCycle};
pub use series::{MetricSeries, PeakPolicy};
pub use threshold::{Polarity, ThresholdClassifier};
