//! FrameSample - the raw readings taken during one host frame.

use alloc::collections::BTreeMap;

use crate::{MetricId, ModuleKind};

/// Raw metric readings captured for a single frame.
///
/// Frames are produced by whatever talks to the host platform (profiler
/// recorders, allocator hooks, audio analysis) and are consumed once per
/// tick by the overlay. Metrics that were not captured are simply absent.
///
/// # Example
///
/// ```rust
/// use framewatch_types::{FrameSample, MetricId};
///
/// let frame = FrameSample::builder()
///     .delta_ms(33.3)
///     .value(MetricId::RamAllocated, 512.0)
///     .build();
///
/// assert!(frame.contains(MetricId::RamAllocated));
/// assert!(!frame.contains(MetricId::Fps));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameSample {
    /// Wall-clock duration of the frame in milliseconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub delta_ms: f64,

    /// Readings keyed by metric.
    #[cfg_attr(feature = "serde", serde(default))]
    pub values: BTreeMap<MetricId, f64>,
}

impl FrameSample {
    /// Create an empty frame.
    pub fn new(delta_ms: f64) -> Self {
        Self {
            delta_ms,
            values: BTreeMap::new(),
        }
    }

    /// Create a builder for constructing frames.
    pub fn builder() -> FrameSampleBuilder {
        FrameSampleBuilder::new()
    }

    /// Frame duration in seconds.
    pub fn delta_secs(&self) -> f64 {
        self.delta_ms / 1000.0
    }

    /// Reading for a metric, if it was captured.
    pub fn get(&self, metric: MetricId) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    /// Check whether a metric was captured.
    pub fn contains(&self, metric: MetricId) -> bool {
        self.values.contains_key(&metric)
    }

    /// Check whether the frame carries any reading for a module.
    pub fn has_module(&self, module: ModuleKind) -> bool {
        self.values.keys().any(|m| m.module() == module)
    }

    /// Number of captured readings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the frame has no readings.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all readings.
    pub fn iter(&self) -> impl Iterator<Item = (MetricId, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builder for `FrameSample`.
#[derive(Debug, Default)]
pub struct FrameSampleBuilder {
    delta_ms: f64,
    values: BTreeMap<MetricId, f64>,
}

impl FrameSampleBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame duration in milliseconds.
    pub fn delta_ms(mut self, delta_ms: f64) -> Self {
        self.delta_ms = delta_ms;
        self
    }

    /// Record a single reading.
    pub fn value(mut self, metric: MetricId, value: f64) -> Self {
        self.values.insert(metric, value);
        self
    }

    /// Record FPS readings using a closure.
    pub fn fps<F>(mut self, f: F) -> Self
    where
        F: FnOnce(FpsReadingsBuilder) -> FpsReadingsBuilder,
    {
        self.values.extend(f(FpsReadingsBuilder::default()).readings);
        self
    }

    /// Record RAM readings (MB).
    pub fn ram(self, allocated: f64, reserved: f64, mono: f64) -> Self {
        self.value(MetricId::RamAllocated, allocated)
            .value(MetricId::RamReserved, reserved)
            .value(MetricId::RamMono, mono)
    }

    /// Build the frame.
    pub fn build(self) -> FrameSample {
        FrameSample {
            delta_ms: self.delta_ms,
            values: self.values,
        }
    }
}

/// Builder for the FPS module's readings.
#[derive(Debug, Default)]
pub struct FpsReadingsBuilder {
    readings: BTreeMap<MetricId, f64>,
}

impl FpsReadingsBuilder {
    /// Set the current FPS.
    pub fn current(mut self, fps: f64) -> Self {
        self.readings.insert(MetricId::Fps, fps);
        self
    }

    /// Set the 1% low FPS.
    pub fn min(mut self, fps: f64) -> Self {
        self.readings.insert(MetricId::FpsMin, fps);
        self
    }

    /// Set the 0.1% low FPS.
    pub fn max(mut self, fps: f64) -> Self {
        self.readings.insert(MetricId::FpsMax, fps);
        self
    }

    /// Set the average FPS.
    pub fn avg(mut self, fps: f64) -> Self {
        self.readings.insert(MetricId::FpsAvg, fps);
        self
    }
}
