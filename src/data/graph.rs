//! Graph-ready state for every module that draws one.
//!
//! Each graph owns its [`MetricSeries`] and knows how to scale its extras
//! (averages, threshold lines) onto the same 0..1 range as its samples.
//! Nothing here draws; a renderer reads the normalized views.

use serde::Deserialize;

use framewatch_types::{MetricId, ModuleKind, ModuleState, Severity};

use super::series::{MetricSeries, PeakPolicy};
use super::threshold::ThresholdClassifier;
use crate::source::{MetricSource, MetricStore};

const BYTES_IN_KB: f64 = 1024.0;

/// Rendering quality, which bounds how many points a graph may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphMode {
    #[default]
    Full,
    Light,
}

impl GraphMode {
    /// Largest point count a graph may use in this mode.
    pub fn max_points(self) -> usize {
        match self {
            GraphMode::Full => 512,
            GraphMode::Light => 128,
        }
    }
}

/// Requested point counts per graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphResolutions {
    pub fps: usize,
    pub ram: usize,
    pub dev: usize,
    pub allocs: usize,
}

impl Default for GraphResolutions {
    fn default() -> Self {
        Self {
            fps: 150,
            ram: 150,
            dev: 150,
            allocs: 150,
        }
    }
}

impl GraphResolutions {
    /// Cap every resolution to what `mode` can display.
    pub fn capped(self, mode: GraphMode) -> Self {
        let max = mode.max_points();
        Self {
            fps: self.fps.min(max),
            ram: self.ram.min(max),
            dev: self.dev.min(max),
            allocs: self.allocs.min(max),
        }
    }
}

/// Frame rate graph, scaled by the highest FPS in the window.
#[derive(Debug, Clone)]
pub struct FpsGraph {
    series: MetricSeries,
    classifier: ThresholdClassifier,
}

impl FpsGraph {
    pub fn new(resolution: usize, classifier: ThresholdClassifier) -> Self {
        Self {
            series: MetricSeries::new(resolution, PeakPolicy::WindowMax),
            classifier,
        }
    }

    pub fn series(&self) -> &MetricSeries {
        &self.series
    }

    pub fn classifier(&self) -> &ThresholdClassifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut ThresholdClassifier {
        &mut self.classifier
    }

    pub fn resize(&mut self, resolution: usize) {
        self.series.resize(resolution);
    }

    pub fn push(&mut self, fps: f64) {
        self.series.push_sample(fps);
    }

    /// Average FPS scaled onto the graph.
    pub fn normalized_average(&self, average: f64) -> f64 {
        self.series.normalize(average)
    }

    /// `(good, caution)` threshold lines scaled onto the graph.
    pub fn normalized_thresholds(&self) -> (f64, f64) {
        self.classifier.normalized(self.series.denominator())
    }

    pub fn classify(&self, fps: f64) -> Severity {
        self.classifier.classify(fps)
    }
}

/// Several series drawn on one shared scale.
///
/// The scale is the largest sample across all member series, so their
/// relative sizes stay comparable.
#[derive(Debug, Clone)]
pub struct StackedGraph {
    lines: Vec<(MetricId, MetricSeries)>,
}

impl StackedGraph {
    pub fn new(metrics: &[MetricId], resolution: usize) -> Self {
        Self {
            lines: metrics
                .iter()
                .map(|m| (*m, MetricSeries::new(resolution, PeakPolicy::WindowMax)))
                .collect(),
        }
    }

    /// RAM allocated, reserved and managed heap.
    pub fn ram(resolution: usize) -> Self {
        Self::new(
            &[MetricId::RamAllocated, MetricId::RamReserved, MetricId::RamMono],
            resolution,
        )
    }

    /// Video, texture and mesh memory.
    pub fn memory(resolution: usize) -> Self {
        Self::new(
            &[
                MetricId::DevVideoMemory,
                MetricId::DevTextureMemory,
                MetricId::DevMeshMemory,
            ],
            resolution,
        )
    }

    pub fn resize(&mut self, resolution: usize) {
        for (_, series) in &mut self.lines {
            series.resize(resolution);
        }
    }

    /// Push the current value of every member metric; missing readings push zero.
    pub fn update(&mut self, source: &dyn MetricSource) {
        for (metric, series) in &mut self.lines {
            series.push_sample(source.value(*metric).unwrap_or(0.0));
        }
    }

    pub fn series(&self, metric: MetricId) -> Option<&MetricSeries> {
        self.lines.iter().find(|(m, _)| *m == metric).map(|(_, s)| s)
    }

    /// The shared scale: the highest sample across every member series.
    pub fn denominator(&self) -> f64 {
        let highest = self
            .lines
            .iter()
            .map(|(_, s)| s.window_max())
            .fold(0.0, f64::max);
        if highest == 0.0 {
            1.0
        } else {
            highest
        }
    }

    /// One member's samples on the shared scale.
    pub fn normalized(&self, metric: MetricId) -> Option<impl ExactSizeIterator<Item = f64> + '_> {
        let denominator = self.denominator();
        self.series(metric).map(move |s| s.normalized_by(denominator))
    }
}

/// Per-frame allocation graph, in whole kilobytes, with a decaying ceiling.
#[derive(Debug, Clone)]
pub struct AllocationGraph {
    series: MetricSeries,
    classifier: ThresholdClassifier,
}

impl AllocationGraph {
    pub fn new(resolution: usize, classifier: ThresholdClassifier) -> Self {
        Self {
            series: MetricSeries::new(resolution, PeakPolicy::Decaying),
            classifier,
        }
    }

    pub fn series(&self) -> &MetricSeries {
        &self.series
    }

    pub fn classifier(&self) -> &ThresholdClassifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut ThresholdClassifier {
        &mut self.classifier
    }

    pub fn resize(&mut self, resolution: usize) {
        self.series.resize(resolution);
    }

    /// Push one frame's allocated bytes.
    pub fn push_bytes(&mut self, bytes: f64) {
        let kb = (bytes / BYTES_IN_KB).floor();
        self.series.push_sample(if kb.is_finite() { kb } else { 0.0 });
    }

    /// Average allocation (KB) scaled onto the graph.
    pub fn normalized_average(&self, average_kb: f64) -> f64 {
        self.series.normalize(average_kb)
    }

    /// `(critical, caution)` threshold lines scaled onto the graph.
    pub fn normalized_thresholds(&self) -> (f64, f64) {
        self.classifier.normalized(self.series.denominator())
    }

    /// Classify an allocation size given in KB.
    pub fn classify(&self, kb: f64) -> Severity {
        self.classifier.classify(kb)
    }
}

/// Every graph the overlay keeps.
#[derive(Debug, Clone)]
pub struct GraphSet {
    pub fps: FpsGraph,
    pub ram: StackedGraph,
    pub memory: StackedGraph,
    pub allocs: AllocationGraph,
    resolutions: GraphResolutions,
}

impl GraphSet {
    pub fn new(
        resolutions: GraphResolutions,
        fps_thresholds: ThresholdClassifier,
        alloc_thresholds: ThresholdClassifier,
    ) -> Self {
        Self {
            fps: FpsGraph::new(resolutions.fps, fps_thresholds),
            ram: StackedGraph::ram(resolutions.ram),
            memory: StackedGraph::memory(resolutions.dev),
            allocs: AllocationGraph::new(resolutions.allocs, alloc_thresholds),
            resolutions,
        }
    }

    pub fn resolutions(&self) -> GraphResolutions {
        self.resolutions
    }

    /// Apply new resolutions. Graphs whose resolution changed lose their history.
    pub fn resize(&mut self, resolutions: GraphResolutions) {
        if resolutions == self.resolutions {
            return;
        }
        tracing::debug!(?resolutions, "Resizing graphs");
        self.fps.resize(resolutions.fps);
        self.ram.resize(resolutions.ram);
        self.memory.resize(resolutions.dev);
        self.allocs.resize(resolutions.allocs);
        self.resolutions = resolutions;
    }

    /// Push this tick's readings into the graphs of modules shown in full.
    pub fn update(&mut self, store: &MetricStore) {
        let shows = |module: ModuleKind| store.module_state(module) == ModuleState::Full;

        if shows(ModuleKind::Fps) {
            self.fps.push(store.value(MetricId::Fps).unwrap_or(0.0));
        }
        if shows(ModuleKind::Ram) {
            self.ram.update(store);
        }
        if shows(ModuleKind::Dev) {
            self.memory.update(store);
            self.allocs
                .push_bytes(store.value(MetricId::DevAllocs).unwrap_or(0.0));
        }
    }
}
