//! Latest readings and module availability.

use std::collections::BTreeMap;

use framewatch_types::{FrameSample, MetricId, ModuleKind, ModuleState};

use super::MetricSource;
use crate::data::RollingAverage;

const BYTES_IN_KB: f64 = 1024.0;

/// Holds the most recent reading of every metric.
///
/// Frames are merged in: a metric missing from a frame keeps its previous
/// reading, like a profiler recorder that keeps its last valid value. Readings
/// of modules that are [`ModuleState::Off`] are neither stored nor served.
///
/// While the dev module is active, every frame adds one sample of
/// [`MetricId::DevAllocs`] in whole kilobytes to a [`RollingAverage`]. A frame
/// without an allocation reading samples the last known one, following the
/// merge rule above; nothing is sampled before the first reading. The derived
/// average is published as [`MetricId::DevAllocsAvg`] unless the frame
/// supplies that metric itself.
#[derive(Debug, Clone, Default)]
pub struct MetricStore {
    latest: BTreeMap<MetricId, f64>,
    states: BTreeMap<ModuleKind, ModuleState>,
    allocs_average: RollingAverage,
}

impl MetricStore {
    /// Create a store with every module off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a module.
    pub fn module_state(&self, module: ModuleKind) -> ModuleState {
        self.states.get(&module).copied().unwrap_or_default()
    }

    /// Change a module's state. Switching a module off drops its readings.
    pub fn set_module_state(&mut self, module: ModuleKind, state: ModuleState) {
        let previous = self.states.insert(module, state).unwrap_or_default();
        if previous.is_active() && !state.is_active() {
            tracing::debug!(module = %module, "Module switched off, dropping readings");
            self.latest.retain(|metric, _| metric.module() != module);
            if module == ModuleKind::Dev {
                self.allocs_average.clear();
            }
        }
    }

    /// Merge a frame's readings.
    pub fn update(&mut self, frame: &FrameSample) {
        for (metric, value) in frame.iter() {
            if self.module_state(metric.module()).is_active() {
                self.latest.insert(metric, value);
            }
        }

        if !self.module_state(ModuleKind::Dev).is_active() {
            return;
        }
        if let Some(bytes) = self.latest.get(&MetricId::DevAllocs).copied() {
            let kb = (bytes / BYTES_IN_KB).floor();
            let average = self.allocs_average.push(if kb.is_finite() { kb } else { 0.0 });
            if !frame.contains(MetricId::DevAllocsAvg) {
                self.latest.insert(MetricId::DevAllocsAvg, average);
            }
        }
    }

    /// Rolling allocation average in KB.
    pub fn allocation_average(&self) -> f64 {
        self.allocs_average.average()
    }

    /// Reading of a metric regardless of module state.
    pub fn raw(&self, metric: MetricId) -> Option<f64> {
        self.latest.get(&metric).copied()
    }
}

impl MetricSource for MetricStore {
    fn value(&self, metric: MetricId) -> Option<f64> {
        if !self.is_active(metric.module()) {
            return None;
        }
        self.raw(metric)
    }

    fn is_active(&self, module: ModuleKind) -> bool {
        self.module_state(module).is_active()
    }
}
