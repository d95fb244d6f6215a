//! The overlay: module states, graphs and the debugger driven once per frame.

use std::collections::BTreeMap;

use framewatch_types::{FrameSample, MetricId, ModuleKind, ModuleState, Severity};

use crate::config::OverlayConfig;
use crate::data::duration::delta_from_secs;
use crate::data::{GraphSet, ModulePreset, PresetCycle};
use crate::debugger::{DebugEngine, FiredPacket};
use crate::error::Result;
use crate::sink::ActionSink;
use crate::source::{MetricSource, MetricStore};

/// Current and previous state of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ModuleSlot {
    current: ModuleState,
    previous: ModuleState,
}

/// What one tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Severity of the current frame rate, when the FPS module is running.
    pub fps: Option<Severity>,
    /// Severity of this frame's allocations (KB), when the dev module is running.
    pub allocations: Option<Severity>,
    /// Debug packets that fired this tick.
    pub fired: Vec<FiredPacket>,
}

/// Ties every piece together and runs them in a fixed order per frame:
/// metrics update, then graphs and classification, then rule evaluation.
///
/// Structural changes (module states, resolutions, packet lists) go through
/// `&mut self` and therefore always land between two ticks.
#[derive(Debug)]
pub struct Overlay {
    store: MetricStore,
    graphs: GraphSet,
    debugger: DebugEngine,
    presets: PresetCycle,
    modules: BTreeMap<ModuleKind, ModuleSlot>,
    active: bool,
}

impl Overlay {
    /// Build an overlay from configuration.
    ///
    /// The first preset is applied; with `enable_on_startup = false` the
    /// overlay then starts disabled, and [`Overlay::enable`] brings that
    /// preset back.
    pub fn new(config: &OverlayConfig) -> Result<Self> {
        let mut overlay = Self {
            store: MetricStore::new(),
            graphs: GraphSet::new(
                config.resolutions(),
                config.fps_thresholds(),
                config.alloc_thresholds(),
            ),
            debugger: DebugEngine::with_packets(config.debug_packets()?),
            presets: PresetCycle::new(config.module_presets()),
            modules: ModuleKind::ALL
                .into_iter()
                .map(|m| (m, ModuleSlot::default()))
                .collect(),
            active: true,
        };
        overlay.set_preset(overlay.presets.current());
        if !config.enable_on_startup {
            overlay.disable();
        }
        tracing::info!(
            packets = overlay.debugger.len(),
            presets = overlay.presets.presets().len(),
            active = overlay.active,
            "Overlay initialized"
        );
        Ok(overlay)
    }

    /// Run one frame.
    pub fn tick(&mut self, frame: &FrameSample, sink: &mut dyn ActionSink) -> TickReport {
        self.store.update(frame);

        self.graphs.update(&self.store);
        let fps = self
            .store
            .value(MetricId::Fps)
            .map(|fps| self.graphs.fps.classify(fps));
        let allocations = self
            .store
            .value(MetricId::DevAllocs)
            .map(|bytes| self.graphs.allocs.classify((bytes / 1024.0).floor()));

        let fired = self
            .debugger
            .tick(delta_from_secs(frame.delta_secs()), &self.store, sink);

        TickReport {
            fps,
            allocations,
            fired,
        }
    }

    pub fn module_state(&self, module: ModuleKind) -> ModuleState {
        self.modules
            .get(&module)
            .map(|slot| slot.current)
            .unwrap_or_default()
    }

    /// The state a module had before its last change.
    pub fn previous_module_state(&self, module: ModuleKind) -> ModuleState {
        self.modules
            .get(&module)
            .map(|slot| slot.previous)
            .unwrap_or_default()
    }

    pub fn set_module_state(&mut self, module: ModuleKind, state: ModuleState) {
        let slot = self.modules.entry(module).or_default();
        slot.previous = slot.current;
        slot.current = state;
        self.store.set_module_state(module, state);
        tracing::trace!(module = %module, from = ?slot.previous, to = ?state, "Module state changed");
    }

    /// Apply every module state stored in `preset`.
    pub fn set_preset(&mut self, preset: ModulePreset) {
        for (module, state) in preset.states() {
            self.set_module_state(module, state);
        }
    }

    /// Advance to the next preset, wrapping around.
    pub fn toggle_modes(&mut self) -> ModulePreset {
        let preset = self.presets.advance();
        tracing::debug!(index = self.presets.index(), bits = preset.bits(), "Switching preset");
        self.set_preset(preset);
        preset
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Switch every module off, remembering what each was showing.
    pub fn disable(&mut self) {
        if !self.active {
            return;
        }
        for module in ModuleKind::ALL {
            self.set_module_state(module, ModuleState::Off);
        }
        self.active = false;
    }

    /// Restore the states modules had before [`Overlay::disable`].
    pub fn enable(&mut self) {
        if self.active {
            return;
        }
        for module in ModuleKind::ALL {
            let previous = self.previous_module_state(module);
            self.set_module_state(module, previous);
        }
        self.active = true;
    }

    pub fn toggle_active(&mut self) {
        if self.active {
            self.disable();
        } else {
            self.enable();
        }
    }

    /// Re-apply configuration between ticks: thresholds, resolutions,
    /// presets and debug packets.
    ///
    /// Packets are validated first; on error nothing changes.
    pub fn apply_config(&mut self, config: &OverlayConfig) -> Result<()> {
        let packets = config.debug_packets()?;

        let fps = config.fps_thresholds();
        let classifier = self.graphs.fps.classifier_mut();
        classifier.set_good_threshold(fps.outer_threshold());
        classifier.set_caution_threshold(fps.caution_threshold());

        let allocs = config.alloc_thresholds();
        let classifier = self.graphs.allocs.classifier_mut();
        classifier.set_critical_threshold(allocs.outer_threshold());
        classifier.set_caution_threshold(allocs.caution_threshold());

        self.graphs.resize(config.resolutions());
        self.presets.replace(config.module_presets());
        self.debugger.replace_packets(packets);
        Ok(())
    }

    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    pub fn graphs(&self) -> &GraphSet {
        &self.graphs
    }

    pub fn graphs_mut(&mut self) -> &mut GraphSet {
        &mut self.graphs
    }

    pub fn debugger(&self) -> &DebugEngine {
        &self.debugger
    }

    pub fn debugger_mut(&mut self) -> &mut DebugEngine {
        &mut self.debugger
    }

    pub fn presets(&self) -> &PresetCycle {
        &self.presets
    }
}
