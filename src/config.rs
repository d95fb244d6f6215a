//! Overlay configuration.
//!
//! Configuration is read with the `config` crate from an optional TOML file,
//! then overridden by `FRAMEWATCH__*` environment variables
//! (`FRAMEWATCH__FPS__GOOD_THRESHOLD=45`). Every field has a default, so an
//! empty file is a valid configuration.
//!
//! ```toml
//! mode = "light"
//!
//! [fps]
//! good_threshold = 60
//! caution_threshold = 30
//!
//! [[packets]]
//! id = 1
//! policy = "all"
//! message = "FPS dropped to {0}"
//! level = "warning"
//! conditions = [{ metric = "fps", comparator = "<", value = 20 }]
//! ```

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use framewatch_types::MetricId;

use crate::data::duration::parse_duration;
use crate::data::{GraphMode, GraphResolutions, ModulePreset, ThresholdClassifier};
use crate::debugger::{Comparator, DebugCondition, DebugPacket, EvaluationPolicy, MessageLevel};
use crate::error::Result;

/// Smallest graph resolution accepted.
pub const MIN_RESOLUTION: usize = 10;
/// Largest graph resolution accepted.
pub const MAX_RESOLUTION: usize = 300;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub mode: GraphMode,
    /// Start with the first preset applied instead of everything off.
    pub enable_on_startup: bool,
    pub fps: FpsConfig,
    pub ram: RamConfig,
    pub dev: DevConfig,
    /// Raw packed presets. Empty means the built-in progression.
    pub presets: Vec<u32>,
    pub packets: Vec<PacketConfig>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            mode: GraphMode::Full,
            enable_on_startup: true,
            fps: FpsConfig::default(),
            ram: RamConfig::default(),
            dev: DevConfig::default(),
            presets: Vec::new(),
            packets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FpsConfig {
    pub good_threshold: f64,
    pub caution_threshold: f64,
    pub graph_resolution: usize,
}

impl Default for FpsConfig {
    fn default() -> Self {
        Self {
            good_threshold: 60.0,
            caution_threshold: 30.0,
            graph_resolution: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RamConfig {
    pub graph_resolution: usize,
}

impl Default for RamConfig {
    fn default() -> Self {
        Self {
            graph_resolution: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    pub graph_resolution: usize,
    pub allocs_resolution: usize,
    pub critical_allocs_kb: f64,
    pub caution_allocs_kb: f64,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            graph_resolution: 150,
            allocs_resolution: 150,
            critical_allocs_kb: 50.0,
            caution_allocs_kb: 30.0,
        }
    }
}

/// One debug packet as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PacketConfig {
    pub id: u32,
    pub active: bool,
    pub conditions: Vec<ConditionConfig>,
    pub policy: EvaluationPolicy,
    pub execute_once: bool,
    pub initial_delay: String,
    pub repeat_delay: String,
    pub message: String,
    pub level: MessageLevel,
    /// File stem for a screenshot taken on fire.
    pub screenshot: Option<String>,
    pub debug_break: bool,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            id: 0,
            active: true,
            conditions: Vec::new(),
            policy: EvaluationPolicy::All,
            execute_once: true,
            initial_delay: "2s".to_string(),
            repeat_delay: "2s".to_string(),
            message: String::new(),
            level: MessageLevel::Log,
            screenshot: None,
            debug_break: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionConfig {
    pub metric: String,
    pub comparator: Comparator,
    pub value: f64,
}

impl PacketConfig {
    /// Build the runtime packet, validating metrics and durations.
    pub fn to_packet(&self) -> Result<DebugPacket> {
        let mut packet = DebugPacket::new(self.id)
            .active(self.active)
            .policy(self.policy)
            .execute_once(self.execute_once)
            .initial_delay(parse_duration(&self.initial_delay)?)
            .repeat_delay(parse_duration(&self.repeat_delay)?);

        for condition in &self.conditions {
            let metric: MetricId = condition.metric.parse()?;
            packet = packet.condition(DebugCondition::new(metric, condition.comparator, condition.value));
        }

        if self.debug_break {
            packet = packet.debug_break();
        }
        if !self.message.is_empty() {
            packet = packet.log(self.level, self.message.clone());
        }
        if let Some(stem) = &self.screenshot {
            packet = packet.screenshot(stem.clone());
        }
        Ok(packet)
    }
}

impl OverlayConfig {
    /// Load from an optional TOML file layered with environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("FRAMEWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::finish(config)
    }

    /// Parse a TOML document, without environment overrides.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self> {
        let mut overlay: OverlayConfig = config.try_deserialize()?;
        overlay.normalize();
        Ok(overlay)
    }

    /// Bring every value into its valid range. Never fails.
    pub fn normalize(&mut self) {
        for resolution in [
            &mut self.fps.graph_resolution,
            &mut self.ram.graph_resolution,
            &mut self.dev.graph_resolution,
            &mut self.dev.allocs_resolution,
        ] {
            let clamped = (*resolution).clamp(MIN_RESOLUTION, MAX_RESOLUTION);
            if clamped != *resolution {
                tracing::debug!(requested = *resolution, clamped, "Graph resolution out of range");
                *resolution = clamped;
            }
        }

        let fps = self.fps_thresholds();
        self.fps.good_threshold = fps.outer_threshold();
        self.fps.caution_threshold = fps.caution_threshold();

        let allocs = self.alloc_thresholds();
        self.dev.critical_allocs_kb = allocs.outer_threshold();
        self.dev.caution_allocs_kb = allocs.caution_threshold();
    }

    pub fn fps_thresholds(&self) -> ThresholdClassifier {
        ThresholdClassifier::higher_is_better(self.fps.good_threshold, self.fps.caution_threshold)
    }

    pub fn alloc_thresholds(&self) -> ThresholdClassifier {
        ThresholdClassifier::lower_is_better(
            self.dev.critical_allocs_kb,
            self.dev.caution_allocs_kb,
        )
    }

    /// Graph resolutions, capped by the rendering mode.
    pub fn resolutions(&self) -> GraphResolutions {
        GraphResolutions {
            fps: self.fps.graph_resolution,
            ram: self.ram.graph_resolution,
            dev: self.dev.graph_resolution,
            allocs: self.dev.allocs_resolution,
        }
        .capped(self.mode)
    }

    pub fn module_presets(&self) -> Vec<ModulePreset> {
        self.presets.iter().copied().map(ModulePreset::from_bits).collect()
    }

    /// Build every configured packet, failing on the first invalid one.
    pub fn debug_packets(&self) -> Result<Vec<DebugPacket>> {
        self.packets.iter().map(PacketConfig::to_packet).collect()
    }
}
