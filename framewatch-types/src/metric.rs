//! Metric identifiers.

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::ModuleKind;

/// A metric that can be sampled, graphed and referenced by debug conditions.
///
/// Each metric is owned by exactly one [`ModuleKind`]; when that module is
/// switched off its metrics are unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MetricId {
    /// Current frames per second.
    Fps,
    /// 1% low frames per second.
    FpsMin,
    /// 0.1% low frames per second.
    FpsMax,
    /// Average frames per second.
    FpsAvg,
    /// Allocated RAM in MB.
    RamAllocated,
    /// Reserved RAM in MB.
    RamReserved,
    /// Managed heap size in MB.
    RamMono,
    /// Memory allocated by the graphics driver, in bytes.
    DevVideoMemory,
    DevTextureMemory,
    DevTextureCount,
    DevMeshMemory,
    DevMeshCount,
    DevMaterialMemory,
    DevMaterialCount,
    DevAssets,
    DevObjects,
    /// Number of GC allocations made this frame.
    DevAllocCount,
    /// Bytes of GC allocations made this frame.
    DevAllocs,
    /// Rolling average of [`MetricId::DevAllocs`], in KB.
    DevAllocsAvg,
    /// Loudest spectrum band in decibels.
    AudioDb,
}

impl MetricId {
    /// Every metric, grouped by module in declaration order.
    pub const ALL: [MetricId; 20] = [
        MetricId::Fps,
        MetricId::FpsMin,
        MetricId::FpsMax,
        MetricId::FpsAvg,
        MetricId::RamAllocated,
        MetricId::RamReserved,
        MetricId::RamMono,
        MetricId::DevVideoMemory,
        MetricId::DevTextureMemory,
        MetricId::DevTextureCount,
        MetricId::DevMeshMemory,
        MetricId::DevMeshCount,
        MetricId::DevMaterialMemory,
        MetricId::DevMaterialCount,
        MetricId::DevAssets,
        MetricId::DevObjects,
        MetricId::DevAllocCount,
        MetricId::DevAllocs,
        MetricId::DevAllocsAvg,
        MetricId::AudioDb,
    ];

    /// The module that produces this metric.
    pub fn module(self) -> ModuleKind {
        match self {
            MetricId::Fps | MetricId::FpsMin | MetricId::FpsMax | MetricId::FpsAvg => {
                ModuleKind::Fps
            }
            MetricId::RamAllocated | MetricId::RamReserved | MetricId::RamMono => ModuleKind::Ram,
            MetricId::AudioDb => ModuleKind::Audio,
            _ => ModuleKind::Dev,
        }
    }

    /// Stable snake_case name, as used in configuration files and frame dumps.
    pub fn name(self) -> &'static str {
        match self {
            MetricId::Fps => "fps",
            MetricId::FpsMin => "fps_min",
            MetricId::FpsMax => "fps_max",
            MetricId::FpsAvg => "fps_avg",
            MetricId::RamAllocated => "ram_allocated",
            MetricId::RamReserved => "ram_reserved",
            MetricId::RamMono => "ram_mono",
            MetricId::DevVideoMemory => "dev_video_memory",
            MetricId::DevTextureMemory => "dev_texture_memory",
            MetricId::DevTextureCount => "dev_texture_count",
            MetricId::DevMeshMemory => "dev_mesh_memory",
            MetricId::DevMeshCount => "dev_mesh_count",
            MetricId::DevMaterialMemory => "dev_material_memory",
            MetricId::DevMaterialCount => "dev_material_count",
            MetricId::DevAssets => "dev_assets",
            MetricId::DevObjects => "dev_objects",
            MetricId::DevAllocCount => "dev_alloc_count",
            MetricId::DevAllocs => "dev_allocs",
            MetricId::DevAllocsAvg => "dev_allocs_avg",
            MetricId::AudioDb => "audio_db",
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a metric name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetric(pub String);

impl fmt::Display for UnknownMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown metric: {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownMetric {}

impl FromStr for MetricId {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MetricId::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMetric(wanted.to_string()))
    }
}
