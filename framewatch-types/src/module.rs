//! Overlay modules, their display states and severity bands.

use core::fmt;

/// One of the independently switchable overlay modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModuleKind {
    Fps,
    Ram,
    Audio,
    Advanced,
    Dev,
}

impl ModuleKind {
    /// Every module, in display order.
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Fps,
        ModuleKind::Ram,
        ModuleKind::Audio,
        ModuleKind::Advanced,
        ModuleKind::Dev,
    ];

    /// Short label for log lines.
    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Fps => "fps",
            ModuleKind::Ram => "ram",
            ModuleKind::Audio => "audio",
            ModuleKind::Advanced => "advanced",
            ModuleKind::Dev => "dev",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How much of a module is shown.
///
/// The discriminants are the values stored in packed presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum ModuleState {
    /// Module disabled; its metrics are not sampled.
    #[default]
    Off = 0,
    /// Text and graphs.
    Full = 1,
    /// Text only.
    Text = 2,
    /// Reduced text only.
    Basic = 3,
    /// Sampled but not displayed.
    Background = 4,
}

impl ModuleState {
    /// Raw field value.
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Decode a raw field value. Returns `None` for values outside the enumeration.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(ModuleState::Off),
            1 => Some(ModuleState::Full),
            2 => Some(ModuleState::Text),
            3 => Some(ModuleState::Basic),
            4 => Some(ModuleState::Background),
            _ => None,
        }
    }

    /// Whether the module's monitor is running in this state.
    pub fn is_active(self) -> bool {
        self != ModuleState::Off
    }

    /// Whether graphs are drawn (and therefore series updated) in this state.
    pub fn shows_graph(self) -> bool {
        self == ModuleState::Full
    }
}

/// Severity band of a classified value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Good,
    Caution,
    Critical,
}

impl Severity {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Good => "OK",
            Severity::Caution => "WARN",
            Severity::Critical => "CRIT",
        }
    }
}
