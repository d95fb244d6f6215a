//! Bit-packed module presets.
//!
//! A preset stores one [`ModuleState`] per module in its own three-bit field,
//! so a single integer describes what every module shows. Presets are kept in
//! an ordered list that the overlay cycles through.

use framewatch_types::{ModuleKind, ModuleState};

/// Width of every module field. Five states need three bits.
pub const FIELD_WIDTH: u32 = 3;

/// Mask selecting one field once shifted down.
pub const FIELD_MASK: u32 = (1 << FIELD_WIDTH) - 1;

/// Bit offset of a module's field.
pub fn module_shift(module: ModuleKind) -> u32 {
    let slot = match module {
        ModuleKind::Fps => 0,
        ModuleKind::Ram => 1,
        ModuleKind::Dev => 2,
        ModuleKind::Audio => 3,
        ModuleKind::Advanced => 4,
    };
    slot * FIELD_WIDTH
}

/// Place a raw state value at `shift`.
pub fn encode(state: u32, shift: u32) -> u32 {
    state << shift
}

/// Extract the raw field value at `shift`.
pub fn decode(preset: u32, shift: u32, mask: u32) -> u32 {
    (preset >> shift) & mask
}

/// Replace the field at `shift`, leaving every other bit untouched.
pub fn set_field(preset: u32, shift: u32, mask: u32, state: u32) -> u32 {
    (preset & !(mask << shift)) | ((state & mask) << shift)
}

/// One packed combination of per-module states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModulePreset(u32);

impl ModulePreset {
    /// Every module off.
    pub const OFF: ModulePreset = ModulePreset(0);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Build a preset from explicit states; unlisted modules are off.
    pub fn from_states(states: &[(ModuleKind, ModuleState)]) -> Self {
        states
            .iter()
            .fold(Self::OFF, |preset, (module, state)| preset.with_state(*module, *state))
    }

    /// State stored for a module.
    ///
    /// Field values outside the state enumeration decode as [`ModuleState::Off`].
    pub fn state(self, module: ModuleKind) -> ModuleState {
        let bits = decode(self.0, module_shift(module), FIELD_MASK);
        ModuleState::from_bits(bits).unwrap_or_else(|| {
            tracing::warn!(module = %module, bits, "Invalid module state in preset, using off");
            ModuleState::Off
        })
    }

    /// Copy of this preset with one module's state replaced.
    pub fn with_state(self, module: ModuleKind, state: ModuleState) -> Self {
        Self(set_field(self.0, module_shift(module), FIELD_MASK, state.bits()))
    }

    /// States of every module, in [`ModuleKind::ALL`] order.
    pub fn states(self) -> [(ModuleKind, ModuleState); 5] {
        ModuleKind::ALL.map(|m| (m, self.state(m)))
    }
}

/// The canonical progressive preset sequence.
///
/// Starts with FPS alone, then adds RAM, dev and audio in growing detail,
/// and ends with the advanced panel.
pub fn default_presets() -> Vec<ModulePreset> {
    use ModuleKind::{Advanced, Audio, Dev, Fps, Ram};
    use ModuleState::{Basic, Full, Text};

    let p = ModulePreset::from_states;
    vec![
        p(&[(Fps, Basic)]),
        p(&[(Fps, Text)]),
        p(&[(Fps, Full)]),
        p(&[(Fps, Text), (Ram, Text)]),
        p(&[(Fps, Full), (Ram, Text)]),
        p(&[(Fps, Full), (Ram, Full)]),
        p(&[(Fps, Text), (Ram, Text), (Dev, Text)]),
        p(&[(Fps, Full), (Ram, Text), (Dev, Text)]),
        p(&[(Fps, Full), (Ram, Full), (Dev, Text)]),
        p(&[(Fps, Full), (Ram, Full), (Dev, Full)]),
        p(&[(Fps, Text), (Ram, Text), (Audio, Text)]),
        p(&[(Fps, Full), (Ram, Text), (Audio, Text)]),
        p(&[(Fps, Full), (Ram, Full), (Audio, Text)]),
        p(&[(Fps, Full), (Ram, Full), (Audio, Full)]),
        p(&[(Fps, Full), (Ram, Full), (Audio, Full), (Advanced, Full)]),
        p(&[(Fps, Basic), (Advanced, Full)]),
    ]
}

/// Next index and preset after `current_index`, wrapping around.
///
/// Returns `None` for an empty list.
pub fn cycle_next(presets: &[ModulePreset], current_index: usize) -> Option<(usize, ModulePreset)> {
    if presets.is_empty() {
        return None;
    }
    let next = current_index.wrapping_add(1) % presets.len();
    Some((next, presets[next]))
}

/// An ordered, never-empty preset list with a cursor.
#[derive(Debug, Clone)]
pub struct PresetCycle {
    presets: Vec<ModulePreset>,
    index: usize,
}

impl PresetCycle {
    /// Create a cycle positioned on the first preset.
    ///
    /// An empty list is replaced by [`default_presets`].
    pub fn new(presets: Vec<ModulePreset>) -> Self {
        Self {
            presets: Self::or_defaults(presets),
            index: 0,
        }
    }

    fn or_defaults(presets: Vec<ModulePreset>) -> Vec<ModulePreset> {
        if presets.is_empty() {
            tracing::debug!("Preset list empty, generating defaults");
            default_presets()
        } else {
            presets
        }
    }

    pub fn presets(&self) -> &[ModulePreset] {
        &self.presets
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The preset under the cursor.
    pub fn current(&self) -> ModulePreset {
        match self.presets.get(self.index) {
            Some(preset) => *preset,
            None => self.presets.first().copied().unwrap_or(ModulePreset::OFF),
        }
    }

    /// Advance the cursor, wrapping to the start, and return the new preset.
    pub fn advance(&mut self) -> ModulePreset {
        self.repair_index();
        if let Some((next, preset)) = cycle_next(&self.presets, self.index) {
            self.index = next;
            preset
        } else {
            ModulePreset::OFF
        }
    }

    /// Move the cursor to `index`. Out-of-range indices reset to 0.
    pub fn select(&mut self, index: usize) -> ModulePreset {
        self.index = index;
        self.repair_index();
        self.current()
    }

    /// Swap in a new preset list, keeping the cursor if it is still valid.
    pub fn replace(&mut self, presets: Vec<ModulePreset>) {
        self.presets = Self::or_defaults(presets);
        self.repair_index();
    }

    fn repair_index(&mut self) {
        if self.index >= self.presets.len() {
            tracing::warn!(
                index = self.index,
                len = self.presets.len(),
                "Preset index out of range, resetting to 0"
            );
            self.index = 0;
        }
    }
}

impl Default for PresetCycle {
    fn default() -> Self {
        Self::new(default_presets())
    }
}

/// States every module takes under the preset at `index`.
///
/// An empty list yields every module off; an out-of-range index falls back
/// to the first preset.
pub fn states_at(presets: &[ModulePreset], index: usize) -> [(ModuleKind, ModuleState); 5] {
    presets
        .get(index)
        .or_else(|| presets.first())
        .copied()
        .unwrap_or(ModulePreset::OFF)
        .states()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [ModuleState; 5] = [
        ModuleState::Off,
        ModuleState::Full,
        ModuleState::Text,
        ModuleState::Basic,
        ModuleState::Background,
    ];

    #[test]
    fn fields_do_not_overlap() {
        let mut seen = 0u32;
        for module in ModuleKind::ALL {
            let field = FIELD_MASK << module_shift(module);
            assert_eq!(seen & field, 0, "{module} overlaps another field");
            seen |= field;
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        for module in ModuleKind::ALL {
            let shift = module_shift(module);
            for state in STATES {
                assert_eq!(decode(encode(state.bits(), shift), shift, FIELD_MASK), state.bits());
            }
        }
    }

    #[test]
    fn background_survives_packing() {
        // Needs the third bit; a two-bit mask would read it back as off.
        let preset = ModulePreset::OFF.with_state(ModuleKind::Dev, ModuleState::Background);
        assert_eq!(preset.state(ModuleKind::Dev), ModuleState::Background);
    }

    #[test]
    fn set_field_leaves_other_modules_alone() {
        let base = ModulePreset::from_states(&[
            (ModuleKind::Fps, ModuleState::Full),
            (ModuleKind::Ram, ModuleState::Text),
            (ModuleKind::Dev, ModuleState::Background),
            (ModuleKind::Audio, ModuleState::Basic),
            (ModuleKind::Advanced, ModuleState::Full),
        ]);
        for module in ModuleKind::ALL {
            for state in STATES {
                let changed = base.with_state(module, state);
                assert_eq!(changed.state(module), state);
                for other in ModuleKind::ALL.into_iter().filter(|m| *m != module) {
                    assert_eq!(changed.state(other), base.state(other));
                }
            }
        }
    }

    #[test]
    fn set_field_masks_oversized_value() {
        let preset = set_field(0, 3, FIELD_MASK, 0b1111);
        assert_eq!(preset, 0b111 << 3);
    }

    #[test]
    fn invalid_field_decodes_as_off() {
        let preset = ModulePreset::from_bits(encode(7, module_shift(ModuleKind::Ram)));
        assert_eq!(preset.state(ModuleKind::Ram), ModuleState::Off);
    }

    #[test]
    fn default_presets_are_progressive() {
        let presets = default_presets();
        assert_eq!(presets.len(), 16);
        assert_eq!(presets[0].state(ModuleKind::Fps), ModuleState::Basic);
        assert_eq!(presets[0].state(ModuleKind::Ram), ModuleState::Off);
        assert_eq!(presets[9].state(ModuleKind::Dev), ModuleState::Full);
        assert_eq!(presets[15].state(ModuleKind::Advanced), ModuleState::Full);
    }

    #[test]
    fn cycle_next_wraps() {
        let presets = default_presets();
        let (next, preset) = cycle_next(&presets, 15).unwrap();
        assert_eq!(next, 0);
        assert_eq!(preset, presets[0]);
        assert_eq!(cycle_next(&presets, 2).unwrap().0, 3);
    }

    #[test]
    fn cycle_next_on_empty_is_none() {
        assert_eq!(cycle_next(&[], 0), None);
    }

    #[test]
    fn empty_cycle_gets_defaults() {
        let cycle = PresetCycle::new(Vec::new());
        assert_eq!(cycle.presets(), default_presets().as_slice());
        assert_eq!(cycle.index(), 0);
    }

    #[test]
    fn advance_walks_and_wraps() {
        let a = ModulePreset::from_bits(1);
        let b = ModulePreset::from_bits(2);
        let mut cycle = PresetCycle::new(vec![a, b]);
        assert_eq!(cycle.current(), a);
        assert_eq!(cycle.advance(), b);
        assert_eq!(cycle.advance(), a);
        assert_eq!(cycle.index(), 0);
    }

    #[test]
    fn shrinking_list_resets_index() {
        let mut cycle = PresetCycle::default();
        cycle.select(10);
        cycle.replace(vec![ModulePreset::from_bits(1), ModulePreset::from_bits(2)]);
        assert_eq!(cycle.index(), 0);
        assert_eq!(cycle.advance(), ModulePreset::from_bits(2));
    }

    #[test]
    fn select_out_of_range_resets() {
        let mut cycle = PresetCycle::default();
        let preset = cycle.select(99);
        assert_eq!(cycle.index(), 0);
        assert_eq!(preset, default_presets()[0]);
    }

    #[test]
    fn states_at_empty_is_all_off() {
        assert!(states_at(&[], 0)
            .iter()
            .all(|(_, state)| *state == ModuleState::Off));
    }

    #[test]
    fn states_at_out_of_range_uses_first() {
        let presets = default_presets();
        assert_eq!(states_at(&presets, 100), presets[0].states());
    }
}
