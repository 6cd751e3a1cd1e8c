#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Global behavior defaults, owned by the host and passed into every tick.
/// Per-agent [`NavOverrides`] win over these when set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavDefaults {
    /// Master switch: navigation stops outright when cleared.
    pub navigation_enabled: bool,
    /// Master switch for the flight controller and air-mode navigation.
    pub flight_enabled: bool,

    pub break_blocks: bool,
    pub place_blocks: bool,
    pub auto_tool: bool,
    pub auto_eat: bool,
    /// Hunger level at or below which auto-eat engages.
    pub auto_eat_below: u32,
    pub avoid_lava: bool,
    pub avoid_fire: bool,
    pub avoid_cobwebs: bool,
    pub break_cobwebs: bool,
    pub avoid_powder_snow: bool,
}

impl Default for NavDefaults {
    fn default() -> Self {
        Self {
            navigation_enabled: true,
            flight_enabled: true,
            break_blocks: false,
            place_blocks: false,
            auto_tool: true,
            auto_eat: true,
            auto_eat_below: 10,
            avoid_lava: true,
            avoid_fire: true,
            avoid_cobwebs: true,
            break_cobwebs: false,
            avoid_powder_snow: true,
        }
    }
}

/// Per-agent policy overrides; unset fields fall back to [`NavDefaults`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavOverrides {
    pub break_blocks: Option<bool>,
    pub place_blocks: Option<bool>,
    pub auto_tool: Option<bool>,
    pub auto_eat: Option<bool>,
    pub auto_eat_below: Option<u32>,
    pub avoid_lava: Option<bool>,
    pub avoid_fire: Option<bool>,
    pub avoid_cobwebs: Option<bool>,
    pub break_cobwebs: Option<bool>,
    pub avoid_powder_snow: Option<bool>,
}

impl NavOverrides {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Collapse overrides against the global defaults into the concrete
    /// policy used for this tick.
    pub(crate) fn resolved(&self, defaults: &NavDefaults) -> NavPolicy {
        NavPolicy {
            break_blocks: self.break_blocks.unwrap_or(defaults.break_blocks),
            place_blocks: self.place_blocks.unwrap_or(defaults.place_blocks),
            auto_tool: self.auto_tool.unwrap_or(defaults.auto_tool),
            auto_eat: self.auto_eat.unwrap_or(defaults.auto_eat),
            auto_eat_below: self
                .auto_eat_below
                .unwrap_or(defaults.auto_eat_below)
                .min(20),
            avoid_lava: self.avoid_lava.unwrap_or(defaults.avoid_lava),
            avoid_fire: self.avoid_fire.unwrap_or(defaults.avoid_fire),
            avoid_cobwebs: self.avoid_cobwebs.unwrap_or(defaults.avoid_cobwebs),
            break_cobwebs: self.break_cobwebs.unwrap_or(defaults.break_cobwebs),
            avoid_powder_snow: self.avoid_powder_snow.unwrap_or(defaults.avoid_powder_snow),
        }
    }
}

/// Concrete per-tick policy after override resolution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NavPolicy {
    pub break_blocks: bool,
    pub place_blocks: bool,
    pub auto_tool: bool,
    pub auto_eat: bool,
    pub auto_eat_below: u32,
    pub avoid_lava: bool,
    pub avoid_fire: bool,
    pub avoid_cobwebs: bool,
    pub break_cobwebs: bool,
    pub avoid_powder_snow: bool,
}
