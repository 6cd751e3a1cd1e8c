#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which neighbor-generation and validity rules the ground engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Traversal {
    Land,
    Water,
    /// Prefers land movement, falls back to swimming.
    Amphibious,
}

/// Immutable cost model and search bounds for one ground planning call.
///
/// Constructed once per invocation and never mutated mid-search. Extended
/// movements are feature-gated here rather than living in a second engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavSettings {
    /// Hard ceiling on expanded nodes; exceeding it ends the search.
    pub max_expanded: u32,
    /// Hard ceiling on the open queue length.
    pub max_queued: u32,
    /// Horizontal search box half-extent around start/goal.
    pub max_range_xz: i32,
    /// Vertical search box half-extent around start/goal.
    pub max_range_y: i32,
    /// Deepest drop a walk edge may take.
    pub max_fall: i32,
    /// Tallest step a walk edge may climb.
    pub max_step_up: i32,
    pub allow_diagonal: bool,
    pub allow_diagonal_ascend: bool,
    pub allow_diagonal_descend: bool,

    pub avoid_lava: bool,
    pub avoid_fire: bool,
    pub avoid_powder_snow: bool,
    pub avoid_cobwebs: bool,
    /// Cost soul-sand crossings up instead of walking them for free.
    pub avoid_soul_sand: bool,

    pub allow_break_through: bool,
    pub break_cost_base: f32,
    pub allow_pillar: bool,
    pub pillar_cost: f32,
    pub allow_parkour: bool,
    /// Longest gap jump, in cells (2 = minimal gap).
    pub max_parkour_length: i32,
    pub allow_descend_mine: bool,
    pub descend_mine_cost: f32,

    pub allow_sprint: bool,
    pub sprint_cost_multiplier: f32,
    /// Falls beyond this many cells start accruing fall-damage cost.
    pub safe_fall_height: i32,
    pub jump_penalty: f32,
    pub fall_damage_penalty: f32,

    pub avoid_hostiles: bool,
    pub hostile_radius: i32,
    pub hostile_cost: f32,

    pub open_doors: bool,
    pub open_gates: bool,
    /// Search fully submerged cells instead of preferring the surface.
    pub allow_submerged: bool,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            max_expanded: 50_000,
            max_queued: 150_000,
            max_range_xz: 256,
            max_range_y: 128,
            max_fall: 4,
            max_step_up: 1,
            allow_diagonal: true,
            allow_diagonal_ascend: true,
            allow_diagonal_descend: true,
            avoid_lava: true,
            avoid_fire: true,
            avoid_powder_snow: true,
            avoid_cobwebs: true,
            avoid_soul_sand: false,
            allow_break_through: false,
            break_cost_base: 4.0,
            allow_pillar: false,
            pillar_cost: 20.0,
            allow_parkour: true,
            max_parkour_length: 4,
            allow_descend_mine: false,
            descend_mine_cost: 6.0,
            allow_sprint: true,
            sprint_cost_multiplier: 0.8,
            safe_fall_height: 3,
            jump_penalty: 0.4,
            fall_damage_penalty: 2.0,
            avoid_hostiles: false,
            hostile_radius: 8,
            hostile_cost: 4.0,
            open_doors: true,
            open_gates: true,
            allow_submerged: false,
        }
    }
}

/// Immutable bounds and clearances for one air planning call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AirSettings {
    pub max_expanded: u32,
    pub max_queued: u32,
    pub max_range_xz: i32,
    pub max_range_y: i32,
    /// Minimum altitude over the terrain height-map.
    pub terrain_clearance: i32,
    /// Collision-free cells required above each corridor cell.
    pub air_clearance: i32,
    /// Down-sampling stride for the returned waypoint list.
    pub waypoint_stride: usize,
}

impl Default for AirSettings {
    fn default() -> Self {
        Self {
            max_expanded: 12_000,
            max_queued: 40_000,
            max_range_xz: 160,
            max_range_y: 80,
            terrain_clearance: 8,
            air_clearance: 2,
            waypoint_stride: 4,
        }
    }
}
