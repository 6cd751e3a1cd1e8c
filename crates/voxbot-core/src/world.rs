use crate::{AgentId, CellPos, Face, Material, Rotation, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Read-only world access.
///
/// The core crate does not prescribe which queries a world must expose;
/// subsystems define extension traits ([`VoxelView`], [`BotWorldView`]).
pub trait WorldView {
    type Agent: AgentId;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}

/// Opaque handle to a non-agent entity (attack/interact targets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId(pub u64);

/// What an agent's current look ray hits, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Cell { pos: CellPos, face: Face },
    Entity(EntityId),
}

/// Result of one discrete interaction attempt. Failures are a normal,
/// recoverable outcome; retry policy belongs to the caller's timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
}

impl AttemptOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

/// Lattice queries. This is all the pathfinders are allowed to see; they
/// take a view, produce a path, and retain no references into world state.
pub trait VoxelView: WorldView {
    fn material(&self, pos: CellPos) -> Material;

    /// Whether the column containing cell-x/z is resident. Planners never
    /// trigger world generation; unresident cells are simply not expanded.
    fn chunk_loaded(&self, x: i32, z: i32) -> bool;

    /// Y of the highest movement-blocking cell in the column.
    fn terrain_height(&self, x: i32, z: i32) -> i32;

    /// Lowest buildable cell y.
    fn floor_y(&self) -> i32;

    /// Highest buildable cell y.
    fn ceiling_y(&self) -> i32;

    /// Feet cells of hostile entities inside the given box, in stable order.
    fn hostile_cells(&self, min: CellPos, max: CellPos) -> Vec<CellPos>;
}

/// Agent state queries used by the action scheduler and the controllers.
pub trait BotWorldView: VoxelView {
    fn position(&self, agent: Self::Agent) -> Vec3;

    fn eye_position(&self, agent: Self::Agent) -> Vec3 {
        self.position(agent) + Vec3::new(0.0, 1.62, 0.0)
    }

    /// Feet cell of the agent.
    fn agent_cell(&self, agent: Self::Agent) -> CellPos {
        CellPos::containing(self.position(agent))
    }

    fn rotation(&self, agent: Self::Agent) -> Rotation;
    fn velocity(&self, agent: Self::Agent) -> Vec3;
    fn on_ground(&self, agent: Self::Agent) -> bool;

    /// Whether the agent is airborne on a deployed glider.
    fn is_gliding(&self, agent: Self::Agent) -> bool;

    fn in_water(&self, agent: Self::Agent) -> bool;

    /// Non-interactive mode (spectating); world-touching actions are
    /// suppressed while this holds.
    fn is_passive(&self, agent: Self::Agent) -> bool;

    /// Satiation level, 0..=20.
    fn hunger(&self, agent: Self::Agent) -> u32;

    /// Whether the agent is mid-use of a held item (eating, charging).
    fn is_using_item(&self, agent: Self::Agent) -> bool;

    /// Whether a usable glider is equipped.
    fn has_glider(&self, agent: Self::Agent) -> bool;

    /// Whether the host grants the agent free creative-style flight.
    fn free_flight(&self, agent: Self::Agent) -> bool;

    /// Whether gravity is currently suspended for the agent.
    fn gravity_suspended(&self, agent: Self::Agent) -> bool;

    /// Whether the attack charge has recovered enough for a full-strength
    /// swing.
    fn attack_ready(&self, agent: Self::Agent) -> bool;

    /// Whether the agent breaks blocks instantly (creative-style).
    fn instant_break(&self, agent: Self::Agent) -> bool;

    /// Progress fraction one swing adds toward breaking the cell; zero when
    /// the agent cannot damage it.
    fn break_progress_step(&self, agent: Self::Agent, pos: CellPos) -> f32;

    /// Ray-trace along the agent's current look direction.
    fn look_target(&self, agent: Self::Agent) -> Option<Target>;
}

/// Mutation surface: every world effect the control stack may cause.
///
/// All physics stays on the host side; these calls nudge it (set intent,
/// rotate, swing, start a break) rather than simulate it.
pub trait BotWorldMut: WorldMut + BotWorldView {
    fn set_rotation(&mut self, agent: Self::Agent, rotation: Rotation);

    /// Forward/strafe movement intent in [-1, 1].
    fn set_move_input(&mut self, agent: Self::Agent, forward: f32, strafe: f32);

    fn set_sneaking(&mut self, agent: Self::Agent, sneaking: bool);
    fn set_sprinting(&mut self, agent: Self::Agent, sprinting: bool);

    /// Hold or release the jump control (swimming ascent, held jumps).
    fn set_jump_held(&mut self, agent: Self::Agent, held: bool);

    /// Single jump impulse; no-op if the agent is not on the ground.
    fn jump(&mut self, agent: Self::Agent);

    fn set_velocity(&mut self, agent: Self::Agent, velocity: Vec3);

    /// Suspend or restore gravity for the agent (flight freeze).
    fn set_gravity_suspended(&mut self, agent: Self::Agent, suspended: bool);

    /// Grant or revoke free creative-style flight.
    fn set_free_flight(&mut self, agent: Self::Agent, enabled: bool);

    /// Attempt to deploy the equipped glider mid-air.
    fn try_deploy_glider(&mut self, agent: Self::Agent) -> bool;

    /// Arm-swing animation.
    fn swing(&mut self, agent: Self::Agent);

    fn start_break(&mut self, agent: Self::Agent, pos: CellPos);
    fn abort_break(&mut self, agent: Self::Agent, pos: CellPos);

    /// Remove the cell; called once accumulated progress reaches 1.
    fn complete_break(&mut self, agent: Self::Agent, pos: CellPos);

    /// Display partial break progress (tenths) to observers.
    fn show_break_progress(&mut self, _agent: Self::Agent, _pos: CellPos, _tenths: u8) {}

    /// Place a block from inventory into the given cell. Fails when no
    /// placeable item is held or the host rejects the placement.
    fn place_block(&mut self, agent: Self::Agent, pos: CellPos) -> bool;

    /// Switch the held item to whichever inventory item breaks `target`
    /// fastest, preferring correct-tool bonuses. Returns false when nothing
    /// better than the current item exists.
    fn select_best_tool(&mut self, agent: Self::Agent, target: Material) -> bool;

    /// Switch to the most nutritious food item and start consuming it.
    fn begin_eating(&mut self, agent: Self::Agent) -> bool;

    /// Stop consuming/charging the held item.
    fn release_use(&mut self, agent: Self::Agent);

    fn interact_cell(&mut self, agent: Self::Agent, pos: CellPos, face: Face) -> AttemptOutcome;
    fn interact_entity(&mut self, agent: Self::Agent, entity: EntityId) -> AttemptOutcome;
    fn use_held_item(&mut self, agent: Self::Agent) -> AttemptOutcome;

    fn attack_entity(&mut self, agent: Self::Agent, entity: EntityId);

    /// Drop from the held stack: one item or the whole stack.
    fn drop_held(&mut self, agent: Self::Agent, whole_stack: bool);

    fn swap_hands(&mut self, agent: Self::Agent);
}
