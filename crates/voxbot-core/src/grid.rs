use std::collections::{BTreeMap, HashSet};

use crate::{
    AttemptOutcome, BotWorldMut, BotWorldView, CellPos, EntityId, Face, Material, Rotation,
    Target, Vec3, VoxelView, WorldMut, WorldView,
};

/// Per-agent state tracked by [`GridWorld`].
///
/// Effect counters (`swings`, `jumps`, `broken`, ...) exist so tests can
/// observe what the control stack asked the world to do.
#[derive(Debug, Clone)]
pub struct GridAgent {
    pub position: Vec3,
    pub rotation: Rotation,
    pub velocity: Vec3,
    pub on_ground: bool,
    pub gliding: bool,
    pub passive: bool,
    pub hunger: u32,
    pub has_glider: bool,
    pub free_flight: bool,
    pub gravity_suspended: bool,
    pub instant_break: bool,
    /// Break-speed multiplier; `select_best_tool` raises it when a tool is
    /// available.
    pub tool_speed: f32,
    pub has_tools: bool,
    pub food_items: u32,
    pub placeable_blocks: u32,
    /// How many `try_deploy_glider` calls fail before one succeeds.
    pub deploy_after_attempts: u32,
    pub forced_target: Option<Target>,

    // movement intent, as last written by the control stack
    pub forward: f32,
    pub strafe: f32,
    pub sneaking: bool,
    pub sprinting: bool,
    pub jump_held: bool,

    // internal kinematics
    vertical_velocity: f64,
    eating_ticks: u32,
    attack_charge: u32,
    deploy_attempts_seen: u32,

    // observable effect log
    pub swings: u32,
    pub jumps: u32,
    pub attacks: Vec<EntityId>,
    pub interactions: Vec<CellPos>,
    pub broken: Vec<CellPos>,
    pub placed: Vec<CellPos>,
    pub held_uses: u32,
    pub entity_interactions: u32,
    pub drops: u32,
    pub stack_drops: u32,
    pub hand_swaps: u32,
    pub meals_eaten: u32,
    pub breaking: Option<CellPos>,
}

impl GridAgent {
    fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Rotation::default(),
            velocity: Vec3::ZERO,
            on_ground: true,
            gliding: false,
            passive: false,
            hunger: 20,
            has_glider: false,
            free_flight: false,
            gravity_suspended: false,
            instant_break: false,
            tool_speed: 1.0,
            has_tools: false,
            food_items: 0,
            placeable_blocks: 0,
            deploy_after_attempts: 0,
            forced_target: None,
            forward: 0.0,
            strafe: 0.0,
            sneaking: false,
            sprinting: false,
            jump_held: false,
            vertical_velocity: 0.0,
            eating_ticks: 0,
            attack_charge: 100,
            deploy_attempts_seen: 0,
            swings: 0,
            jumps: 0,
            attacks: Vec::new(),
            interactions: Vec::new(),
            broken: Vec::new(),
            placed: Vec::new(),
            held_uses: 0,
            entity_interactions: 0,
            drops: 0,
            stack_drops: 0,
            hand_swaps: 0,
            meals_eaten: 0,
            breaking: None,
        }
    }
}

/// Bounded in-memory voxel world: the reference facade implementation used
/// by tests and benches.
///
/// Movement is a deliberately crude kinematic approximation (constant walk
/// speed, instant-ish gravity); the real physics always lives on the host
/// side of the facade.
pub struct GridWorld {
    min: CellPos,
    size_x: i32,
    size_y: i32,
    size_z: i32,
    cells: Vec<Material>,
    unloaded_columns: HashSet<(i32, i32)>,
    hostiles: Vec<CellPos>,
    agents: BTreeMap<u64, GridAgent>,
    /// Outcome reported for use/interact attempts; tests flip this to model
    /// a usable item or interactive target.
    pub use_outcome: AttemptOutcome,
}

const WALK_SPEED: f64 = 0.18;
const SPRINT_SPEED: f64 = 0.26;
const JUMP_VELOCITY: f64 = 0.5;
const GRAVITY: f64 = 0.08;
const EAT_TICKS: u32 = 30;

impl GridWorld {
    pub fn new(min: CellPos, size_x: i32, size_y: i32, size_z: i32) -> Self {
        assert!(size_x > 0 && size_y > 0 && size_z > 0, "grid must be non-empty");
        Self {
            min,
            size_x,
            size_y,
            size_z,
            cells: vec![Material::Air; (size_x * size_y * size_z) as usize],
            unloaded_columns: HashSet::new(),
            hostiles: Vec::new(),
            agents: BTreeMap::new(),
            use_outcome: AttemptOutcome::Failure,
        }
    }

    /// A world with a solid floor at `floor_y` spanning the whole footprint.
    pub fn flat(min: CellPos, size_x: i32, size_y: i32, size_z: i32, floor_y: i32) -> Self {
        let mut world = Self::new(min, size_x, size_y, size_z);
        for x in min.x..min.x + size_x {
            for z in min.z..min.z + size_z {
                world.set(CellPos::new(x, floor_y, z), Material::STONE);
            }
        }
        world
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        let dx = pos.x - self.min.x;
        let dy = pos.y - self.min.y;
        let dz = pos.z - self.min.z;
        if dx < 0 || dy < 0 || dz < 0 || dx >= self.size_x || dy >= self.size_y || dz >= self.size_z
        {
            return None;
        }
        Some(((dy * self.size_z + dz) * self.size_x + dx) as usize)
    }

    pub fn set(&mut self, pos: CellPos, material: Material) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = material;
        }
    }

    pub fn fill(&mut self, min: CellPos, max: CellPos, material: Material) {
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                for x in min.x..=max.x {
                    self.set(CellPos::new(x, y, z), material);
                }
            }
        }
    }

    pub fn set_column_unloaded(&mut self, x: i32, z: i32) {
        self.unloaded_columns.insert((x, z));
    }

    pub fn add_hostile(&mut self, pos: CellPos) {
        self.hostiles.push(pos);
    }

    /// Spawn an agent standing on the floor of `cell`.
    pub fn spawn_agent(&mut self, id: u64, cell: CellPos) -> &mut GridAgent {
        self.agents.entry(id).or_insert_with(|| GridAgent::at(cell.center()))
    }

    pub fn agent(&self, id: u64) -> &GridAgent {
        &self.agents[&id]
    }

    pub fn agent_mut(&mut self, id: u64) -> &mut GridAgent {
        self.agents.get_mut(&id).expect("unknown agent id")
    }

    fn blocks(&self, pos: CellPos) -> bool {
        self.material(pos).blocks_movement()
    }

    /// One kinematic step for every agent: integrate intent, gravity, and
    /// eating timers. Call after the control stack's tick.
    pub fn advance(&mut self) {
        let ids: Vec<u64> = self.agents.keys().copied().collect();
        for id in ids {
            self.advance_agent(id);
        }
    }

    fn advance_agent(&mut self, id: u64) {
        let agent = &self.agents[&id];
        let gliding = agent.gliding;
        let suspended = agent.gravity_suspended;
        let in_water = self.material(CellPos::containing(agent.position)) == Material::Water;

        if gliding || suspended {
            // Flight owns the velocity vector wholesale.
            let agent = self.agent_mut(id);
            agent.position = agent.position + agent.velocity;
            let position = agent.position;
            let feet = CellPos::containing(position);
            // A fast dive can step straight into a cell; land on top of it.
            let tunneled = !suspended && self.blocks(feet);
            let landed = tunneled || (!suspended && self.supported_approx(position));
            let agent = self.agent_mut(id);
            if landed {
                if tunneled {
                    agent.position.y = feet.y as f64 + 1.0;
                }
                agent.on_ground = true;
                agent.gliding = false;
                agent.velocity = Vec3::ZERO;
                agent.vertical_velocity = 0.0;
            }
            self.finish_tick(id, in_water);
            return;
        }

        // Horizontal intent. Sneak/slow-use attenuation is already baked
        // into the move input by the control stack.
        let agent = &self.agents[&id];
        let speed = if agent.sprinting {
            SPRINT_SPEED
        } else {
            WALK_SPEED
        };
        let yaw_dir = Rotation::new(agent.rotation.yaw, 0.0).direction();
        let strafe_dir = Rotation::new(agent.rotation.yaw - 90.0, 0.0).direction();
        let step = yaw_dir * (agent.forward as f64 * speed) + strafe_dir * (agent.strafe as f64 * speed);
        let rising = agent.vertical_velocity > 0.0;
        let target = agent.position + step;

        let feet = CellPos::containing(target);
        let mut new_position = agent.position;
        if !self.blocks(feet) && !self.blocks(feet.above()) {
            new_position = target;
        } else if rising && !self.blocks(feet.above()) && !self.blocks(feet.above_n(2)) {
            // Mid-jump step-up onto a one-cell ledge.
            new_position = Vec3::new(target.x, feet.y as f64 + 1.0, target.z);
        }

        // Vertical motion.
        let agent = self.agent_mut(id);
        agent.position = new_position;
        if in_water {
            agent.vertical_velocity = if agent.jump_held { 0.2 } else { -0.02 };
            agent.position.y += agent.vertical_velocity;
            agent.on_ground = false;
        } else {
            agent.vertical_velocity -= GRAVITY;
            agent.position.y += agent.vertical_velocity.max(-1.0);
            let position = agent.position;
            let feet = CellPos::containing(position);
            let falling = self.agents[&id].vertical_velocity <= 0.0;
            if falling && self.blocks(feet.below()) && (position.y - feet.y as f64) < 0.5 {
                let agent = self.agent_mut(id);
                agent.position.y = feet.y as f64;
                agent.vertical_velocity = 0.0;
                agent.on_ground = true;
            } else if falling && self.blocks(feet) {
                // Landed inside a partially-entered cell; snap on top of it.
                let agent = self.agent_mut(id);
                agent.position.y = feet.y as f64 + 1.0;
                agent.vertical_velocity = 0.0;
                agent.on_ground = true;
            } else {
                self.agent_mut(id).on_ground = false;
            }
        }

        // Mirror the integrated vertical motion into the readable velocity
        // so fall/rise checks (critical attacks) observe it.
        let agent = self.agent_mut(id);
        agent.velocity = Vec3::new(0.0, agent.vertical_velocity, 0.0);

        self.finish_tick(id, in_water);
    }

    fn supported_approx(&self, position: Vec3) -> bool {
        let feet = CellPos::containing(position);
        self.blocks(feet.below()) && (position.y - feet.y as f64) < 0.25
    }

    fn finish_tick(&mut self, id: u64, _in_water: bool) {
        let agent = self.agent_mut(id);
        agent.attack_charge = agent.attack_charge.saturating_add(1);
        if agent.eating_ticks > 0 {
            agent.eating_ticks -= 1;
            if agent.eating_ticks == 0 {
                agent.hunger = (agent.hunger + 8).min(20);
                agent.meals_eaten += 1;
            }
        }
    }

    fn ray_target(&self, agent: u64) -> Option<Target> {
        let state = &self.agents[&agent];
        if let Some(forced) = state.forced_target {
            return Some(forced);
        }
        let origin = state.position + Vec3::new(0.0, 1.62, 0.0);
        let dir = state.rotation.direction();
        let mut previous = CellPos::containing(origin);
        let mut t = 0.0;
        while t <= 4.5 {
            let point = origin + dir * t;
            let cell = CellPos::containing(point);
            if self.blocks(cell) {
                let face = face_between(previous, cell);
                return Some(Target::Cell { pos: cell, face });
            }
            previous = cell;
            t += 0.1;
        }
        None
    }
}

fn face_between(from: CellPos, hit: CellPos) -> Face {
    let dx = from.x - hit.x;
    let dy = from.y - hit.y;
    let dz = from.z - hit.z;
    if dy > 0 {
        Face::Up
    } else if dy < 0 {
        Face::Down
    } else if dx > 0 {
        Face::East
    } else if dx < 0 {
        Face::West
    } else if dz > 0 {
        Face::South
    } else {
        Face::North
    }
}

impl WorldView for GridWorld {
    type Agent = u64;
}

impl WorldMut for GridWorld {}

impl VoxelView for GridWorld {
    fn material(&self, pos: CellPos) -> Material {
        self.index(pos)
            .map(|idx| self.cells[idx])
            .unwrap_or(Material::Air)
    }

    fn chunk_loaded(&self, x: i32, z: i32) -> bool {
        !self.unloaded_columns.contains(&(x, z))
    }

    fn terrain_height(&self, x: i32, z: i32) -> i32 {
        for y in (self.min.y..self.min.y + self.size_y).rev() {
            if self.blocks(CellPos::new(x, y, z)) {
                return y;
            }
        }
        self.min.y - 1
    }

    fn floor_y(&self) -> i32 {
        self.min.y
    }

    fn ceiling_y(&self) -> i32 {
        self.min.y + self.size_y - 1
    }

    fn hostile_cells(&self, min: CellPos, max: CellPos) -> Vec<CellPos> {
        self.hostiles
            .iter()
            .copied()
            .filter(|p| {
                p.x >= min.x
                    && p.x <= max.x
                    && p.y >= min.y
                    && p.y <= max.y
                    && p.z >= min.z
                    && p.z <= max.z
            })
            .collect()
    }
}

impl BotWorldView for GridWorld {
    fn position(&self, agent: u64) -> Vec3 {
        self.agents[&agent].position
    }

    fn rotation(&self, agent: u64) -> Rotation {
        self.agents[&agent].rotation
    }

    fn velocity(&self, agent: u64) -> Vec3 {
        self.agents[&agent].velocity
    }

    fn on_ground(&self, agent: u64) -> bool {
        self.agents[&agent].on_ground
    }

    fn is_gliding(&self, agent: u64) -> bool {
        self.agents[&agent].gliding
    }

    fn in_water(&self, agent: u64) -> bool {
        let feet = CellPos::containing(self.agents[&agent].position);
        self.material(feet) == Material::Water || self.material(feet.above()) == Material::Water
    }

    fn is_passive(&self, agent: u64) -> bool {
        self.agents[&agent].passive
    }

    fn hunger(&self, agent: u64) -> u32 {
        self.agents[&agent].hunger
    }

    fn is_using_item(&self, agent: u64) -> bool {
        self.agents[&agent].eating_ticks > 0
    }

    fn has_glider(&self, agent: u64) -> bool {
        self.agents[&agent].has_glider
    }

    fn free_flight(&self, agent: u64) -> bool {
        self.agents[&agent].free_flight
    }

    fn gravity_suspended(&self, agent: u64) -> bool {
        self.agents[&agent].gravity_suspended
    }

    fn attack_ready(&self, agent: u64) -> bool {
        self.agents[&agent].attack_charge >= 10
    }

    fn instant_break(&self, agent: u64) -> bool {
        self.agents[&agent].instant_break
    }

    fn break_progress_step(&self, agent: u64, pos: CellPos) -> f32 {
        let material = self.material(pos);
        if !material.is_breakable() {
            return 0.0;
        }
        let hardness = material.hardness().max(0.05);
        (0.05 * self.agents[&agent].tool_speed / hardness).min(1.0)
    }

    fn look_target(&self, agent: u64) -> Option<Target> {
        self.ray_target(agent)
    }
}

impl BotWorldMut for GridWorld {
    fn set_rotation(&mut self, agent: u64, rotation: Rotation) {
        self.agent_mut(agent).rotation = rotation;
    }

    fn set_move_input(&mut self, agent: u64, forward: f32, strafe: f32) {
        let state = self.agent_mut(agent);
        state.forward = forward.clamp(-1.0, 1.0);
        state.strafe = strafe.clamp(-1.0, 1.0);
    }

    fn set_sneaking(&mut self, agent: u64, sneaking: bool) {
        self.agent_mut(agent).sneaking = sneaking;
    }

    fn set_sprinting(&mut self, agent: u64, sprinting: bool) {
        self.agent_mut(agent).sprinting = sprinting;
    }

    fn set_jump_held(&mut self, agent: u64, held: bool) {
        self.agent_mut(agent).jump_held = held;
    }

    fn jump(&mut self, agent: u64) {
        let state = self.agent_mut(agent);
        if state.on_ground {
            state.vertical_velocity = JUMP_VELOCITY;
            state.velocity = Vec3::new(state.velocity.x, JUMP_VELOCITY, state.velocity.z);
            state.on_ground = false;
            state.jumps += 1;
        }
    }

    fn set_velocity(&mut self, agent: u64, velocity: Vec3) {
        self.agent_mut(agent).velocity = velocity;
    }

    fn set_gravity_suspended(&mut self, agent: u64, suspended: bool) {
        self.agent_mut(agent).gravity_suspended = suspended;
    }

    fn set_free_flight(&mut self, agent: u64, enabled: bool) {
        self.agent_mut(agent).free_flight = enabled;
    }

    fn try_deploy_glider(&mut self, agent: u64) -> bool {
        let state = self.agent_mut(agent);
        if !state.has_glider || state.on_ground {
            return false;
        }
        state.deploy_attempts_seen += 1;
        if state.deploy_attempts_seen <= state.deploy_after_attempts {
            return false;
        }
        state.gliding = true;
        true
    }

    fn swing(&mut self, agent: u64) {
        self.agent_mut(agent).swings += 1;
    }

    fn start_break(&mut self, agent: u64, pos: CellPos) {
        self.agent_mut(agent).breaking = Some(pos);
    }

    fn abort_break(&mut self, agent: u64, pos: CellPos) {
        let state = self.agent_mut(agent);
        if state.breaking == Some(pos) {
            state.breaking = None;
        }
    }

    fn complete_break(&mut self, agent: u64, pos: CellPos) {
        self.set(pos, Material::Air);
        let state = self.agent_mut(agent);
        state.breaking = None;
        state.broken.push(pos);
    }

    fn place_block(&mut self, agent: u64, pos: CellPos) -> bool {
        if self.material(pos) != Material::Air {
            return false;
        }
        if self.agents[&agent].placeable_blocks == 0 {
            return false;
        }
        self.set(pos, Material::DIRT);
        let state = self.agent_mut(agent);
        state.placeable_blocks -= 1;
        state.placed.push(pos);
        true
    }

    fn select_best_tool(&mut self, agent: u64, _target: Material) -> bool {
        let state = self.agent_mut(agent);
        if !state.has_tools {
            return false;
        }
        state.tool_speed = 5.0;
        true
    }

    fn begin_eating(&mut self, agent: u64) -> bool {
        let state = self.agent_mut(agent);
        if state.food_items == 0 || state.eating_ticks > 0 {
            return false;
        }
        state.food_items -= 1;
        state.eating_ticks = EAT_TICKS;
        true
    }

    fn release_use(&mut self, agent: u64) {
        self.agent_mut(agent).eating_ticks = 0;
    }

    fn interact_cell(&mut self, agent: u64, pos: CellPos, _face: Face) -> AttemptOutcome {
        self.agent_mut(agent).interactions.push(pos);
        self.use_outcome
    }

    fn interact_entity(&mut self, agent: u64, _entity: EntityId) -> AttemptOutcome {
        self.agent_mut(agent).entity_interactions += 1;
        self.use_outcome
    }

    fn use_held_item(&mut self, agent: u64) -> AttemptOutcome {
        self.agent_mut(agent).held_uses += 1;
        self.use_outcome
    }

    fn attack_entity(&mut self, agent: u64, entity: EntityId) {
        let state = self.agent_mut(agent);
        state.attacks.push(entity);
        state.attack_charge = 0;
    }

    fn drop_held(&mut self, agent: u64, whole_stack: bool) {
        let state = self.agent_mut(agent);
        if whole_stack {
            state.stack_drops += 1;
        } else {
            state.drops += 1;
        }
    }

    fn swap_hands(&mut self, agent: u64) {
        self.agent_mut(agent).hand_swaps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_world_supports_standing_agent() {
        let mut world = GridWorld::flat(CellPos::new(0, 60, 0), 16, 16, 16, 63);
        world.spawn_agent(1, CellPos::new(4, 64, 4));
        world.advance();
        assert!(world.on_ground(1));
        assert_eq!(CellPos::containing(world.position(1)).y, 64);
    }

    #[test]
    fn walking_intent_moves_agent_forward() {
        let mut world = GridWorld::flat(CellPos::new(0, 60, 0), 16, 16, 16, 63);
        world.spawn_agent(1, CellPos::new(4, 64, 4));
        world.set_rotation(1, Rotation::new(0.0, 0.0));
        world.set_move_input(1, 1.0, 0.0);
        for _ in 0..10 {
            world.advance();
        }
        assert!(world.position(1).z > 4.5 + WALK_SPEED * 5.0);
    }

    #[test]
    fn terrain_height_sees_highest_blocking_cell() {
        let mut world = GridWorld::flat(CellPos::new(0, 60, 0), 8, 32, 8, 63);
        world.set(CellPos::new(3, 70, 3), Material::STONE);
        assert_eq!(world.terrain_height(3, 3), 70);
        assert_eq!(world.terrain_height(2, 2), 63);
    }

    #[test]
    fn unsupported_agent_falls_to_the_floor() {
        let mut world = GridWorld::flat(CellPos::new(0, 60, 0), 8, 16, 8, 63);
        world.spawn_agent(1, CellPos::new(1, 68, 1));
        for _ in 0..40 {
            world.advance();
        }
        assert!(world.on_ground(1));
        assert_eq!(CellPos::containing(world.position(1)).y, 64);
    }
}
