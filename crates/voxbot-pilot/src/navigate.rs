//! Navigation controller: resolves the effective traversal mode, keeps a
//! waypoint list fresh via throttled re-planning, steers toward the next
//! waypoint, and recovers from no-progress situations.

use voxbot_actions::{ActionKind, ActionTimer};
use voxbot_core::{BotWorldMut, CellPos, Material, TickContext, Vec3, VoxelView};
use voxbot_nav::{air, compress_cells, ground, AirSettings, MoveKind, NavSettings, Path, Traversal};

use crate::defaults::{NavDefaults, NavPolicy};
use crate::ControlState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Requested traversal mode; `Auto` resolves per tick from the agent's
/// situation (submerged → water, glider equipped → air, else land).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NavMode {
    #[default]
    Auto,
    Land,
    Water,
    Air,
}

/// Arrival behavior for air goals: land on the floor below the target, or
/// stop gliding on proximity and let gravity finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AirArrival {
    Land,
    Drop,
}

const REPATH_COOLDOWN_TICKS: u32 = 20;
const NO_PROGRESS_LIMIT: u32 = 60;
const WAYPOINT_RADIUS: f64 = 0.85;
const JUMP_COOLDOWN_TICKS: u32 = 8;
const STEER_YAW_RATE: f32 = 40.0;
const COBWEB_BREAK_REACH: f64 = 2.0;
const BRIDGE_REACH: f64 = 1.6;
const ASCEND_EPSILON: f64 = 0.2;
const GAP_JUMP_TRIGGER: f64 = 1.35;

#[derive(Debug)]
pub(crate) struct NavState {
    pub enabled: bool,
    pub mode: NavMode,
    pub target: Option<Vec3>,
    pub arrival_radius: f64,
    pub air_arrival: AirArrival,
    /// Raw planned path, kept at node fidelity so the follower can detect
    /// parkour edges.
    pub nodes: Option<Path>,
    pub waypoints: Vec<Vec3>,
    pub waypoint_index: usize,
    pub repath_cooldown: u32,
    pub needs_repath: bool,
    pub last_distance: f64,
    pub no_progress_ticks: u32,
    pub jump_cooldown: u32,
    pub water_jumping: bool,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: NavMode::Auto,
            target: None,
            arrival_radius: 1.0,
            air_arrival: AirArrival::Land,
            nodes: None,
            waypoints: Vec::new(),
            waypoint_index: 0,
            repath_cooldown: 0,
            needs_repath: false,
            last_distance: f64::INFINITY,
            no_progress_ticks: 0,
            jump_cooldown: 0,
            water_jumping: false,
        }
    }
}

impl NavState {
    fn reset_progress(&mut self) {
        self.no_progress_ticks = 0;
        self.last_distance = f64::INFINITY;
    }
}

impl ControlState {
    /// Set a navigation goal; planning starts on the next tick.
    pub fn set_nav_goal(&mut self, target: Vec3, mode: NavMode, arrival_radius: f64) {
        self.nav = NavState {
            enabled: true,
            mode,
            target: Some(target),
            arrival_radius: arrival_radius.max(0.0),
            needs_repath: true,
            ..NavState::default()
        };
    }

    /// Set an air navigation goal. With `land_on_floor` the target snaps to
    /// the terrain column below and the agent lands there; otherwise it
    /// stops gliding on proximity and drops.
    pub fn set_nav_goal_air<W: VoxelView>(
        &mut self,
        world: &W,
        target: Vec3,
        arrival_radius: f64,
        land_on_floor: bool,
    ) {
        let resolved = if land_on_floor {
            resolve_landing_target(world, target)
        } else {
            target
        };
        self.nav = NavState {
            enabled: true,
            mode: NavMode::Air,
            target: Some(resolved),
            arrival_radius: arrival_radius.max(0.0),
            air_arrival: if land_on_floor {
                AirArrival::Land
            } else {
                AirArrival::Drop
            },
            needs_repath: true,
            ..NavState::default()
        };
    }

    /// Discard the goal, waypoints, and any flight this navigation started.
    pub fn stop_navigation<W: BotWorldMut>(&mut self, world: &mut W, agent: W::Agent) {
        if self.nav.water_jumping {
            world.set_jump_held(agent, false);
        }
        self.nav = NavState::default();
        self.set_flight_enabled(world, agent, false);
    }

    pub fn is_navigating(&self) -> bool {
        self.nav.enabled
    }

    pub fn nav_mode(&self) -> NavMode {
        self.nav.mode
    }

    pub fn nav_target(&self) -> Option<Vec3> {
        self.nav.target
    }

    fn effective_mode<W: BotWorldMut>(
        &self,
        defaults: &NavDefaults,
        agent: W::Agent,
        world: &W,
    ) -> NavMode {
        match self.nav.mode {
            NavMode::Auto => {
                if world.in_water(agent) {
                    NavMode::Water
                } else if world.has_glider(agent) && defaults.flight_enabled {
                    NavMode::Air
                } else {
                    NavMode::Land
                }
            }
            explicit => explicit,
        }
    }

    pub(crate) fn tick_navigation<W: BotWorldMut>(
        &mut self,
        ctx: &TickContext,
        defaults: &NavDefaults,
        agent: W::Agent,
        world: &mut W,
    ) {
        if !self.nav.enabled {
            if self.nav.water_jumping {
                world.set_jump_held(agent, false);
                self.nav.water_jumping = false;
            }
            return;
        }
        if !defaults.navigation_enabled {
            self.stop_navigation(world, agent);
            return;
        }
        if world.is_passive(agent) {
            return;
        }

        if self.nav.repath_cooldown > 0 {
            self.nav.repath_cooldown -= 1;
        }
        if self.nav.jump_cooldown > 0 {
            self.nav.jump_cooldown -= 1;
        }

        let Some(target) = self.nav.target else {
            self.stop_navigation(world, agent);
            return;
        };
        let policy = self.overrides.resolved(defaults);

        // Clear cobwebs the agent is already tangled in.
        if policy.break_cobwebs {
            let feet = world.agent_cell(agent);
            let head_cobweb = world.material(feet.above()) == Material::Cobweb;
            if head_cobweb || world.material(feet) == Material::Cobweb {
                let pos = if head_cobweb { feet.above() } else { feet };
                self.actions.try_break(agent, world, pos, policy.auto_tool);
                self.nav.needs_repath = true;
                return;
            }
        }

        let mode = self.effective_mode(defaults, agent, world);

        // Arrival. Air goals with land-arrival keep running until touchdown;
        // the corridor must have been planned first, or the grounded agent
        // would "arrive" before takeoff.
        let position = world.position(agent);
        let arrived = match (mode, self.nav.air_arrival) {
            (NavMode::Air, AirArrival::Land) => {
                !self.nav.waypoints.is_empty()
                    && world.on_ground(agent)
                    && !world.is_gliding(agent)
                    && !self.flight.enabled
            }
            _ => position.distance(target) <= self.nav.arrival_radius,
        };
        if arrived {
            tracing::debug!(tick = ctx.tick, ?target, "navigation arrived");
            self.stop_navigation(world, agent);
            self.stop_movement(world, agent);
            return;
        }

        if mode == NavMode::Air {
            self.tick_air_navigation(ctx, defaults, agent, world, target);
            return;
        }

        if self.nav.needs_repath && self.nav.repath_cooldown == 0 {
            self.nav.needs_repath = false;
            self.nav.repath_cooldown = REPATH_COOLDOWN_TICKS;

            let settings = NavSettings {
                avoid_lava: policy.avoid_lava,
                avoid_fire: policy.avoid_fire,
                avoid_powder_snow: policy.avoid_powder_snow,
                avoid_cobwebs: policy.avoid_cobwebs,
                ..NavSettings::default()
            };
            let traversal = if mode == NavMode::Water {
                Traversal::Water
            } else {
                Traversal::Amphibious
            };
            let start = world.agent_cell(agent);
            let goal = CellPos::containing(target);
            match ground::find_path(world, start, goal, traversal, &settings) {
                Ok(path) => {
                    self.nav.waypoints = path.cells().map(CellPos::center).collect();
                    self.nav.nodes = Some(path);
                    self.nav.waypoint_index = 0;
                    self.nav.reset_progress();
                }
                Err(err) => {
                    tracing::debug!(tick = ctx.tick, %err, "ground planning failed, aborting");
                    self.stop_navigation(world, agent);
                    return;
                }
            }
        }

        // Ground modes never keep a glide active.
        if self.flight.enabled {
            self.set_flight_enabled(world, agent, false);
        }

        if self.nav.waypoint_index >= self.nav.waypoints.len() {
            self.nav.needs_repath = true;
            return;
        }
        let next = self.nav.waypoints[self.nav.waypoint_index];
        let dist = position.distance(next);

        if self.check_hazards_ahead(agent, world, &policy, next, dist) {
            return;
        }

        if policy.place_blocks && dist <= BRIDGE_REACH {
            let next_feet = CellPos::containing(next);
            if self.try_place_bridge(agent, world, next_feet) {
                self.nav.needs_repath = true;
                return;
            }
        }

        if dist <= WAYPOINT_RADIUS {
            self.nav.waypoint_index += 1;
            self.nav.reset_progress();
            if self.nav.water_jumping {
                world.set_jump_held(agent, false);
                self.nav.water_jumping = false;
            }
            return;
        }

        // Stuck detection: distance to the next waypoint must keep shrinking.
        if dist + 0.01 >= self.nav.last_distance {
            self.nav.no_progress_ticks += 1;
        } else {
            self.nav.no_progress_ticks = 0;
        }
        self.nav.last_distance = dist;

        if self.nav.no_progress_ticks > NO_PROGRESS_LIMIT {
            self.nav.no_progress_ticks = 0;
            if policy.break_blocks && self.try_break_obstruction(agent, world, policy.auto_tool) {
                self.nav.needs_repath = true;
                return;
            }
            tracing::debug!(tick = ctx.tick, "no progress, forcing re-path");
            self.nav.needs_repath = true;
            return;
        }

        self.steer_toward(world, agent, next, STEER_YAW_RATE);
        self.set_sneaking(world, agent, false);
        self.set_sprinting(world, agent, true);
        self.forward = 1.0;
        self.strafe = 0.0;

        let want_up = next.y > position.y + ASCEND_EPSILON;
        if mode == NavMode::Water {
            if world.in_water(agent) && want_up {
                world.set_jump_held(agent, true);
                self.nav.water_jumping = true;
            } else if self.nav.water_jumping {
                world.set_jump_held(agent, false);
                self.nav.water_jumping = false;
            }
        } else {
            let gap_jump = self
                .nav
                .nodes
                .as_ref()
                .and_then(|path| path.waypoints.get(self.nav.waypoint_index))
                .is_some_and(|wp| wp.move_kind == MoveKind::Parkour);
            let should_jump = want_up || (gap_jump && dist <= GAP_JUMP_TRIGGER);
            if should_jump && world.on_ground(agent) && self.nav.jump_cooldown == 0 {
                self.nav.jump_cooldown = JUMP_COOLDOWN_TICKS;
                self.actions
                    .start(agent, world, ActionKind::Jump, ActionTimer::once());
            }
        }
    }

    fn tick_air_navigation<W: BotWorldMut>(
        &mut self,
        ctx: &TickContext,
        defaults: &NavDefaults,
        agent: W::Agent,
        world: &mut W,
        target: Vec3,
    ) {
        if !defaults.flight_enabled {
            self.stop_navigation(world, agent);
            return;
        }
        // Between re-plans the flight controller flies the corridor.
        if !(self.nav.needs_repath && self.nav.repath_cooldown == 0) {
            return;
        }
        self.nav.needs_repath = false;
        self.nav.repath_cooldown = REPATH_COOLDOWN_TICKS;

        let settings = AirSettings::default();
        let start = world.agent_cell(agent);
        let goal = CellPos::containing(target);
        let raw = match air::find_path(world, start, goal, &settings) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(tick = ctx.tick, %err, "air planning failed, aborting");
                self.stop_navigation(world, agent);
                return;
            }
        };
        let waypoints: Vec<Vec3> = compress_cells(&raw, settings.waypoint_stride)
            .iter()
            .map(|c| c.center())
            .collect();

        self.nav.waypoints = waypoints.clone();
        self.nav.waypoint_index = 0;
        self.set_flight_enabled(world, agent, true);
        match self.nav.air_arrival {
            AirArrival::Drop => {
                self.set_flight_arrival(crate::FlightArrival::Stop);
                self.set_flight_goto_waypoints(waypoints, None, self.nav.arrival_radius);
            }
            AirArrival::Land => {
                self.set_flight_arrival(crate::FlightArrival::Land);
                self.set_flight_goto_waypoints(waypoints, Some(target), self.nav.arrival_radius);
            }
        }
    }

    /// The world can change under a planned path; re-plan instead of
    /// walking into a hazard, and clear cobwebs when that is permitted.
    fn check_hazards_ahead<W: BotWorldMut>(
        &mut self,
        agent: W::Agent,
        world: &mut W,
        policy: &NavPolicy,
        next: Vec3,
        dist: f64,
    ) -> bool {
        let next_feet = CellPos::containing(next);
        let at = world.material(next_feet);
        let below = world.material(next_feet.below());

        let cobweb_ahead = at == Material::Cobweb || below == Material::Cobweb;
        if policy.avoid_cobwebs && !policy.break_cobwebs && cobweb_ahead {
            self.nav.needs_repath = true;
            return true;
        }
        if policy.avoid_lava && (at == Material::Lava || below == Material::Lava) {
            self.nav.needs_repath = true;
            return true;
        }
        if policy.avoid_fire && (at == Material::Fire || below == Material::Fire) {
            self.nav.needs_repath = true;
            return true;
        }
        if policy.avoid_powder_snow && (at == Material::PowderSnow || below == Material::PowderSnow)
        {
            self.nav.needs_repath = true;
            return true;
        }
        if policy.break_cobwebs && cobweb_ahead && dist <= COBWEB_BREAK_REACH {
            let pos = if at == Material::Cobweb {
                next_feet
            } else {
                next_feet.below()
            };
            self.actions.try_break(agent, world, pos, policy.auto_tool);
            self.nav.needs_repath = true;
            return true;
        }
        false
    }

    /// Place a support block under an unsupported waypoint.
    fn try_place_bridge<W: BotWorldMut>(
        &mut self,
        agent: W::Agent,
        world: &mut W,
        target_feet: CellPos,
    ) -> bool {
        let place = target_feet.below();
        if world.material(place) != Material::Air {
            return false;
        }
        if !world.material(place.below()).supports_standing() {
            return false;
        }
        if world.place_block(agent, place) {
            world.swing(agent);
            return true;
        }
        false
    }

    /// Break whatever the agent is looking at, if anything is there.
    fn try_break_obstruction<W: BotWorldMut>(
        &mut self,
        agent: W::Agent,
        world: &mut W,
        auto_tool: bool,
    ) -> bool {
        match world.look_target(agent) {
            Some(voxbot_core::Target::Cell { pos, .. }) => {
                if world.material(pos) == Material::Air {
                    return false;
                }
                self.actions.try_break(agent, world, pos, auto_tool);
                true
            }
            _ => false,
        }
    }
}

/// Snap a requested air destination onto the terrain column below it.
fn resolve_landing_target<W: VoxelView>(world: &W, requested: Vec3) -> Vec3 {
    let x = requested.x.floor() as i32;
    let z = requested.z.floor() as i32;
    let y = (world.terrain_height(x, z) + 1).clamp(world.floor_y() + 1, world.ceiling_y() - 2);
    Vec3::new(x as f64 + 0.5, y as f64, z as f64 + 0.5)
}
