use voxbot_actions::{ActionKind, ActionPack, ActionTimer};
use voxbot_core::{step_yaw, BotWorldMut, Face, Rotation, TickContext, Vec3};

use crate::defaults::NavDefaults;
use crate::flight::FlightState;
use crate::navigate::NavState;
use crate::NavOverrides;

/// The per-agent mutable control record: active actions, movement intent,
/// navigation sub-state, and flight sub-state.
///
/// Exclusively owned by its agent; the host calls [`ControlState::tick`]
/// once per world tick (usually through a
/// [`ControlSet`](crate::ControlSet)). A failure in one agent's update
/// aborts that agent's goal, never the tick loop.
#[derive(Debug, Default)]
pub struct ControlState {
    pub actions: ActionPack,
    pub overrides: NavOverrides,
    pub(crate) nav: NavState,
    pub(crate) flight: FlightState,
    pub(crate) sneaking: bool,
    pub(crate) sprinting: bool,
    pub(crate) forward: f32,
    pub(crate) strafe: f32,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- orientation -----------------------------------------------------

    pub fn look<W: BotWorldMut>(&self, world: &mut W, agent: W::Agent, yaw: f32, pitch: f32) {
        world.set_rotation(agent, Rotation::new(yaw, pitch));
    }

    pub fn look_face<W: BotWorldMut>(&self, world: &mut W, agent: W::Agent, face: Face) {
        let yaw = world.rotation(agent).yaw;
        let (yaw, pitch) = match face {
            Face::North => (180.0, 0.0),
            Face::South => (0.0, 0.0),
            Face::East => (-90.0, 0.0),
            Face::West => (90.0, 0.0),
            Face::Up => (yaw, -90.0),
            Face::Down => (yaw, 90.0),
        };
        self.look(world, agent, yaw, pitch);
    }

    pub fn look_at<W: BotWorldMut>(&self, world: &mut W, agent: W::Agent, target: Vec3) {
        let rotation = Rotation::toward(world.eye_position(agent), target);
        world.set_rotation(agent, rotation);
    }

    pub fn turn<W: BotWorldMut>(&self, world: &mut W, agent: W::Agent, dyaw: f32, dpitch: f32) {
        let rotation = world.rotation(agent);
        self.look(world, agent, rotation.yaw + dyaw, rotation.pitch + dpitch);
    }

    // --- movement intent -------------------------------------------------

    pub fn set_sneaking<W: BotWorldMut>(&mut self, world: &mut W, agent: W::Agent, sneak: bool) {
        self.sneaking = sneak;
        world.set_sneaking(agent, sneak);
    }

    pub fn set_sprinting<W: BotWorldMut>(&mut self, world: &mut W, agent: W::Agent, sprint: bool) {
        self.sprinting = sprint;
        world.set_sprinting(agent, sprint);
    }

    pub fn set_forward(&mut self, value: f32) {
        self.forward = value;
    }

    pub fn set_strafe(&mut self, value: f32) {
        self.strafe = value;
    }

    pub fn stop_movement<W: BotWorldMut>(&mut self, world: &mut W, agent: W::Agent) {
        self.set_sneaking(world, agent, false);
        self.set_sprinting(world, agent, false);
        self.forward = 0.0;
        self.strafe = 0.0;
        world.set_move_input(agent, 0.0, 0.0);
    }

    // --- actions ---------------------------------------------------------

    pub fn start_action<W: BotWorldMut>(
        &mut self,
        world: &mut W,
        agent: W::Agent,
        kind: ActionKind,
        timer: ActionTimer,
    ) {
        self.actions.start(agent, world, kind, timer);
    }

    pub fn stop_action<W: BotWorldMut>(&mut self, world: &mut W, agent: W::Agent, kind: ActionKind) {
        self.actions.stop(agent, world, kind);
    }

    pub fn set_attack_critical(&mut self, critical: bool) {
        self.actions.set_attack_critical(critical);
    }

    /// Stop every action (with cleanup), flight, navigation, and movement.
    pub fn stop_all<W: BotWorldMut>(&mut self, world: &mut W, agent: W::Agent) {
        self.actions.stop_all(agent, world);
        self.set_flight_enabled(world, agent, false);
        self.stop_navigation(world, agent);
        self.stop_movement(world, agent);
    }

    // --- per-tick update -------------------------------------------------

    /// One synchronous control update: auto-eat gate, due actions,
    /// navigation, flight, then movement intent write-back.
    pub fn tick<W: BotWorldMut>(
        &mut self,
        ctx: &TickContext,
        defaults: &NavDefaults,
        agent: W::Agent,
        world: &mut W,
    ) {
        if self.maybe_auto_eat(defaults, agent, world) {
            self.stop_movement(world, agent);
            return;
        }

        self.actions.tick(ctx, agent, world);
        self.tick_navigation(ctx, defaults, agent, world);
        self.tick_flight(ctx, defaults, agent, world);

        if self.flight.enabled {
            // Flight owns the velocity; held walk inputs would fight it.
            world.set_move_input(agent, 0.0, 0.0);
            return;
        }
        let mut vel = if self.sneaking { 0.3 } else { 1.0 };
        if world.is_using_item(agent) {
            vel *= 0.2;
        }
        world.set_move_input(agent, self.forward * vel, self.strafe * vel);
    }

    /// Eat when hungry enough and navigation is active. Movement is
    /// suppressed by the caller while this returns true.
    fn maybe_auto_eat<W: BotWorldMut>(
        &mut self,
        defaults: &NavDefaults,
        agent: W::Agent,
        world: &mut W,
    ) -> bool {
        let policy = self.overrides.resolved(defaults);
        if !self.nav.enabled || !policy.auto_eat {
            return false;
        }
        if world.hunger(agent) > policy.auto_eat_below {
            return false;
        }
        if world.is_using_item(agent) {
            return true;
        }
        world.begin_eating(agent)
    }

    /// Bounded-rate steering toward a point: yaw only, pitch untouched.
    pub(crate) fn steer_toward<W: BotWorldMut>(
        &self,
        world: &mut W,
        agent: W::Agent,
        target: Vec3,
        max_yaw_step: f32,
    ) {
        let desired = Rotation::toward(world.eye_position(agent), target);
        let current = world.rotation(agent);
        world.set_rotation(
            agent,
            Rotation::new(
                step_yaw(current.yaw, desired.yaw, max_yaw_step),
                current.pitch,
            ),
        );
    }
}
