//! Flight controller: glider deployment, heading/attitude control, waypoint
//! sequencing, and arrival behavior, layered under the navigation
//! controller.

use voxbot_core::{
    direction_from_angles, step_angle, step_yaw, BotWorldMut, Rotation, TickContext, Vec3,
};

use crate::defaults::NavDefaults;
use crate::ControlState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do when the final goto waypoint is reached with no landing
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FlightArrival {
    /// Cut the glide and let gravity take over.
    Stop,
    /// Hold position with gravity suspended.
    Freeze,
    /// Keep gliding with a gentle nose-down pitch.
    Descend,
    /// Dive onto the target column and stop on touchdown.
    #[default]
    Land,
    /// Keep circling the target.
    Circle,
}

/// Why flight shut itself down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlightFault {
    #[error("glider could not deploy within the attempt budget")]
    DeploymentTimeout,
    #[error("no usable glider equipped")]
    NoGlider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum FlightMode {
    #[default]
    Manual,
    Heading,
    Goto,
    Landing,
}

const DEPLOY_ATTEMPT_BUDGET: u32 = 20;
const TAKEOFF_TIMEOUT_TICKS: u32 = 40;
const LANDING_DIVE_PITCH: f32 = 80.0;
const DESCEND_PITCH: f32 = 20.0;

#[derive(Debug)]
pub(crate) struct FlightState {
    pub enabled: bool,
    pub frozen: bool,
    pub freeze_at_target: bool,
    pub arrival: FlightArrival,
    pub mode: FlightMode,

    /// Cruising speed in cells per tick.
    pub speed: f64,
    pub yaw_rate: f32,
    pub pitch_rate: f32,

    pub input_forward: f32,
    pub input_strafe: f32,
    pub input_up: f32,
    pub pitch_drives_forward: bool,

    pub target_yaw: f32,
    pub target_pitch: f32,
    pub target: Option<Vec3>,
    pub landing_target: Option<Vec3>,
    pub arrival_radius: f64,
    pub waypoints: Option<Vec<Vec3>>,
    pub waypoint_index: usize,

    pub prev_gravity_suspended: Option<bool>,
    pub prev_free_flight: Option<bool>,

    pub deploy_delay: u32,
    pub deploy_attempts: u32,
    pub takeoff_timeout: u32,
    pub takeoff_requested: bool,
    pub has_deployed: bool,

    pub launch_assist: bool,
    /// Gentle nose-down attitude for the takeoff jump.
    pub launch_pitch: f32,
    /// Horizontal boost (cells per tick) applied before deployment.
    pub launch_speed: f64,
    pub launch_ticks: u32,
    pub launch_remaining: u32,

    pub fault: Option<FlightFault>,
}

impl Default for FlightState {
    fn default() -> Self {
        Self {
            enabled: false,
            frozen: false,
            freeze_at_target: false,
            arrival: FlightArrival::Land,
            mode: FlightMode::Manual,
            speed: 1.6,
            yaw_rate: 10.0,
            pitch_rate: 10.0,
            input_forward: 1.0,
            input_strafe: 0.0,
            input_up: 0.0,
            pitch_drives_forward: true,
            target_yaw: 0.0,
            target_pitch: 0.0,
            target: None,
            landing_target: None,
            arrival_radius: 1.0,
            waypoints: None,
            waypoint_index: 0,
            prev_gravity_suspended: None,
            prev_free_flight: None,
            deploy_delay: 0,
            deploy_attempts: 0,
            takeoff_timeout: 0,
            takeoff_requested: false,
            has_deployed: false,
            launch_assist: true,
            launch_pitch: 18.0,
            launch_speed: 0.6,
            launch_ticks: 6,
            launch_remaining: 0,
            fault: None,
        }
    }
}

impl FlightState {
    fn reset_deployment(&mut self) {
        self.deploy_delay = 0;
        self.deploy_attempts = 0;
        self.takeoff_timeout = 0;
        self.takeoff_requested = false;
        self.has_deployed = false;
        self.launch_remaining = 0;
    }
}

impl ControlState {
    /// Enable or disable the flight controller. Enabling captures the
    /// host's free-flight grant and forces it off while flight-controlled;
    /// disabling restores it and clears every flight sub-state.
    pub fn set_flight_enabled<W: BotWorldMut>(
        &mut self,
        world: &mut W,
        agent: W::Agent,
        enabled: bool,
    ) {
        let was_enabled = self.flight.enabled;
        self.flight.enabled = enabled;
        if enabled && !was_enabled {
            self.flight.fault = None;
            self.flight.reset_deployment();
            if self.flight.prev_free_flight.is_none() {
                self.flight.prev_free_flight = Some(world.free_flight(agent));
            }
            if world.free_flight(agent) {
                world.set_free_flight(agent, false);
            }
        }
        if !enabled {
            self.set_flight_frozen(world, agent, false);
            self.flight.mode = FlightMode::Manual;
            self.flight.target = None;
            self.flight.landing_target = None;
            self.flight.waypoints = None;
            self.flight.waypoint_index = 0;
            self.flight.reset_deployment();
            if let Some(prev) = self.flight.prev_free_flight.take() {
                world.set_free_flight(agent, prev);
            }
        }
    }

    pub fn is_flight_enabled(&self) -> bool {
        self.flight.enabled
    }

    /// Freeze holds the agent mid-air with gravity suspended; unfreezing
    /// restores the captured gravity state.
    pub fn set_flight_frozen<W: BotWorldMut>(
        &mut self,
        world: &mut W,
        agent: W::Agent,
        frozen: bool,
    ) {
        self.flight.frozen = frozen;
        if !frozen {
            if let Some(prev) = self.flight.prev_gravity_suspended.take() {
                world.set_gravity_suspended(agent, prev);
            }
        }
    }

    pub fn is_flight_frozen(&self) -> bool {
        self.flight.frozen
    }

    pub fn set_flight_arrival(&mut self, arrival: FlightArrival) {
        self.flight.arrival = arrival;
        self.flight.freeze_at_target = arrival == FlightArrival::Freeze;
    }

    pub fn flight_arrival(&self) -> FlightArrival {
        self.flight.arrival
    }

    /// Why the controller last shut itself down, if it did.
    pub fn flight_fault(&self) -> Option<FlightFault> {
        self.flight.fault
    }

    pub fn set_flight_speed(&mut self, cells_per_tick: f64) {
        self.flight.speed = cells_per_tick.max(0.0);
    }

    pub fn set_flight_rates(&mut self, yaw_per_tick: f32, pitch_per_tick: f32) {
        self.flight.yaw_rate = yaw_per_tick.max(0.0);
        self.flight.pitch_rate = pitch_per_tick.max(0.0);
    }

    pub fn set_flight_launch_assist(&mut self, enabled: bool) {
        self.flight.launch_assist = enabled;
    }

    pub fn set_flight_launch_profile(&mut self, pitch: f32, speed: f64, ticks: u32) {
        self.flight.launch_pitch = pitch.clamp(-45.0, 45.0);
        self.flight.launch_speed = speed.max(0.0);
        self.flight.launch_ticks = ticks.min(20);
    }

    pub fn set_flight_pitch_drives_forward(&mut self, enabled: bool) {
        self.flight.pitch_drives_forward = enabled;
    }

    /// Manual control: forward/strafe/up inputs in [-1, 1].
    pub fn set_flight_input(&mut self, forward: f32, strafe: f32, up: f32) {
        self.flight.input_forward = forward.clamp(-1.0, 1.0);
        self.flight.input_strafe = strafe.clamp(-1.0, 1.0);
        self.flight.input_up = up.clamp(-1.0, 1.0);
        self.flight.mode = FlightMode::Manual;
        self.flight.target = None;
    }

    /// Hold a fixed orientation.
    pub fn set_flight_heading(&mut self, yaw: f32, pitch: f32) {
        self.flight.target_yaw = yaw;
        self.flight.target_pitch = pitch;
        self.flight.mode = FlightMode::Heading;
        self.flight.target = None;
    }

    /// Fly to a single position; requests takeoff if grounded.
    pub fn set_flight_goto(&mut self, target: Vec3, arrival_radius: f64) {
        self.flight.target = Some(target);
        self.flight.landing_target = None;
        self.flight.waypoints = None;
        self.flight.waypoint_index = 0;
        self.flight.arrival_radius = arrival_radius.max(0.0);
        self.flight.mode = FlightMode::Goto;
        self.flight.takeoff_requested = true;
        self.flight.takeoff_timeout = TAKEOFF_TIMEOUT_TICKS;
    }

    /// Fly a waypoint sequence; an optional final landing target starts a
    /// landing dive after the last waypoint.
    pub fn set_flight_goto_waypoints(
        &mut self,
        waypoints: Vec<Vec3>,
        landing_target: Option<Vec3>,
        arrival_radius: f64,
    ) {
        if waypoints.is_empty() {
            if let Some(landing) = landing_target {
                self.set_flight_goto(landing, arrival_radius);
            }
            return;
        }
        self.flight.target = Some(waypoints[0]);
        self.flight.waypoints = Some(waypoints);
        self.flight.waypoint_index = 0;
        self.flight.landing_target = landing_target;
        self.flight.arrival_radius = arrival_radius.max(0.0);
        self.flight.mode = FlightMode::Goto;
        self.flight.takeoff_requested = true;
        self.flight.takeoff_timeout = TAKEOFF_TIMEOUT_TICKS;
    }

    pub(crate) fn tick_flight<W: BotWorldMut>(
        &mut self,
        ctx: &TickContext,
        defaults: &NavDefaults,
        agent: W::Agent,
        world: &mut W,
    ) {
        if !self.flight.enabled {
            if let Some(prev) = self.flight.prev_gravity_suspended.take() {
                world.set_gravity_suspended(agent, prev);
            }
            return;
        }
        if !defaults.flight_enabled {
            self.set_flight_enabled(world, agent, false);
            return;
        }
        if world.is_passive(agent) {
            return;
        }

        // Touched down after a deployment: stop outright so the controller
        // does not bounce back into the air.
        if self.flight.has_deployed && world.on_ground(agent) && !world.is_gliding(agent) {
            tracing::debug!(tick = ctx.tick, "flight landed, disabling");
            self.set_flight_enabled(world, agent, false);
            return;
        }

        if !world.has_glider(agent) {
            self.flight.fault = Some(FlightFault::NoGlider);
            self.set_flight_enabled(world, agent, false);
            return;
        }

        if !world.is_gliding(agent) {
            if !self.tick_deployment(ctx, agent, world) {
                return;
            }
        }

        self.flight.has_deployed = true;
        self.flight.takeoff_requested = false;

        if self.flight.frozen {
            if self.flight.prev_gravity_suspended.is_none() {
                self.flight.prev_gravity_suspended = Some(world.gravity_suspended(agent));
                world.set_gravity_suspended(agent, true);
            }
            world.set_velocity(agent, Vec3::ZERO);
            return;
        }
        if let Some(prev) = self.flight.prev_gravity_suspended.take() {
            world.set_gravity_suspended(agent, prev);
        }

        let rotation = world.rotation(agent);
        let mut desired_yaw = rotation.yaw;
        let mut desired_pitch = rotation.pitch;

        match self.flight.mode {
            FlightMode::Heading => {
                desired_yaw = self.flight.target_yaw;
                desired_pitch = self.flight.target_pitch;
            }
            FlightMode::Goto => {
                let Some(target) = self.flight.target else {
                    return;
                };
                let position = world.position(agent);
                let radius = self.flight.arrival_radius;
                if position.horizontal_distance_sq(target) <= radius * radius {
                    self.handle_goto_arrival(ctx, agent, world);
                    return;
                }
                let aim = Rotation::toward(world.eye_position(agent), target);
                desired_yaw = aim.yaw;
                desired_pitch = aim.pitch;
            }
            FlightMode::Landing => {
                let Some(landing) = self.flight.landing_target else {
                    return;
                };
                let from = world.eye_position(agent);
                let level_target = Vec3::new(landing.x, from.y, landing.z);
                desired_yaw = Rotation::toward(from, level_target).yaw;
                desired_pitch = LANDING_DIVE_PITCH;
            }
            FlightMode::Manual => {}
        }

        let new_yaw = step_yaw(rotation.yaw, desired_yaw, self.flight.yaw_rate);
        let new_pitch =
            step_angle(rotation.pitch, desired_pitch, self.flight.pitch_rate).clamp(-90.0, 90.0);
        world.set_rotation(agent, Rotation::new(new_yaw, new_pitch));

        let thrust = self.compute_thrust(new_yaw, new_pitch);
        if thrust.length_sq() < 1.0e-8 {
            world.set_velocity(agent, Vec3::ZERO);
            return;
        }
        world.set_velocity(agent, thrust.normalize() * self.flight.speed);
    }

    /// Ground roll → jump → launch-assist boost → deployment attempts.
    /// Returns true once the agent is actually gliding.
    fn tick_deployment<W: BotWorldMut>(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
    ) -> bool {
        if world.on_ground(agent) {
            // Only auto-takeoff when flying somewhere; a bare "enable"
            // should not jump in place.
            if !self.flight.takeoff_requested {
                return false;
            }
            if self.flight.takeoff_timeout == 0 {
                tracing::debug!(tick = ctx.tick, "takeoff timed out, disabling flight");
                self.flight.fault = Some(FlightFault::DeploymentTimeout);
                self.set_flight_enabled(world, agent, false);
                return false;
            }
            self.flight.takeoff_timeout -= 1;

            if self.flight.deploy_attempts == 0 && self.flight.deploy_delay == 0 {
                // Aim at the flight target before jumping, nose slightly
                // down for the launch.
                let rotation = world.rotation(agent);
                let mut yaw_target = rotation.yaw;
                let aim = self
                    .flight
                    .waypoints
                    .as_ref()
                    .and_then(|w| w.get(self.flight.waypoint_index))
                    .copied()
                    .or(self.flight.target);
                if let Some(aim) = aim {
                    yaw_target = Rotation::toward(world.eye_position(agent), aim).yaw;
                }
                world.set_rotation(
                    agent,
                    Rotation::new(
                        step_yaw(rotation.yaw, yaw_target, self.flight.yaw_rate),
                        self.flight.launch_pitch,
                    ),
                );
                world.jump(agent);
                self.flight.deploy_delay = 1;
                self.flight.launch_remaining = if self.flight.launch_assist {
                    self.flight.launch_ticks
                } else {
                    0
                };
            }
            return false;
        }

        if self.flight.deploy_delay > 0 {
            self.flight.deploy_delay -= 1;
            // Horizontal boost while airborne but not yet deployed.
            if self.flight.launch_remaining > 0 && self.flight.launch_assist {
                self.flight.launch_remaining -= 1;
                let yaw = world.rotation(agent).yaw;
                let dir = direction_from_angles(0.0, yaw);
                let current = world.velocity(agent);
                world.set_velocity(
                    agent,
                    Vec3::new(
                        dir.x * self.flight.launch_speed,
                        current.y,
                        dir.z * self.flight.launch_speed,
                    ),
                );
            }
            return false;
        }

        if self.flight.deploy_attempts < DEPLOY_ATTEMPT_BUDGET {
            self.flight.deploy_attempts += 1;
            world.try_deploy_glider(agent);
        } else {
            tracing::debug!(tick = ctx.tick, "glider never deployed, disabling flight");
            self.flight.fault = Some(FlightFault::DeploymentTimeout);
            self.set_flight_enabled(world, agent, false);
            return false;
        }

        world.is_gliding(agent)
    }

    fn handle_goto_arrival<W: BotWorldMut>(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
    ) {
        if let Some(count) = self.flight.waypoints.as_ref().map(Vec::len) {
            self.flight.waypoint_index += 1;
            if self.flight.waypoint_index < count {
                let index = self.flight.waypoint_index;
                self.flight.target = self.flight.waypoints.as_ref().map(|w| w[index]);
                return;
            }
            // Corridor finished.
            self.flight.waypoints = None;
            self.flight.target = None;
            if self.flight.landing_target.is_some() {
                self.flight.mode = FlightMode::Landing;
                return;
            }
        }

        let arrival = if self.flight.freeze_at_target {
            FlightArrival::Freeze
        } else {
            self.flight.arrival
        };
        tracing::debug!(tick = ctx.tick, ?arrival, "flight goto arrived");
        match arrival {
            FlightArrival::Freeze => self.set_flight_frozen(world, agent, true),
            FlightArrival::Descend => {
                // Keep the glide but pitch down gently; stalling here would
                // read as "just falling".
                let yaw = world.rotation(agent).yaw;
                self.flight.target = None;
                self.flight.landing_target = None;
                self.flight.mode = FlightMode::Heading;
                self.flight.target_yaw = yaw;
                self.flight.target_pitch = DESCEND_PITCH;
            }
            FlightArrival::Circle => {
                // Keep holding/circling the target.
            }
            FlightArrival::Land => {
                self.flight.landing_target = self.flight.target.take();
                self.flight.mode = FlightMode::Landing;
            }
            FlightArrival::Stop => self.set_flight_enabled(world, agent, false),
        }
    }

    fn compute_thrust(&self, yaw: f32, pitch: f32) -> Vec3 {
        let forward_pitch = if self.flight.pitch_drives_forward {
            pitch
        } else {
            0.0
        };
        let forward = direction_from_angles(forward_pitch, yaw);
        let strafe = direction_from_angles(0.0, yaw - 90.0);
        let up = Vec3::new(0.0, 1.0, 0.0);
        forward * self.flight.input_forward as f64
            + strafe * self.flight.input_strafe as f64
            + up * self.flight.input_up as f64
    }
}
