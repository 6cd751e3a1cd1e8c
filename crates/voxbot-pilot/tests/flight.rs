use voxbot_core::{BotWorldMut, BotWorldView, CellPos, GridWorld, TickContext, Vec3};
use voxbot_pilot::{ControlState, FlightArrival, FlightFault, NavDefaults};

const AGENT: u64 = 1;

fn flat_world() -> GridWorld {
    let mut world = GridWorld::flat(CellPos::new(0, 40, 0), 64, 64, 64, 63);
    world.spawn_agent(AGENT, CellPos::new(8, 64, 8));
    world
}

fn run_ticks(state: &mut ControlState, world: &mut GridWorld, defaults: &NavDefaults, ticks: u64) {
    for tick in 0..ticks {
        state.tick(&TickContext::new(tick), defaults, AGENT, world);
        world.advance();
    }
}

#[test]
fn air_goal_deploys_flies_and_lands() {
    let mut world = flat_world();
    world.agent_mut(AGENT).has_glider = true;
    let mut state = ControlState::new();
    let defaults = NavDefaults::default();
    let requested = CellPos::new(40, 64, 40).center();

    // Keep the turn radius (speed / yaw rate) inside the arrival radius so
    // waypoint capture cannot degenerate into circling.
    state.set_flight_speed(0.8);
    state.set_flight_rates(30.0, 30.0);
    state.set_nav_goal_air(&world, requested, 2.0, true);

    let mut deployed_seen = false;
    let mut finished_at = None;
    for tick in 0..2000u64 {
        state.tick(&TickContext::new(tick), &defaults, AGENT, &mut world);
        deployed_seen |= world.is_gliding(AGENT);
        world.advance();
        if !state.is_navigating() && !state.is_flight_enabled() {
            finished_at = Some(tick);
            break;
        }
    }

    assert!(deployed_seen, "the glider must actually deploy");
    assert!(finished_at.is_some(), "air navigation should complete");
    assert!(world.on_ground(AGENT));
    assert!(!world.is_gliding(AGENT));
    let position = world.position(AGENT);
    assert!(
        position.horizontal_distance_sq(requested) <= 9.0,
        "landed too far from the goal: {position:?}"
    );
    assert!(state.flight_fault().is_none());
}

#[test]
fn no_glider_disables_flight_without_deploy_attempts() {
    let mut world = flat_world();
    let mut state = ControlState::new();
    let defaults = NavDefaults::default();

    state.set_flight_enabled(&mut world, AGENT, true);
    state.set_flight_goto(CellPos::new(40, 80, 40).center(), 1.0);
    state.tick(&TickContext::new(0), &defaults, AGENT, &mut world);

    assert!(!state.is_flight_enabled());
    assert_eq!(state.flight_fault(), Some(FlightFault::NoGlider));
    assert_eq!(world.agent(AGENT).jumps, 0, "no takeoff without a glider");
}

#[test]
fn deployment_gives_up_after_the_attempt_budget() {
    let mut world = flat_world();
    {
        let agent = world.agent_mut(AGENT);
        agent.has_glider = true;
        agent.deploy_after_attempts = 1000; // never deploys
    }
    let mut state = ControlState::new();
    let defaults = NavDefaults::default();

    state.set_flight_enabled(&mut world, AGENT, true);
    state.set_flight_goto(CellPos::new(40, 80, 40).center(), 1.0);
    run_ticks(&mut state, &mut world, &defaults, 120);

    assert!(!state.is_flight_enabled());
    assert_eq!(state.flight_fault(), Some(FlightFault::DeploymentTimeout));
}

#[test]
fn freeze_arrival_holds_position_with_gravity_suspended() {
    let mut world = flat_world();
    {
        let agent = world.agent_mut(AGENT);
        agent.has_glider = true;
        agent.gliding = true;
        agent.on_ground = false;
        agent.position = Vec3::new(8.5, 90.0, 8.5);
    }
    let mut state = ControlState::new();
    let defaults = NavDefaults::default();
    let target = Vec3::new(20.5, 90.0, 8.5);

    // Already facing the target so the approach is a straight line.
    world.set_rotation(AGENT, voxbot_core::Rotation::new(-90.0, 0.0));
    state.set_flight_enabled(&mut world, AGENT, true);
    state.set_flight_goto(target, 2.0);
    state.set_flight_arrival(FlightArrival::Freeze);
    run_ticks(&mut state, &mut world, &defaults, 200);

    assert!(state.is_flight_enabled());
    assert!(state.is_flight_frozen());
    assert!(world.gravity_suspended(AGENT));
    assert_eq!(world.velocity(AGENT), Vec3::ZERO);
    assert!(world.position(AGENT).horizontal_distance_sq(target) <= 4.0 + 1.0);

    // Unfreezing restores the captured gravity state.
    state.set_flight_frozen(&mut world, AGENT, false);
    assert!(!world.gravity_suspended(AGENT));
}

#[test]
fn heading_mode_turns_at_the_bounded_rate() {
    let mut world = flat_world();
    {
        let agent = world.agent_mut(AGENT);
        agent.has_glider = true;
        agent.gliding = true;
        agent.on_ground = false;
        agent.position = Vec3::new(32.5, 90.0, 32.5);
    }
    let mut state = ControlState::new();
    let defaults = NavDefaults::default();

    state.set_flight_enabled(&mut world, AGENT, true);
    state.set_flight_heading(90.0, 0.0);

    state.tick(&TickContext::new(0), &defaults, AGENT, &mut world);
    let after_one = world.rotation(AGENT).yaw;
    assert!(
        (after_one - 10.0).abs() < 1e-3,
        "yaw must step by the configured rate, got {after_one}"
    );

    run_ticks(&mut state, &mut world, &defaults, 20);
    assert!((world.rotation(AGENT).yaw - 90.0).abs() < 1e-3);
    // Yaw 90 points toward negative x.
    assert!(world.position(AGENT).x < 32.5);
}

#[test]
fn stopping_navigation_also_stops_its_flight() {
    let mut world = flat_world();
    world.agent_mut(AGENT).has_glider = true;
    let mut state = ControlState::new();
    let defaults = NavDefaults::default();

    state.set_nav_goal_air(&world, CellPos::new(40, 64, 40).center(), 1.5, true);
    run_ticks(&mut state, &mut world, &defaults, 10);
    assert!(state.is_flight_enabled(), "flight should be active mid-route");

    state.stop_navigation(&mut world, AGENT);
    assert!(!state.is_navigating());
    assert!(!state.is_flight_enabled());
}

#[test]
fn flight_master_switch_prevents_air_mode() {
    let mut world = flat_world();
    world.agent_mut(AGENT).has_glider = true;
    let mut state = ControlState::new();
    let defaults = NavDefaults {
        flight_enabled: false,
        ..NavDefaults::default()
    };

    // Auto mode with a glider would normally pick air; with the master
    // switch off it must stay on land.
    state.set_nav_goal(CellPos::new(20, 64, 8).center(), voxbot_pilot::NavMode::Auto, 1.0);
    let mut flight_seen = false;
    for tick in 0..600u64 {
        state.tick(&TickContext::new(tick), &defaults, AGENT, &mut world);
        flight_seen |= state.is_flight_enabled();
        world.advance();
        if !state.is_navigating() {
            break;
        }
    }
    assert!(!flight_seen);
    assert!(world.on_ground(AGENT));
}
