use voxbot_actions::{ActionKind, ActionPack, ActionTimer};
use voxbot_core::{
    AttemptOutcome, BotWorldView, CellPos, GridWorld, Material, Target, TickContext, VoxelView,
};

const AGENT: u64 = 1;

fn flat_world() -> GridWorld {
    let mut world = GridWorld::flat(CellPos::new(0, 60, 0), 16, 24, 16, 63);
    world.spawn_agent(AGENT, CellPos::new(8, 64, 8));
    world
}

fn run_ticks(pack: &mut ActionPack, world: &mut GridWorld, ticks: u64) {
    for tick in 0..ticks {
        pack.tick(&TickContext::new(tick), AGENT, world);
        world.advance();
    }
}

#[test]
fn once_jump_executes_exactly_one_attempt() {
    let mut world = flat_world();
    let mut pack = ActionPack::new();
    pack.start(AGENT, &mut world, ActionKind::Jump, ActionTimer::once());

    run_ticks(&mut pack, &mut world, 5);

    assert_eq!(world.agent(AGENT).jumps, 1);
    assert!(!pack.is_active(ActionKind::Jump));
}

#[test]
fn interval_action_repeats_until_stopped() {
    let mut world = flat_world();
    let mut pack = ActionPack::new();
    pack.start(
        AGENT,
        &mut world,
        ActionKind::DropOne,
        ActionTimer::every(4),
    );

    run_ticks(&mut pack, &mut world, 12);
    assert_eq!(world.agent(AGENT).drops, 3);

    pack.stop(AGENT, &mut world, ActionKind::DropOne);
    run_ticks(&mut pack, &mut world, 12);
    assert_eq!(world.agent(AGENT).drops, 3);
}

#[test]
fn success_required_use_keeps_trying_until_it_lands() {
    let mut world = flat_world();
    world.use_outcome = AttemptOutcome::Failure;
    let mut pack = ActionPack::new();
    pack.start(
        AGENT,
        &mut world,
        ActionKind::Use,
        ActionTimer::once_until_success(),
    );

    run_ticks(&mut pack, &mut world, 4);
    assert!(pack.is_active(ActionKind::Use), "failed attempts must not count");
    assert!(world.agent(AGENT).held_uses >= 4);

    world.use_outcome = AttemptOutcome::Success;
    run_ticks(&mut pack, &mut world, 2);
    assert!(!pack.is_active(ActionKind::Use));
}

#[test]
fn successful_use_preempts_same_tick_attack() {
    let mut world = flat_world();
    world.use_outcome = AttemptOutcome::Success;
    world.agent_mut(AGENT).forced_target = Some(Target::Entity(voxbot_core::EntityId(7)));

    let mut pack = ActionPack::new();
    pack.start(AGENT, &mut world, ActionKind::Use, ActionTimer::continuous());
    pack.start(
        AGENT,
        &mut world,
        ActionKind::Attack,
        ActionTimer::continuous(),
    );

    run_ticks(&mut pack, &mut world, 6);
    assert!(world.agent(AGENT).attacks.is_empty());
}

#[test]
fn successful_attack_retries_failed_use_in_the_same_tick() {
    let mut world = flat_world();
    world.use_outcome = AttemptOutcome::Failure;
    world.agent_mut(AGENT).forced_target = Some(Target::Entity(voxbot_core::EntityId(7)));

    let mut pack = ActionPack::new();
    pack.start(AGENT, &mut world, ActionKind::Use, ActionTimer::continuous());
    pack.start(
        AGENT,
        &mut world,
        ActionKind::Attack,
        ActionTimer::continuous(),
    );

    pack.tick(&TickContext::new(0), AGENT, &mut world);

    assert_eq!(world.agent(AGENT).attacks.len(), 1);
    // One attempt from the use action itself, one from the retry.
    assert_eq!(world.agent(AGENT).entity_interactions, 2);
}

#[test]
fn restarting_a_continuous_action_is_a_no_op() {
    let mut world = flat_world();
    let mut pack = ActionPack::new();
    pack.start(AGENT, &mut world, ActionKind::Jump, ActionTimer::continuous());
    run_ticks(&mut pack, &mut world, 3);
    let attempts_before = pack.timer(ActionKind::Jump).unwrap().attempts();

    pack.start(AGENT, &mut world, ActionKind::Jump, ActionTimer::continuous());
    assert_eq!(
        pack.timer(ActionKind::Jump).unwrap().attempts(),
        attempts_before,
        "continuous restart must not reset the running timer"
    );
    assert!(world.agent(AGENT).jump_held);
}

#[test]
fn passive_agent_attempts_are_suppressed_but_still_counted() {
    let mut world = flat_world();
    world.agent_mut(AGENT).passive = true;
    let mut pack = ActionPack::new();
    pack.start(AGENT, &mut world, ActionKind::Jump, ActionTimer::once());

    run_ticks(&mut pack, &mut world, 3);
    assert_eq!(world.agent(AGENT).jumps, 0);
    assert!(!pack.is_active(ActionKind::Jump));
}

#[test]
fn attack_breaks_a_targeted_block_over_time() {
    let mut world = flat_world();
    let target = CellPos::new(8, 64, 10);
    world.set(target, Material::DIRT);
    world.agent_mut(AGENT).forced_target = Some(Target::Cell {
        pos: target,
        face: voxbot_core::Face::North,
    });

    let mut pack = ActionPack::new();
    pack.start(
        AGENT,
        &mut world,
        ActionKind::Attack,
        ActionTimer::continuous(),
    );

    run_ticks(&mut pack, &mut world, 40);
    assert_eq!(world.material(target), Material::Air);
    assert_eq!(world.agent(AGENT).broken, vec![target]);
}

#[test]
fn critical_attack_hits_only_while_falling() {
    let mut world = flat_world();
    world.agent_mut(AGENT).forced_target = Some(Target::Entity(voxbot_core::EntityId(3)));

    let mut pack = ActionPack::new();
    pack.set_attack_critical(true);
    pack.start(
        AGENT,
        &mut world,
        ActionKind::Attack,
        ActionTimer::every_until_success(5),
    );

    let mut hit_velocities = Vec::new();
    for tick in 0..60u64 {
        let before = world.agent(AGENT).attacks.len();
        pack.tick(&TickContext::new(tick), AGENT, &mut world);
        if world.agent(AGENT).attacks.len() > before {
            hit_velocities.push(world.velocity(AGENT).y);
        }
        world.advance();
    }

    assert!(!world.agent(AGENT).attacks.is_empty());
    assert!(world.agent(AGENT).jumps >= 1, "crit cycle starts with a jump");
    assert!(
        hit_velocities.iter().all(|vy| *vy < 0.0),
        "every critical hit must land while falling, got {hit_velocities:?}"
    );
}
