use std::collections::BTreeMap;

use voxbot_core::{BotWorldMut, CellPos, Material, Target, TickContext};

use crate::{ActionKind, ActionTimer};

/// Per-agent registry of active actions plus the bookkeeping they share
/// (item-use cooldown, block-break progress, critical-attack cycle).
///
/// `tick` is invoked exactly once per world tick. Kinds are processed in
/// [`ActionKind`] declaration order with two cross-action rules from the
/// host's input handling: a use that succeeds pre-empts a same-tick attack,
/// and an attack that succeeds retries a use that ran and failed earlier in
/// the same tick.
#[derive(Debug, Default)]
pub struct ActionPack {
    timers: BTreeMap<ActionKind, ActionTimer>,
    item_use_cooldown: u32,
    current_block: Option<CellPos>,
    break_progress: f32,
    block_hit_delay: u32,
    critical_attack: bool,
    crit_awaiting_ground: bool,
    crit_post_landing_delay: u32,
}

impl ActionPack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the timer for `kind`, cleaning up any previous
    /// timer. Restarting a continuous action over a running continuous one
    /// is a no-op so held controls don't flicker.
    pub fn start<W: BotWorldMut>(
        &mut self,
        agent: W::Agent,
        world: &mut W,
        kind: ActionKind,
        timer: ActionTimer,
    ) {
        if timer.is_continuous()
            && self
                .timers
                .get(&kind)
                .is_some_and(|current| current.is_continuous())
        {
            return;
        }
        if self.timers.remove(&kind).is_some() {
            self.cleanup(kind, agent, world);
        }
        self.timers.insert(kind, timer);
    }

    pub fn stop<W: BotWorldMut>(&mut self, agent: W::Agent, world: &mut W, kind: ActionKind) {
        if self.timers.remove(&kind).is_some() {
            self.cleanup(kind, agent, world);
        }
    }

    pub fn stop_all<W: BotWorldMut>(&mut self, agent: W::Agent, world: &mut W) {
        let kinds: Vec<ActionKind> = self.timers.keys().copied().collect();
        for kind in kinds {
            self.timers.remove(&kind);
            self.cleanup(kind, agent, world);
        }
        self.crit_awaiting_ground = false;
        self.crit_post_landing_delay = 0;
    }

    pub fn is_active(&self, kind: ActionKind) -> bool {
        self.timers.contains_key(&kind)
    }

    pub fn timer(&self, kind: ActionKind) -> Option<&ActionTimer> {
        self.timers.get(&kind)
    }

    /// Critical mode makes entity attacks follow the jump/fall/hit cycle;
    /// pair it with a success-required timer so only landed hits count.
    pub fn set_attack_critical(&mut self, critical: bool) {
        self.critical_attack = critical;
        if !critical {
            self.crit_awaiting_ground = false;
            self.crit_post_landing_delay = 0;
        }
    }

    /// Run every due action once. Call once per world tick.
    pub fn tick<W: BotWorldMut>(&mut self, ctx: &TickContext, agent: W::Agent, world: &mut W) {
        self.timers.retain(|_, timer| !timer.is_done());

        let mut attempts: BTreeMap<ActionKind, bool> = BTreeMap::new();
        for kind in ActionKind::ALL {
            if kind == ActionKind::Attack && attempts.get(&ActionKind::Use) == Some(&true) {
                // Use pre-empts attack: skip the attack entirely this tick.
                continue;
            }
            let Some(mut timer) = self.timers.remove(&kind) else {
                continue;
            };
            let suppressed = kind.blocked_while_passive() && world.is_passive(agent);

            if !timer.count_down() {
                if !suppressed {
                    self.cleanup(kind, agent, world);
                }
                self.timers.insert(kind, timer);
                continue;
            }

            if timer.flush_before_fire() && !suppressed {
                // Clear the lingering effect first so the host can process
                // the release before the next press.
                self.cleanup(kind, agent, world);
            }

            let outcome = if suppressed {
                None
            } else {
                Some(self.execute(kind, &timer, agent, world))
            };
            if let Some(result) = outcome {
                attempts.insert(kind, result);
            }

            if timer.register_attempt(outcome) {
                tracing::trace!(tick = ctx.tick, ?kind, "action reached its repeat limit");
                self.cleanup(kind, agent, world);
            } else {
                self.timers.insert(kind, timer);
            }

            if kind == ActionKind::Attack
                && outcome == Some(true)
                && attempts.get(&ActionKind::Use) == Some(&false)
            {
                self.retry_use(agent, world);
            }
        }
    }

    fn retry_use<W: BotWorldMut>(&mut self, agent: W::Agent, world: &mut W) {
        let Some(mut timer) = self.timers.remove(&ActionKind::Use) else {
            return;
        };
        if !(ActionKind::Use.blocked_while_passive() && world.is_passive(agent)) {
            let _ = self.execute(ActionKind::Use, &timer, agent, world);
        }
        if timer.register_retry() {
            self.cleanup(ActionKind::Use, agent, world);
        } else {
            self.timers.insert(ActionKind::Use, timer);
        }
    }

    fn execute<W: BotWorldMut>(
        &mut self,
        kind: ActionKind,
        timer: &ActionTimer,
        agent: W::Agent,
        world: &mut W,
    ) -> bool {
        match kind {
            ActionKind::Use => self.execute_use(agent, world),
            ActionKind::Attack => self.execute_attack(timer, agent, world),
            ActionKind::Jump => {
                if timer.limit() == Some(1) {
                    world.jump(agent);
                } else {
                    world.set_jump_held(agent, true);
                }
                false
            }
            ActionKind::DropOne => {
                world.drop_held(agent, false);
                false
            }
            ActionKind::DropStack => {
                world.drop_held(agent, true);
                false
            }
            ActionKind::SwapHands => {
                world.swap_hands(agent);
                false
            }
        }
    }

    fn cleanup<W: BotWorldMut>(&mut self, kind: ActionKind, agent: W::Agent, world: &mut W) {
        match kind {
            ActionKind::Use => {
                self.item_use_cooldown = 0;
                world.release_use(agent);
            }
            ActionKind::Attack => {
                if let Some(current) = self.current_block.take() {
                    world.abort_break(agent, current);
                    self.break_progress = 0.0;
                }
            }
            ActionKind::Jump => world.set_jump_held(agent, false),
            ActionKind::DropOne | ActionKind::DropStack | ActionKind::SwapHands => {}
        }
    }

    fn execute_use<W: BotWorldMut>(&mut self, agent: W::Agent, world: &mut W) -> bool {
        if self.item_use_cooldown > 0 {
            self.item_use_cooldown -= 1;
            return true;
        }
        if world.is_using_item(agent) {
            return true;
        }
        match world.look_target(agent) {
            Some(Target::Cell { pos, face }) => {
                let result = world.interact_cell(agent, pos, face);
                world.swing(agent);
                if result.is_success() {
                    self.item_use_cooldown = 3;
                    return true;
                }
            }
            Some(Target::Entity(entity)) => {
                if world.interact_entity(agent, entity).is_success() {
                    self.item_use_cooldown = 3;
                    return true;
                }
            }
            None => {}
        }
        if world.use_held_item(agent).is_success() {
            self.item_use_cooldown = 3;
            return true;
        }
        false
    }

    fn execute_attack<W: BotWorldMut>(
        &mut self,
        timer: &ActionTimer,
        agent: W::Agent,
        world: &mut W,
    ) -> bool {
        match world.look_target(agent) {
            Some(Target::Entity(entity)) => {
                if self.critical_attack {
                    // After a landed hit, wait for touchdown, then sit out
                    // the configured interval on the ground before the next
                    // jump. Hits only land while falling.
                    if self.crit_awaiting_ground {
                        if world.on_ground(agent) {
                            self.crit_awaiting_ground = false;
                            self.crit_post_landing_delay = timer.interval();
                        }
                        return false;
                    }
                    if self.crit_post_landing_delay > 0 {
                        if world.on_ground(agent) {
                            self.crit_post_landing_delay -= 1;
                        }
                        return false;
                    }
                    if world.on_ground(agent) {
                        world.jump(agent);
                        return false;
                    }
                    if world.velocity(agent).y >= 0.0 {
                        return false;
                    }
                }
                if !world.attack_ready(agent) {
                    return false;
                }
                world.attack_entity(agent, entity);
                world.swing(agent);
                if self.critical_attack {
                    self.crit_awaiting_ground = true;
                }
                true
            }
            Some(Target::Cell { pos, .. }) => {
                if self.block_hit_delay > 0 {
                    self.block_hit_delay -= 1;
                    return false;
                }
                if let Some(current) = self.current_block {
                    if world.material(current) == Material::Air {
                        self.current_block = None;
                        return false;
                    }
                }
                let broken = self.advance_break(agent, world, pos);
                world.swing(agent);
                broken
            }
            None => {
                // Miss: still swing to mimic holding attack, but not while
                // the charge is weak.
                if !world.attack_ready(agent) {
                    return false;
                }
                world.swing(agent);
                false
            }
        }
    }

    /// One swing's worth of break progression on `pos`. True when the cell
    /// broke this call.
    fn advance_break<W: BotWorldMut>(
        &mut self,
        agent: W::Agent,
        world: &mut W,
        pos: CellPos,
    ) -> bool {
        if world.instant_break(agent) {
            world.start_break(agent, pos);
            world.complete_break(agent, pos);
            self.current_block = None;
            self.block_hit_delay = 5;
            return true;
        }

        if self.current_block != Some(pos) {
            if let Some(previous) = self.current_block {
                world.abort_break(agent, previous);
            }
            world.start_break(agent, pos);
            let step = world.break_progress_step(agent, pos);
            if step >= 1.0 {
                world.complete_break(agent, pos);
                self.current_block = None;
                return true;
            }
            self.current_block = Some(pos);
            self.break_progress = 0.0;
            return false;
        }

        let step = world.break_progress_step(agent, pos);
        self.break_progress += step;
        if self.break_progress >= 1.0 {
            world.complete_break(agent, pos);
            self.current_block = None;
            self.break_progress = 0.0;
            self.block_hit_delay = 5;
            return true;
        }
        world.show_break_progress(agent, pos, (self.break_progress * 10.0) as u8);
        false
    }

    /// Work on breaking `pos` directly (obstruction/cobweb clearing while
    /// navigating). Returns true once the cell is gone.
    pub fn try_break<W: BotWorldMut>(
        &mut self,
        agent: W::Agent,
        world: &mut W,
        pos: CellPos,
        auto_tool: bool,
    ) -> bool {
        if self.block_hit_delay > 0 {
            self.block_hit_delay -= 1;
            return false;
        }
        let material = world.material(pos);
        if material == Material::Air {
            self.current_block = None;
            return true;
        }
        if auto_tool {
            let _ = world.select_best_tool(agent, material);
        }
        let broken = self.advance_break(agent, world, pos);
        if !broken {
            world.swing(agent);
        }
        broken
    }
}
