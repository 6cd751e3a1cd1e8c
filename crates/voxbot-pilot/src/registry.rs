use std::collections::BTreeMap;

use voxbot_core::{AgentId, BotWorldMut, TickContext};

use crate::{ControlState, NavDefaults};

/// Explicit registry from agent handle to its [`ControlState`], owned by
/// whatever manages all agents.
///
/// Agents tick in stable key order so a run is reproducible regardless of
/// spawn order. Call [`ControlSet::remove`] when an agent leaves the world;
/// nothing here outlives its agent.
pub struct ControlSet<W: BotWorldMut> {
    states: BTreeMap<W::Agent, ControlState>,
}

impl<W: BotWorldMut> ControlSet<W> {
    pub fn new() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, agent: W::Agent) -> bool {
        self.states.contains_key(&agent)
    }

    pub fn state(&self, agent: W::Agent) -> Option<&ControlState> {
        self.states.get(&agent)
    }

    /// Fetch or create the control state for an agent.
    pub fn state_mut(&mut self, agent: W::Agent) -> &mut ControlState {
        self.states.entry(agent).or_default()
    }

    /// Drop all control state for an agent. Returns whether it existed.
    pub fn remove(&mut self, agent: W::Agent) -> bool {
        self.states.remove(&agent).is_some()
    }

    /// Tick every agent's control state once, in stable agent order.
    pub fn tick_all(&mut self, ctx: &TickContext, defaults: &NavDefaults, world: &mut W) {
        for (agent, state) in self.states.iter_mut() {
            tracing::trace!(tick = ctx.tick, agent = agent.stable_id(), "control tick");
            state.tick(ctx, defaults, *agent, world);
        }
    }
}

impl<W: BotWorldMut> Default for ControlSet<W> {
    fn default() -> Self {
        Self::new()
    }
}
