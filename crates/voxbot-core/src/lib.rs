//! Engine-agnostic kernel primitives for voxel-world agent control.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod grid;
pub mod material;
pub mod math;
pub mod tick;
pub mod world;

pub use agent::AgentId;
pub use grid::{GridAgent, GridWorld};
pub use material::Material;
pub use math::{
    direction_from_angles, step_angle, step_yaw, wrap_degrees, CellPos, Face, Rotation, Vec3,
};
pub use tick::TickContext;
pub use world::{
    AttemptOutcome, BotWorldMut, BotWorldView, EntityId, Target, VoxelView, WorldMut, WorldView,
};
