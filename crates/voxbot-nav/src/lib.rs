//! Bounded, deterministic A* pathfinding over the voxel lattice.
//!
//! One configurable ground engine covers walking, swimming, and the
//! extended movements (parkour, pillar-up, break-through, descend-by-mining)
//! behind [`NavSettings`] flags; a separate engine plans collision-free air
//! corridors for flight-capable agents.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod air;
pub mod ground;
pub mod path;
pub mod search;
pub mod settings;

pub use path::{compress_cells, MoveKind, Path, PathError, Waypoint};
pub use search::find_nearest_material;
pub use settings::{AirSettings, NavSettings, Traversal};
