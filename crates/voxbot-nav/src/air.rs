//! Bounded A* over collision-free air corridors above terrain, for
//! flight-capable agents.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use voxbot_core::{CellPos, VoxelView};

use crate::{AirSettings, PathError};

#[derive(Debug)]
struct OpenNode {
    f: f32,
    g: f32,
    cell: CellPos,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (f32, f32, CellPos, u64) {
        (self.f, self.g, self.cell, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        let (af, ag, ac, at) = self.key();
        let (bf, bg, bc, bt) = other.key();
        bf.total_cmp(&af)
            .then(bg.total_cmp(&ag))
            .then(bc.cmp(&ac))
            .then(bt.cmp(&at))
    }
}

/// Plan an air corridor from `start` to `goal`, both lifted to the nearest
/// valid cell above terrain first.
///
/// Bounds policy: unlike the ground engine, exceeding the expansion or
/// queue ceiling fails with `BoundsExceeded` — a partial air path would
/// strand the agent mid-flight.
pub fn find_path<W: VoxelView>(
    world: &W,
    start: CellPos,
    goal: CellPos,
    settings: &AirSettings,
) -> Result<Vec<CellPos>, PathError> {
    let start = lift_above_terrain(world, start, settings);
    let goal = lift_above_terrain(world, goal, settings);
    if !is_air_navigable(world, start, settings) {
        return Err(PathError::UnresolvableStart);
    }
    if !is_air_navigable(world, goal, settings) {
        return Err(PathError::UnresolvableGoal);
    }

    let mut open = BinaryHeap::new();
    let mut best: HashMap<CellPos, (Option<CellPos>, f32)> = HashMap::new();
    let mut closed: HashSet<CellPos> = HashSet::new();
    let mut tie: u64 = 0;

    best.insert(start, (None, 0.0));
    open.push(OpenNode {
        f: heuristic(start, goal),
        g: 0.0,
        cell: start,
        tie,
    });
    tie += 1;

    let bounds = SearchBounds::around(start, goal, settings);
    let mut expanded: u32 = 0;
    while let Some(node) = open.pop() {
        if expanded > settings.max_expanded || open.len() as u32 > settings.max_queued {
            tracing::trace!(expanded, queued = open.len(), "air search bounds exceeded");
            return Err(PathError::BoundsExceeded);
        }
        expanded += 1;

        let cell = node.cell;
        match best.get(&cell) {
            Some((_, g)) if *g == node.g => {}
            _ => continue,
        }
        if closed.contains(&cell) {
            continue;
        }
        if cell == goal {
            return Ok(reconstruct(&best, cell));
        }
        closed.insert(cell);

        // Full 26-neighborhood, weighted to favor level flight.
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let next = cell.offset(dx, dy, dz);
                    if !bounds.contains(next) {
                        continue;
                    }
                    if closed.contains(&next) {
                        continue;
                    }
                    if !is_air_navigable(world, next, settings) {
                        continue;
                    }

                    let g = node.g + step_cost(dx, dy, dz);
                    if let Some((_, prev_g)) = best.get(&next) {
                        if g >= *prev_g {
                            continue;
                        }
                    }
                    best.insert(next, (Some(cell), g));
                    open.push(OpenNode {
                        f: g + heuristic(next, goal),
                        g,
                        cell: next,
                        tie,
                    });
                    tie += 1;
                }
            }
        }
    }

    Err(PathError::SearchExhausted)
}

struct SearchBounds {
    min: CellPos,
    max: CellPos,
}

impl SearchBounds {
    fn around(start: CellPos, goal: CellPos, settings: &AirSettings) -> Self {
        Self {
            min: CellPos::new(
                start.x.min(goal.x) - settings.max_range_xz,
                start.y.min(goal.y) - settings.max_range_y,
                start.z.min(goal.z) - settings.max_range_xz,
            ),
            max: CellPos::new(
                start.x.max(goal.x) + settings.max_range_xz,
                start.y.max(goal.y) + settings.max_range_y,
                start.z.max(goal.z) + settings.max_range_xz,
            ),
        }
    }

    fn contains(&self, p: CellPos) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

fn heuristic(cell: CellPos, goal: CellPos) -> f32 {
    cell.dist_sq(goal).sqrt() as f32
}

/// Horizontal motion is cheapest; any vertical component pays a fixed
/// penalty, tri-axial diagonals a little more.
fn step_cost(dx: i32, dy: i32, dz: i32) -> f32 {
    let mut base = if dx != 0 && dz != 0 { 1.4142 } else { 1.0 };
    if dy != 0 {
        base += 0.35;
    }
    if dx != 0 && dy != 0 && dz != 0 {
        base += 0.15;
    }
    base
}

/// A cell is flyable when its column is resident, it clears the terrain
/// height-map by the configured margin, and enough cells above it are
/// collision-free.
fn is_air_navigable<W: VoxelView>(world: &W, cell: CellPos, settings: &AirSettings) -> bool {
    if !world.chunk_loaded(cell.x, cell.z) {
        return false;
    }
    let terrain = world.terrain_height(cell.x, cell.z);
    if cell.y < terrain + settings.terrain_clearance {
        return false;
    }
    for dy in 0..settings.air_clearance {
        if world.material(cell.above_n(dy)).blocks_movement() {
            return false;
        }
    }
    true
}

/// Snap a position up to the corridor band: at least `terrain_clearance`
/// over the height-map, clamped inside the world's vertical bounds.
pub fn lift_above_terrain<W: VoxelView>(
    world: &W,
    pos: CellPos,
    settings: &AirSettings,
) -> CellPos {
    let terrain = world.terrain_height(pos.x, pos.z);
    let min_y = terrain + settings.terrain_clearance;
    let y = pos
        .y
        .max(min_y)
        .clamp(
            world.floor_y() + 2,
            world.ceiling_y() - 2 - settings.air_clearance,
        );
    CellPos::new(pos.x, y, pos.z)
}

fn reconstruct(best: &HashMap<CellPos, (Option<CellPos>, f32)>, end: CellPos) -> Vec<CellPos> {
    let mut rev = vec![end];
    let mut cursor = best[&end].0;
    while let Some(cell) = cursor {
        rev.push(cell);
        cursor = best[&cell].0;
        if rev.len() > best.len() {
            break;
        }
    }
    rev.reverse();
    rev
}
