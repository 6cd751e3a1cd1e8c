//! The configurable ground engine: bounded A* over standable/swimmable
//! cells with flag-gated extended movements.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use voxbot_core::{CellPos, Material, VoxelView};

use crate::{MoveKind, NavSettings, Path, PathError, Traversal, Waypoint};

const SQRT_2: f32 = 1.4142;

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
        // Reverse ordering to make BinaryHeap behave like a min-heap; the
        // insertion counter breaks cost ties deterministically.
        let (af, ag, ac, at) = self.key();
        let (bf, bg, bc, bt) = other.key();
        bf.total_cmp(&af)
            .then(bg.total_cmp(&ag))
            .then(bc.cmp(&ac))
            .then(bt.cmp(&at))
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    parent: Option<CellPos>,
    g: f32,
    move_kind: MoveKind,
}

struct SearchBounds {
    min: CellPos,
    max: CellPos,
}

impl SearchBounds {
    fn around(start: CellPos, goal: CellPos, range_xz: i32, range_y: i32) -> Self {
        Self {
            min: CellPos::new(
                start.x.min(goal.x) - range_xz,
                start.y.min(goal.y) - range_y,
                start.z.min(goal.z) - range_xz,
            ),
            max: CellPos::new(
                start.x.max(goal.x) + range_xz,
                start.y.max(goal.y) + range_y,
                start.z.max(goal.z) + range_xz,
            ),
        }
    }

    fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= self.min.x
            && x <= self.max.x
            && y >= self.min.y
            && y <= self.max.y
            && z >= self.min.z
            && z <= self.max.z
    }
}

struct Search<'a, W: VoxelView> {
    world: &'a W,
    settings: &'a NavSettings,
    traversal: Traversal,
    goal: CellPos,
    bounds: SearchBounds,
    hostile_overlay: HashSet<CellPos>,
    open: BinaryHeap<OpenNode>,
    best: HashMap<CellPos, Node>,
    closed: HashSet<CellPos>,
    tie: u64,
    closest: CellPos,
    closest_h: f32,
}

/// Plan a ground path from `start` to `goal`.
///
/// Bounds policy: when the expansion or queue ceiling is hit, this engine
/// returns a best-effort partial path toward the closest explored cell (or
/// `BoundsExceeded` when nothing useful was explored). A goal sealed away
/// within bounds yields `SearchExhausted`.
pub fn find_path<W: VoxelView>(
    world: &W,
    start: CellPos,
    goal: CellPos,
    traversal: Traversal,
    settings: &NavSettings,
) -> Result<Path, PathError> {
    let start = sanitize_endpoint(world, start, traversal, settings)
        .ok_or(PathError::UnresolvableStart)?;
    let goal = sanitize_endpoint(world, goal, traversal, settings)
        .ok_or(PathError::UnresolvableGoal)?;

    let hostile_overlay = if settings.avoid_hostiles {
        build_hostile_overlay(world, start, goal, settings)
    } else {
        HashSet::new()
    };

    let start_h = heuristic(start, goal, settings);
    let mut search = Search {
        world,
        settings,
        traversal,
        goal,
        bounds: SearchBounds::around(start, goal, settings.max_range_xz, settings.max_range_y),
        hostile_overlay,
        open: BinaryHeap::new(),
        best: HashMap::new(),
        closed: HashSet::new(),
        tie: 0,
        closest: start,
        closest_h: start_h,
    };
    search.best.insert(
        start,
        Node {
            parent: None,
            g: 0.0,
            move_kind: MoveKind::Walk,
        },
    );
    search.open.push(OpenNode {
        f: start_h,
        g: 0.0,
        cell: start,
        tie: 0,
    });
    search.tie = 1;

    let mut expanded: u32 = 0;
    while let Some(node) = search.open.pop() {
        if expanded > settings.max_expanded || search.open.len() as u32 > settings.max_queued {
            tracing::trace!(
                expanded,
                queued = search.open.len(),
                "ground search bounds exceeded, returning partial path"
            );
            return search.partial_path();
        }
        expanded += 1;

        let cell = node.cell;
        match search.best.get(&cell) {
            Some(best) if best.g == node.g => {}
            _ => continue, // stale heap entry
        }
        if search.closed.contains(&cell) {
            continue;
        }
        if cell == search.goal {
            return Ok(search.reconstruct(cell));
        }
        search.closed.insert(cell);

        let h = heuristic(cell, search.goal, settings);
        if h < search.closest_h {
            search.closest_h = h;
            search.closest = cell;
        }

        search.expand_walk(cell, node.g);
        if matches!(traversal, Traversal::Land | Traversal::Amphibious) {
            if settings.allow_parkour && settings.max_parkour_length >= 2 {
                search.expand_parkour(cell, node.g);
            }
            if settings.allow_pillar {
                search.expand_pillar(cell, node.g);
            }
            if settings.allow_descend_mine {
                search.expand_descend_mine(cell, node.g);
            }
        }
    }

    Err(PathError::SearchExhausted)
}

impl<W: VoxelView> Search<'_, W> {
    fn relax(&mut self, cell: CellPos, parent: CellPos, g: f32, move_kind: MoveKind) {
        if self.closed.contains(&cell) {
            return;
        }
        if let Some(prev) = self.best.get(&cell) {
            if g >= prev.g {
                return;
            }
        }
        self.best.insert(
            cell,
            Node {
                parent: Some(parent),
                g,
                move_kind,
            },
        );
        self.open.push(OpenNode {
            f: g + heuristic(cell, self.goal, self.settings),
            g,
            cell,
            tie: self.tie,
        });
        self.tie += 1;
    }

    /// Cardinal/diagonal steps with step-up, fall, and optional
    /// break-through when the column is mineable.
    fn expand_walk(&mut self, cell: CellPos, g: f32) {
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let diagonal = dx != 0 && dz != 0;
                if diagonal && !self.settings.allow_diagonal {
                    continue;
                }

                let nx = cell.x + dx;
                let nz = cell.z + dz;
                if !self.bounds.contains(nx, cell.y, nz) {
                    continue;
                }
                if !self.world.chunk_loaded(nx, nz) {
                    continue;
                }

                let mut move_kind = match self.traversal {
                    Traversal::Water => MoveKind::Swim,
                    _ => MoveKind::Walk,
                };
                let mut next = match self.traversal {
                    Traversal::Land => next_standable_land(self.world, cell, nx, nz, self.settings),
                    Traversal::Water => next_swimmable(self.world, cell, nx, nz, self.settings),
                    Traversal::Amphibious => next_amphibious(self.world, cell, nx, nz, self.settings),
                };

                if next.is_none()
                    && self.settings.allow_break_through
                    && self.traversal != Traversal::Water
                {
                    next = next_break_through(self.world, cell, nx, nz, self.settings);
                    if next.is_some() {
                        move_kind = MoveKind::BreakThrough;
                    }
                }
                let Some(next) = next else { continue };

                let dy = next.y - cell.y;
                if move_kind == MoveKind::Walk {
                    if dy > 0 {
                        move_kind = MoveKind::Jump;
                    } else if dy < 0 {
                        move_kind = MoveKind::Fall;
                    }
                }
                if diagonal && dy > 0 && !self.settings.allow_diagonal_ascend {
                    continue;
                }
                if diagonal && dy < 0 && !self.settings.allow_diagonal_descend {
                    continue;
                }
                if diagonal
                    && !can_move_diagonally(self.world, cell, dx, dz, self.traversal, self.settings)
                {
                    continue;
                }

                let cost = self.step_cost(cell, next, move_kind);
                self.relax(next, cell, g + cost, move_kind);
            }
        }
    }

    /// Straight-line gap jumps, landing up to one cell higher or lower,
    /// with a full mid-air clearance check.
    fn expand_parkour(&mut self, cell: CellPos, g: f32) {
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            'lengths: for len in 2..=self.settings.max_parkour_length {
                let nx = cell.x + dx * len;
                let nz = cell.z + dz * len;
                if !self.bounds.contains(nx, cell.y, nz) {
                    continue;
                }
                if !self.world.chunk_loaded(nx, nz) {
                    continue;
                }
                for i in 1..len {
                    if !self.world.chunk_loaded(cell.x + dx * i, cell.z + dz * i) {
                        continue 'lengths;
                    }
                }

                for dy in -1..=1 {
                    let landing = CellPos::new(nx, cell.y + dy, nz);
                    if !is_standable(self.world, landing, self.settings) {
                        continue;
                    }
                    if !jump_arc_clear(self.world, cell, landing, len, self.settings) {
                        continue;
                    }
                    let cost = self.step_cost(cell, landing, MoveKind::Parkour);
                    self.relax(landing, cell, g + cost, MoveKind::Parkour);
                }
            }
        }
    }

    /// "Place a block and stand on it": a node directly above at fixed high
    /// cost.
    fn expand_pillar(&mut self, cell: CellPos, g: f32) {
        let feet = cell.above();
        if !self.bounds.contains(feet.x, feet.y, feet.z) {
            return;
        }
        if !is_passable(self.world, feet, self.settings)
            || !is_passable(self.world, feet.above(), self.settings)
            || !is_passable(self.world, feet.above_n(2), self.settings)
        {
            return;
        }
        let cost = self.settings.pillar_cost + self.hostile_overlay_cost(feet);
        self.relax(feet, cell, g + cost, MoveKind::Pillar);
    }

    /// Mine the block underfoot and drop into its cell.
    fn expand_descend_mine(&mut self, cell: CellPos, g: f32) {
        let below = cell.below();
        if !self.bounds.contains(below.x, below.y, below.z) {
            return;
        }
        if !within_world_y(self.world, below.y) {
            return;
        }
        let material = self.world.material(below);
        if material == Material::Air || material.is_fluid() {
            // Already passable: that's a fall, not a mining descent.
            return;
        }
        if !material.is_breakable() {
            return;
        }
        let two_below = self.world.material(below.below());
        if self.settings.avoid_lava && two_below == Material::Lava {
            return;
        }
        if !two_below.supports_standing() {
            return;
        }

        let cost = self.settings.descend_mine_cost
            + estimate_break_cost(self.world, below, self.settings)
            + self.hostile_overlay_cost(below);
        self.relax(below, cell, g + cost, MoveKind::DescendMine);
    }

    fn hostile_overlay_cost(&self, cell: CellPos) -> f32 {
        if !self.settings.avoid_hostiles || self.hostile_overlay.is_empty() {
            return 0.0;
        }
        if self.hostile_overlay.contains(&cell) {
            self.settings.hostile_cost
        } else {
            0.0
        }
    }

    fn step_cost(&self, from: CellPos, next: CellPos, move_kind: MoveKind) -> f32 {
        let dx = (next.x - from.x).abs();
        let dz = (next.z - from.z).abs();
        let dy = next.y - from.y;

        let mut cost = match move_kind {
            MoveKind::Parkour => {
                let dist = ((dx * dx + dz * dz) as f32).sqrt();
                dist + self.settings.jump_penalty * 2.0
            }
            MoveKind::Pillar => self.settings.pillar_cost,
            MoveKind::BreakThrough => {
                self.settings.break_cost_base
                    + estimate_break_cost(self.world, next, self.settings)
                    + estimate_break_cost(self.world, next.above(), self.settings)
            }
            MoveKind::DescendMine => self.settings.descend_mine_cost,
            _ => {
                if dx != 0 && dz != 0 {
                    SQRT_2
                } else {
                    1.0
                }
            }
        };

        if dy > 0 {
            cost += self.settings.jump_penalty * dy as f32;
        } else if dy < 0 {
            let fall = -dy;
            if fall > self.settings.safe_fall_height {
                cost +=
                    self.settings.fall_damage_penalty * (fall - self.settings.safe_fall_height) as f32;
            }
            cost += 0.1 * fall as f32;
        }

        if self.settings.allow_sprint && move_kind == MoveKind::Walk && dy == 0 {
            cost *= self.settings.sprint_cost_multiplier;
        }

        let below = self.world.material(next.below());
        if self.settings.avoid_soul_sand && below == Material::SoulSand {
            cost *= 2.5;
        }
        if below == Material::Ice {
            // Slippery: prefer normal ground when available.
            cost *= 1.3;
        }
        if self.world.material(next).is_openable() {
            cost += 1.0;
        }

        cost + self.hostile_overlay_cost(next)
    }

    fn reconstruct(&self, end: CellPos) -> Path {
        let mut rev = Vec::new();
        let mut cursor = Some(end);
        while let Some(cell) = cursor {
            let node = &self.best[&cell];
            rev.push(Waypoint {
                cell,
                move_kind: node.move_kind,
            });
            cursor = node.parent;
            if rev.len() > self.best.len() {
                break; // broken parent chain; never expected
            }
        }
        rev.reverse();
        Path { waypoints: rev }
    }

    fn partial_path(&self) -> Result<Path, PathError> {
        let path = self.reconstruct(self.closest);
        if path.len() < 2 {
            return Err(PathError::BoundsExceeded);
        }
        Ok(path)
    }
}

fn heuristic(cell: CellPos, goal: CellPos, settings: &NavSettings) -> f32 {
    let mut dist = cell.dist_sq(goal).sqrt() as f32;
    if settings.allow_sprint {
        dist *= settings.sprint_cost_multiplier;
    }
    dist
}

fn build_hostile_overlay<W: VoxelView>(
    world: &W,
    start: CellPos,
    goal: CellPos,
    settings: &NavSettings,
) -> HashSet<CellPos> {
    let bounds = SearchBounds::around(start, goal, settings.max_range_xz, settings.max_range_y);
    let min = CellPos::new(bounds.min.x, world.floor_y(), bounds.min.z);
    let max = CellPos::new(bounds.max.x, world.ceiling_y(), bounds.max.z);

    let radius = settings.hostile_radius;
    let mut overlay = HashSet::new();
    for hostile in world.hostile_cells(min, max) {
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if dx * dx + dz * dz > radius * radius {
                    continue;
                }
                for dy in -2..=2 {
                    overlay.insert(hostile.offset(dx, dy, dz));
                }
            }
        }
    }
    overlay
}

pub(crate) fn within_world_y<W: VoxelView>(world: &W, y: i32) -> bool {
    y >= world.floor_y() + 1 && y <= world.ceiling_y() - 2
}

/// Whether an agent body segment can occupy the cell.
pub(crate) fn is_passable<W: VoxelView>(world: &W, pos: CellPos, settings: &NavSettings) -> bool {
    let material = world.material(pos);
    match material {
        Material::Lava if settings.avoid_lava => false,
        Material::Fire if settings.avoid_fire => false,
        Material::PowderSnow if settings.avoid_powder_snow => false,
        Material::Cobweb if settings.avoid_cobwebs => false,
        Material::Door => settings.open_doors,
        Material::Gate => settings.open_gates,
        other => !other.blocks_movement(),
    }
}

fn is_body_passable<W: VoxelView>(world: &W, feet: CellPos, settings: &NavSettings) -> bool {
    is_passable(world, feet, settings) && is_passable(world, feet.above(), settings)
}

pub(crate) fn is_standable<W: VoxelView>(world: &W, feet: CellPos, settings: &NavSettings) -> bool {
    within_world_y(world, feet.y)
        && is_body_passable(world, feet, settings)
        && world.material(feet.below()).supports_standing()
}

pub(crate) fn is_swimmable<W: VoxelView>(world: &W, feet: CellPos, settings: &NavSettings) -> bool {
    if !within_world_y(world, feet.y) {
        return false;
    }
    let head = feet.above();
    let in_water = world.material(feet) == Material::Water;
    let head_ok = world.material(head) == Material::Water || is_passable(world, head, settings);
    in_water && head_ok && is_passable(world, feet, settings) && is_passable(world, head, settings)
}

/// Surface cell: the agent can breathe because the cell above its head is
/// not also fluid.
fn is_water_surface<W: VoxelView>(world: &W, feet: CellPos) -> bool {
    world.material(feet.above_n(2)) != Material::Water
}

fn next_standable_land<W: VoxelView>(
    world: &W,
    from: CellPos,
    to_x: i32,
    to_z: i32,
    settings: &NavSettings,
) -> Option<CellPos> {
    for step_up in 0..=settings.max_step_up {
        let p = CellPos::new(to_x, from.y + step_up, to_z);
        if is_standable(world, p, settings) {
            return Some(p);
        }
    }
    for fall in 1..=settings.max_fall {
        let p = CellPos::new(to_x, from.y - fall, to_z);
        if is_standable(world, p, settings) {
            return Some(p);
        }
    }
    None
}

fn next_swimmable<W: VoxelView>(
    world: &W,
    from: CellPos,
    to_x: i32,
    to_z: i32,
    settings: &NavSettings,
) -> Option<CellPos> {
    if settings.allow_submerged {
        for dy in -2..=2 {
            let p = CellPos::new(to_x, from.y + dy, to_z);
            if within_world_y(world, p.y) && is_swimmable(world, p, settings) {
                return Some(p);
            }
        }
        return None;
    }

    // Surface-only: prefer positions where the agent can breathe.
    for dy in (-1..=1).rev() {
        let p = CellPos::new(to_x, from.y + dy, to_z);
        if within_world_y(world, p.y) && is_swimmable(world, p, settings) && is_water_surface(world, p)
        {
            return Some(p);
        }
    }
    // Fallback: any swimmable cell, so water entry/exit points don't dead-end.
    for dy in (-1..=1).rev() {
        let p = CellPos::new(to_x, from.y + dy, to_z);
        if within_world_y(world, p.y) && is_swimmable(world, p, settings) {
            return Some(p);
        }
    }
    None
}

fn next_amphibious<W: VoxelView>(
    world: &W,
    from: CellPos,
    to_x: i32,
    to_z: i32,
    settings: &NavSettings,
) -> Option<CellPos> {
    next_standable_land(world, from, to_x, to_z, settings)
        .or_else(|| next_swimmable(world, from, to_x, to_z, settings))
}

/// Mine into the target column at foot level: both body cells must be
/// breakable (or already clear), and the floor beneath must hold.
fn next_break_through<W: VoxelView>(
    world: &W,
    from: CellPos,
    to_x: i32,
    to_z: i32,
    settings: &NavSettings,
) -> Option<CellPos> {
    let feet = CellPos::new(to_x, from.y, to_z);
    let head = feet.above();
    let feet_material = world.material(feet);
    let head_material = world.material(head);

    let feet_blocked = feet_material.blocks_movement();
    let head_blocked = head_material.blocks_movement();
    if !feet_blocked && !head_blocked {
        return None; // already passable, no mining needed
    }
    if feet_blocked && !feet_material.is_breakable() {
        return None;
    }
    if head_blocked && !head_material.is_breakable() {
        return None;
    }

    let ground = world.material(feet.below());
    if !ground.supports_standing() {
        return None;
    }
    if settings.avoid_lava && ground == Material::Lava {
        return None;
    }
    Some(feet)
}

fn estimate_break_cost<W: VoxelView>(world: &W, pos: CellPos, settings: &NavSettings) -> f32 {
    let material = world.material(pos);
    if material == Material::Air {
        return 0.0;
    }
    let hardness = material.hardness();
    if !hardness.is_finite() {
        return f32::INFINITY;
    }
    settings.break_cost_base + hardness * 2.0
}

/// Reject diagonal corner-cutting: both flanking cells must let the body
/// through.
fn can_move_diagonally<W: VoxelView>(
    world: &W,
    from: CellPos,
    dx: i32,
    dz: i32,
    traversal: Traversal,
    settings: &NavSettings,
) -> bool {
    let a = from.offset(dx, 0, 0);
    let b = from.offset(0, 0, dz);
    if traversal == Traversal::Water {
        return is_swimmable(world, a, settings) && is_swimmable(world, b, settings);
    }
    is_body_passable(world, a, settings) && is_body_passable(world, b, settings)
}

/// Every cell along the jump must give three cells of clearance at the
/// higher of takeoff and landing height, plus headroom at takeoff.
fn jump_arc_clear<W: VoxelView>(
    world: &W,
    from: CellPos,
    landing: CellPos,
    distance: i32,
    settings: &NavSettings,
) -> bool {
    let dx = (landing.x - from.x).signum();
    let dz = (landing.z - from.z).signum();
    let base_y = from.y.max(landing.y);

    for i in 1..distance {
        let mid = CellPos::new(from.x + dx * i, base_y, from.z + dz * i);
        if !is_passable(world, mid, settings)
            || !is_passable(world, mid.above(), settings)
            || !is_passable(world, mid.above_n(2), settings)
        {
            return false;
        }
    }
    is_passable(world, from.above_n(2), settings)
}

fn sanitize_endpoint<W: VoxelView>(
    world: &W,
    around: CellPos,
    traversal: Traversal,
    settings: &NavSettings,
) -> Option<CellPos> {
    if !world.chunk_loaded(around.x, around.z) {
        return None;
    }
    match traversal {
        Traversal::Land => find_nearby_standable(world, around, settings),
        Traversal::Water => find_nearby_swimmable(world, around, settings),
        Traversal::Amphibious => find_nearby_swimmable(world, around, settings)
            .or_else(|| find_nearby_standable(world, around, settings)),
    }
}

fn find_nearby_standable<W: VoxelView>(
    world: &W,
    around: CellPos,
    settings: &NavSettings,
) -> Option<CellPos> {
    for dy in 0..=3 {
        let p = around.above_n(dy);
        if is_standable(world, p, settings) {
            return Some(p);
        }
    }
    for dy in 1..=8 {
        let p = around.below_n(dy);
        if is_standable(world, p, settings) {
            return Some(p);
        }
    }
    None
}

fn find_nearby_swimmable<W: VoxelView>(
    world: &W,
    around: CellPos,
    settings: &NavSettings,
) -> Option<CellPos> {
    if !settings.allow_submerged {
        // Surface mode: take the highest breathable cell.
        for dy in (-4..=4).rev() {
            let p = around.above_n(dy);
            if is_swimmable(world, p, settings) && is_water_surface(world, p) {
                return Some(p);
            }
        }
    }
    for dy in -4..=4 {
        let p = around.above_n(dy);
        if is_swimmable(world, p, settings) {
            return Some(p);
        }
    }
    None
}
