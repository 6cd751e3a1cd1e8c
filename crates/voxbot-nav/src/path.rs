use voxbot_core::CellPos;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Movement used to reach a path cell. The follower picks its execution
/// (plain steering, a timed jump, placing, mining) from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveKind {
    Walk,
    Jump,
    Fall,
    Parkour,
    Pillar,
    BreakThrough,
    Swim,
    DescendMine,
}

/// One planned lattice position plus how to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waypoint {
    pub cell: CellPos,
    pub move_kind: MoveKind,
}

/// Ordered waypoint list produced by one planning call. Replaced wholesale
/// on re-plan; followers only ever advance an index into it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Path {
    pub waypoints: Vec<Waypoint>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn first(&self) -> Option<Waypoint> {
        self.waypoints.first().copied()
    }

    pub fn last(&self) -> Option<Waypoint> {
        self.waypoints.last().copied()
    }

    pub fn cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        self.waypoints.iter().map(|w| w.cell)
    }
}

/// Why a planning call produced no path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("start position cannot be resolved to a traversable cell")]
    UnresolvableStart,
    #[error("goal position cannot be resolved to a traversable cell")]
    UnresolvableGoal,
    #[error("open set exhausted before reaching the goal")]
    SearchExhausted,
    #[error("search bounds exceeded before reaching the goal")]
    BoundsExceeded,
}

/// Down-sample a raw cell path by fixed stride, always keeping the first
/// and last cell.
pub fn compress_cells(raw: &[CellPos], stride: usize) -> Vec<CellPos> {
    let stride = stride.max(1);
    if raw.len() <= 2 {
        return raw.to_vec();
    }
    let mut out = Vec::with_capacity(raw.len() / stride + 2);
    out.push(raw[0]);
    let mut i = stride;
    while i < raw.len() - 1 {
        out.push(raw[i]);
        i += stride;
    }
    out.push(raw[raw.len() - 1]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_keeps_endpoints() {
        let raw: Vec<CellPos> = (0..10).map(|i| CellPos::new(i, 64, 0)).collect();
        let out = compress_cells(&raw, 4);
        assert_eq!(out.first().copied(), raw.first().copied());
        assert_eq!(out.last().copied(), raw.last().copied());
        assert_eq!(out, vec![raw[0], raw[4], raw[8], raw[9]]);
    }

    #[test]
    fn compress_passes_short_paths_through() {
        let raw = vec![CellPos::new(0, 64, 0), CellPos::new(1, 64, 0)];
        assert_eq!(compress_cells(&raw, 4), raw);
    }
}
