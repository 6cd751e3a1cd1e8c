use voxbot_core::{CellPos, Material, VoxelView};

/// Expanding-shell scan for the nearest cell whose material matches the
/// predicate, within `radius` columns of `center`. Unresident columns are
/// skipped. Returns after the first shell that contains any match, taking
/// the closest candidate within it.
pub fn find_nearest_material<W, F>(
    world: &W,
    center: CellPos,
    radius: i32,
    mut matches: F,
) -> Option<CellPos>
where
    W: VoxelView,
    F: FnMut(Material) -> bool,
{
    let mut nearest: Option<CellPos> = None;
    let mut nearest_dist = f64::MAX;

    for r in 0..=radius {
        for dx in -r..=r {
            for dz in -r..=r {
                // Shell rim only; the interior was scanned in earlier rings.
                if dx.abs() != r && dz.abs() != r {
                    continue;
                }
                let x = center.x + dx;
                let z = center.z + dz;
                if !world.chunk_loaded(x, z) {
                    continue;
                }
                for y in world.floor_y()..=world.ceiling_y() {
                    let pos = CellPos::new(x, y, z);
                    if !matches(world.material(pos)) {
                        continue;
                    }
                    let dist = center.dist_sq(pos);
                    if dist < nearest_dist {
                        nearest_dist = dist;
                        nearest = Some(pos);
                    }
                }
            }
        }
        if nearest.is_some() {
            return nearest;
        }
    }
    nearest
}
