use voxbot_nav::{air, compress_cells, AirSettings, PathError};
use voxbot_core::{CellPos, GridWorld, Material, VoxelView};

fn open_sky() -> GridWorld {
    GridWorld::flat(CellPos::new(0, 56, 0), 48, 48, 48, 63)
}

fn small_settings() -> AirSettings {
    AirSettings {
        max_range_xz: 48,
        max_range_y: 32,
        ..AirSettings::default()
    }
}

#[test]
fn endpoints_are_lifted_above_terrain() {
    let world = open_sky();
    let settings = small_settings();
    // Start on the ground: well below the corridor band.
    let path = air::find_path(
        &world,
        CellPos::new(4, 64, 4),
        CellPos::new(30, 64, 30),
        &settings,
    )
    .expect("air path should exist");

    let first = path[0];
    let last = *path.last().unwrap();
    assert!(first.y >= 63 + settings.terrain_clearance);
    assert!(last.y >= 63 + settings.terrain_clearance);
}

#[test]
fn corridor_cells_clear_a_ridge() {
    let mut world = open_sky();
    // Ridge across the middle, 20 cells above the floor.
    for x in 0..48 {
        world.fill(
            CellPos::new(x, 64, 22),
            CellPos::new(x, 83, 24),
            Material::STONE,
        );
    }
    let settings = small_settings();
    let path = air::find_path(
        &world,
        CellPos::new(8, 75, 4),
        CellPos::new(8, 75, 44),
        &settings,
    )
    .expect("air path should exist");

    for cell in &path {
        let terrain = world.terrain_height(cell.x, cell.z);
        assert!(
            cell.y >= terrain + settings.terrain_clearance,
            "cell {cell:?} hugs the terrain"
        );
    }
}

#[test]
fn unresident_columns_are_never_entered() {
    let mut world = open_sky();
    world.set_column_unloaded(12, 20);
    let settings = small_settings();
    let path = air::find_path(
        &world,
        CellPos::new(8, 80, 20),
        CellPos::new(20, 80, 20),
        &settings,
    )
    .expect("air path should exist");

    assert!(!path.iter().any(|c| c.x == 12 && c.z == 20));
}

#[test]
fn blocked_sky_reports_unresolvable_goal() {
    let mut world = open_sky();
    // Tower to near the world ceiling: no valid corridor band remains.
    world.fill(
        CellPos::new(40, 64, 40),
        CellPos::new(40, 101, 40),
        Material::BEDROCK,
    );
    let settings = small_settings();
    let result = air::find_path(
        &world,
        CellPos::new(8, 80, 8),
        CellPos::new(40, 80, 40),
        &settings,
    );
    assert_eq!(result.unwrap_err(), PathError::UnresolvableGoal);
}

#[test]
fn air_paths_are_deterministic_and_compress_cleanly() {
    let world = open_sky();
    let settings = small_settings();
    let start = CellPos::new(4, 80, 4);
    let goal = CellPos::new(40, 84, 36);

    let a = air::find_path(&world, start, goal, &settings).expect("path");
    let b = air::find_path(&world, start, goal, &settings).expect("path");
    assert_eq!(a, b);

    let compressed = compress_cells(&a, settings.waypoint_stride);
    assert_eq!(compressed.first(), a.first());
    assert_eq!(compressed.last(), a.last());
    assert!(compressed.len() <= a.len());
}
