use voxbot_nav::{ground, MoveKind, NavSettings, PathError, Traversal};
use voxbot_core::{CellPos, GridWorld, Material, VoxelView};

fn flat_world() -> GridWorld {
    GridWorld::flat(CellPos::new(0, 60, 0), 32, 24, 32, 63)
}

#[test]
fn flat_terrain_walk_is_a_straight_cardinal_path() {
    let world = flat_world();
    let settings = NavSettings::default();
    let start = CellPos::new(4, 64, 4);
    let goal = CellPos::new(14, 64, 4);

    let path = ground::find_path(&world, start, goal, Traversal::Land, &settings)
        .expect("path should exist");

    assert_eq!(path.first().map(|w| w.cell), Some(start));
    assert_eq!(path.last().map(|w| w.cell), Some(goal));
    assert_eq!(path.len(), 11);
    assert!(path.waypoints[1..]
        .iter()
        .all(|w| w.move_kind == MoveKind::Walk));

    // Every consecutive pair is one legal step.
    for pair in path.waypoints.windows(2) {
        let a = pair[0].cell;
        let b = pair[1].cell;
        assert!((a.x - b.x).abs() <= 1 && (a.z - b.z).abs() <= 1 && a.y == b.y);
    }
}

#[test]
fn sealed_goal_fails_without_hanging() {
    let mut world = flat_world();
    let goal = CellPos::new(20, 64, 20);
    // Box the goal in with an unbreakable ring up to head height plus a cap.
    for y in 64..=66 {
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                world.set(CellPos::new(goal.x + dx, y, goal.z + dz), Material::BEDROCK);
            }
        }
    }
    world.set(CellPos::new(20, 67, 20), Material::BEDROCK);

    let settings = NavSettings::default();
    let result = ground::find_path(
        &world,
        CellPos::new(4, 64, 4),
        goal,
        Traversal::Land,
        &settings,
    );
    assert_eq!(result.unwrap_err(), PathError::SearchExhausted);
}

#[test]
fn identical_inputs_give_identical_paths() {
    let mut world = flat_world();
    // Scatter some obstacles so the path is not trivially straight.
    for z in 6..14 {
        world.set(CellPos::new(9, 64, z), Material::STONE);
        world.set(CellPos::new(9, 65, z), Material::STONE);
    }
    let settings = NavSettings::default();
    let start = CellPos::new(4, 64, 10);
    let goal = CellPos::new(16, 64, 10);

    let a = ground::find_path(&world, start, goal, Traversal::Land, &settings)
        .expect("path should exist");
    let b = ground::find_path(&world, start, goal, Traversal::Land, &settings)
        .expect("path should exist");
    assert_eq!(a, b);
}

#[test]
fn two_cell_pit_is_crossed_by_parkour_not_pillar() {
    let mut world = GridWorld::new(CellPos::new(0, 40, 0), 32, 40, 32);
    // Two platforms with a 2-cell-wide bottomless gap between them.
    world.fill(CellPos::new(0, 63, 0), CellPos::new(7, 63, 31), Material::STONE);
    world.fill(CellPos::new(10, 63, 0), CellPos::new(31, 63, 31), Material::STONE);

    let settings = NavSettings {
        allow_parkour: true,
        max_parkour_length: 3,
        allow_pillar: true,
        ..NavSettings::default()
    };
    let path = ground::find_path(
        &world,
        CellPos::new(4, 64, 8),
        CellPos::new(14, 64, 8),
        Traversal::Land,
        &settings,
    )
    .expect("path should exist");

    assert!(path.waypoints.iter().any(|w| w.move_kind == MoveKind::Parkour));
    assert!(!path.waypoints.iter().any(|w| w.move_kind == MoveKind::Pillar));
}

#[test]
fn lava_cells_are_excluded_outright() {
    let mut world = flat_world();
    // Lava pool crossing the straight line between start and goal.
    for z in 6..=10 {
        world.set(CellPos::new(9, 64, z), Material::Lava);
    }
    let settings = NavSettings::default();
    let path = ground::find_path(
        &world,
        CellPos::new(4, 64, 8),
        CellPos::new(14, 64, 8),
        Traversal::Land,
        &settings,
    )
    .expect("path should detour around the lava");

    for w in &path.waypoints {
        assert_ne!(world.material(w.cell), Material::Lava);
        assert_ne!(world.material(w.cell.below()), Material::Lava);
    }
}

#[test]
fn exceeded_bounds_yield_a_partial_path_toward_the_goal() {
    let world = flat_world();
    let settings = NavSettings {
        max_expanded: 12,
        ..NavSettings::default()
    };
    let start = CellPos::new(2, 64, 16);
    let goal = CellPos::new(29, 64, 16);

    let path = ground::find_path(&world, start, goal, Traversal::Land, &settings)
        .expect("partial path expected");
    assert!(path.len() >= 2);
    let end = path.last().unwrap().cell;
    assert!(end.dist_sq(goal) < start.dist_sq(goal));
    assert_ne!(end, goal);
}

#[test]
fn water_mode_swims_along_the_surface() {
    let mut world = GridWorld::new(CellPos::new(0, 56, 0), 32, 24, 32);
    world.fill(CellPos::new(0, 59, 0), CellPos::new(31, 59, 31), Material::STONE);
    // Pool three cells deep, surface at y=62.
    world.fill(CellPos::new(0, 60, 0), CellPos::new(31, 62, 31), Material::Water);

    let settings = NavSettings::default();
    let path = ground::find_path(
        &world,
        CellPos::new(4, 62, 4),
        CellPos::new(20, 62, 4),
        Traversal::Water,
        &settings,
    )
    .expect("swim path should exist");

    assert!(path.waypoints[1..]
        .iter()
        .all(|w| w.move_kind == MoveKind::Swim));
    // Surface preference: feet stay in the top water layer.
    assert!(path.cells().all(|c| c.y == 62));
}

#[test]
fn break_through_mines_a_thin_wall_when_permitted() {
    let mut world = flat_world();
    // Wall across the whole world at x=9, two cells high.
    for z in 0..32 {
        world.set(CellPos::new(9, 64, z), Material::DIRT);
        world.set(CellPos::new(9, 65, z), Material::DIRT);
        world.set(CellPos::new(9, 66, z), Material::BEDROCK);
    }
    let start = CellPos::new(4, 64, 8);
    let goal = CellPos::new(14, 64, 8);

    let blocked = ground::find_path(&world, start, goal, Traversal::Land, &NavSettings::default());
    assert_eq!(blocked.unwrap_err(), PathError::SearchExhausted);

    let settings = NavSettings {
        allow_break_through: true,
        ..NavSettings::default()
    };
    let path = ground::find_path(&world, start, goal, Traversal::Land, &settings)
        .expect("mining path should exist");
    assert!(path
        .waypoints
        .iter()
        .any(|w| w.move_kind == MoveKind::BreakThrough));
}

#[test]
fn pillar_up_reaches_an_elevated_platform() {
    let mut world = flat_world();
    // Platform at y=67 with sheer sides.
    world.fill(CellPos::new(12, 64, 12), CellPos::new(16, 67, 16), Material::STONE);
    let goal = CellPos::new(14, 68, 14);

    let settings = NavSettings {
        allow_pillar: true,
        allow_parkour: false,
        ..NavSettings::default()
    };
    let path = ground::find_path(
        &world,
        CellPos::new(4, 64, 14),
        goal,
        Traversal::Land,
        &settings,
    )
    .expect("pillar path should exist");
    assert!(path.waypoints.iter().any(|w| w.move_kind == MoveKind::Pillar));
    assert_eq!(path.last().map(|w| w.cell), Some(goal));
}

#[test]
fn descend_mine_digs_down_from_a_tower() {
    let mut world = GridWorld::new(CellPos::new(0, 56, 0), 32, 24, 32);
    world.fill(CellPos::new(0, 60, 0), CellPos::new(31, 60, 31), Material::STONE);
    // Solid tower; its top is 5 above the floor, too far to step off.
    world.fill(CellPos::new(4, 61, 4), CellPos::new(4, 65, 4), Material::DIRT);

    let start = CellPos::new(4, 66, 4);
    let goal = CellPos::new(12, 61, 12);

    let blocked = ground::find_path(
        &world,
        start,
        goal,
        Traversal::Land,
        &NavSettings {
            allow_parkour: false,
            ..NavSettings::default()
        },
    );
    assert_eq!(blocked.unwrap_err(), PathError::SearchExhausted);

    let settings = NavSettings {
        allow_parkour: false,
        allow_descend_mine: true,
        ..NavSettings::default()
    };
    let path = ground::find_path(&world, start, goal, Traversal::Land, &settings)
        .expect("mining descent should exist");
    assert!(path
        .waypoints
        .iter()
        .any(|w| w.move_kind == MoveKind::DescendMine));
}

#[test]
fn hostile_overlay_pushes_the_path_away() {
    let mut world = flat_world();
    let hostile = CellPos::new(9, 64, 8);
    world.add_hostile(hostile);

    let settings = NavSettings {
        avoid_hostiles: true,
        hostile_radius: 2,
        hostile_cost: 10.0,
        ..NavSettings::default()
    };
    let path = ground::find_path(
        &world,
        CellPos::new(4, 64, 8),
        CellPos::new(14, 64, 8),
        Traversal::Land,
        &settings,
    )
    .expect("path should exist");

    for cell in path.cells() {
        let dx = cell.x - hostile.x;
        let dz = cell.z - hostile.z;
        assert!(
            dx * dx + dz * dz > 4 || (cell.y - hostile.y).abs() > 2,
            "waypoint {cell:?} runs through the hostile zone"
        );
    }
}

#[test]
fn unresolvable_endpoints_are_reported() {
    let world = GridWorld::new(CellPos::new(0, 60, 0), 16, 16, 16); // all air
    let settings = NavSettings::default();
    let result = ground::find_path(
        &world,
        CellPos::new(4, 64, 4),
        CellPos::new(10, 64, 10),
        Traversal::Land,
        &settings,
    );
    assert_eq!(result.unwrap_err(), PathError::UnresolvableStart);
}
