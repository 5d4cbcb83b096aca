//! End-to-end scenarios S1-S6 (§8), exercised through the CLI grammar the
//! same way a real invocation would parse it.

use clap::Parser;

use erbsland_maze::cli::Args;
use erbsland_maze::generator::Generator;
use erbsland_maze::room::{RoomType, WallState};

fn configure(argv: &[&str]) -> erbsland_maze::Configuration {
    let mut full = vec!["erbsland-maze"];
    full.extend_from_slice(argv);
    let args = Args::parse_from(full);
    args.into_configuration().expect("valid configuration")
}

#[test]
fn s1_default_endpoints_cover_the_whole_grid() {
    let config = configure(&["-x", "40", "-y", "40", "-l", "5", "-s", "1"]);
    let mut generator = Generator::new(config);
    let model = generator.run().expect("s1 should generate");
    assert_eq!((model.nx, model.ny), (9, 9));
    assert_eq!(model.rooms.len(), 81);
    assert_eq!(model.endpoints.len(), 2);
    assert!(model.rooms.iter().all(|r| r.room_type != RoomType::Blank));
}

#[test]
fn s2_frame_with_center_merge_and_dead_end_stubs() {
    let config = configure(&[
        "-x", "50", "-y", "50", "-f", "1", "-e", "w", "-e", "c", "-e", "n/0/x", "-e", "e/0/x", "-e", "s/0/x",
        "-m", "c/3", "-s", "1",
    ]);
    let mut generator = Generator::new(config);
    let model = generator.run().expect("s2 should generate");
    assert_eq!(model.endpoints.len(), 5);
    let dead_ends = model.endpoints.iter().filter(|e| e.dead_end).count();
    assert_eq!(dead_ends, 3);
    assert!(model.rooms.iter().any(|r| r.size.w == 3 && r.size.h == 3));
    assert!(model
        .rooms
        .iter()
        .filter(|r| r.location.x == 0 || r.location.y == 0)
        .any(|r| r.room_type == RoomType::Blank));
}

#[test]
fn s3_even_parity_diagonal_endpoints() {
    let config = configure(&[
        "-x", "30", "-y", "30", "-l", "5", "-e", "nw", "-e", "se", "--width-parity", "even", "--height-parity",
        "even", "-s", "1",
    ]);
    let mut generator = Generator::new(config);
    let model = generator.run().expect("s3 should generate");
    assert_eq!((model.nx, model.ny), (6, 6));
    let locations: Vec<_> = model.endpoints.iter().map(|e| (e.location.x, e.location.y)).collect();
    assert!(locations.contains(&(0, 0)));
    assert!(locations.contains(&(5, 5)));
}

#[test]
fn s4_blanked_center_still_connects_default_endpoints() {
    let config = configure(&["-x", "60", "-y", "60", "-b", "c/7", "-s", "1"]);
    let mut generator = Generator::new(config);
    let model = generator.run().expect("s4 should generate");
    assert_eq!((model.nx, model.ny), (15, 15));
    let blanks = model.rooms.iter().filter(|r| r.room_type == RoomType::Blank).count();
    assert_eq!(blanks, 49);
}

#[test]
fn s5_layout_only_closes_requested_walls_without_carving() {
    let config = configure(&[
        "-x", "60", "-y", "60", "-c", "dv/c/5x15", "-t", "3", "--layout-only", "-s", "1",
    ]);
    let mut generator = Generator::new(config);
    let model = generator.run().expect("s5 should generate");
    assert_eq!((model.nx, model.ny), (15, 15));
    // No path carving happened: nothing is Carved outside of the two
    // default endpoints' own perimeter openings.
    let carved_outside_endpoints = model
        .rooms
        .iter()
        .filter(|r| r.endpoint.is_none())
        .flat_map(|r| r.walls.iter())
        .filter(|w| **w == WallState::Carved)
        .count();
    assert_eq!(carved_outside_endpoints, 0);
    // The requested closing left at least one wall Closed inside the
    // rectangle that would otherwise default to Open.
    let closed_in_column = model
        .rooms
        .iter()
        .filter(|r| r.location.x >= 5 && r.location.x < 10)
        .flat_map(|r| r.walls.iter())
        .filter(|w| **w == WallState::Closed)
        .count();
    assert!(closed_in_column > 0);
}

#[test]
fn s6_is_deterministic_under_a_fixed_seed() {
    let make = || {
        let config = configure(&["-x", "60", "-y", "60", "-b", "r/3", "-b", "r/3", "-s", "42"]);
        let mut generator = Generator::new(config);
        generator.run().expect("s6 should generate within the attempt budget")
    };
    let a = make();
    let b = make();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
