//! Read-only output model handed to an external renderer (§6).
//!
//! Mirrors the teacher's `Level`/`Room` serialize-everything pattern: no
//! behavior lives here, just a snapshot of the grid the renderer can walk
//! without reaching back into the core's mutable state.

use serde::{Deserialize, Serialize};

use crate::endpoints::Endpoint;
use crate::geometry::{Direction, RoomLocation, RoomSize};
use crate::layout::CellGeometry;
use crate::room::{Grid, RoomType, WallState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub location: RoomLocation,
    pub size: RoomSize,
    pub room_type: RoomType,
    /// Wall state on each side, in `Direction::ALL` (N, E, S, W) order.
    pub walls: [WallState; 4],
    pub endpoint: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointView {
    pub index: usize,
    pub location: RoomLocation,
    pub direction: Direction,
    pub dead_end: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeModel {
    pub nx: u32,
    pub ny: u32,
    pub geometry: CellGeometry,
    pub rooms: Vec<RoomView>,
    pub endpoints: Vec<EndpointView>,
    pub warnings: Vec<String>,
}

impl MazeModel {
    pub fn build(grid: &Grid, endpoints: &[Endpoint], geometry: CellGeometry, warnings: Vec<String>) -> MazeModel {
        let rooms = grid
            .live_room_ids()
            .into_iter()
            .map(|id| {
                let room = grid.room(id);
                let rect = room.rect();
                let walls = [
                    wall_on_room_side(grid, rect, Direction::N),
                    wall_on_room_side(grid, rect, Direction::E),
                    wall_on_room_side(grid, rect, Direction::S),
                    wall_on_room_side(grid, rect, Direction::W),
                ];
                RoomView {
                    location: room.location,
                    size: room.size,
                    room_type: room.room_type,
                    walls,
                    endpoint: room.endpoint,
                }
            })
            .collect();

        let endpoint_views = endpoints
            .iter()
            .enumerate()
            .map(|(index, endpoint)| EndpointView {
                index,
                location: grid.room(endpoint.room_ref).location,
                direction: endpoint.direction,
                dead_end: endpoint.dead_end,
            })
            .collect();

        MazeModel {
            nx: grid.nx(),
            ny: grid.ny(),
            geometry,
            rooms,
            endpoints: endpoint_views,
            warnings,
        }
    }
}

/// A merged room has many individual wall segments per side; this reports
/// `Carved` if any segment on that side is carved, else `Closed` if all are
/// closed, else `Open` — the same "any open edge counts" rule the path
/// generator itself uses to treat a merged room as one graph node.
fn wall_on_room_side(grid: &Grid, rect: crate::geometry::Rect, dir: Direction) -> WallState {
    let segments = match dir {
        Direction::N => (rect.x..rect.right()).map(|x| (x, rect.y)).collect::<Vec<_>>(),
        Direction::S => (rect.x..rect.right()).map(|x| (x, rect.bottom() - 1)).collect(),
        Direction::W => (rect.y..rect.bottom()).map(|y| (rect.x, y)).collect(),
        Direction::E => (rect.y..rect.bottom()).map(|y| (rect.right() - 1, y)).collect(),
    };
    let mut any_carved = false;
    let mut any_open = false;
    for (x, y) in segments {
        match grid.wall_state(x, y, dir) {
            WallState::Carved => any_carved = true,
            WallState::Open => any_open = true,
            WallState::Closed => {}
        }
    }
    if any_carved {
        WallState::Carved
    } else if any_open {
        WallState::Open
    } else {
        WallState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{place_endpoints, EndpointSpec};
    use crate::geometry::Placement;
    use crate::layout::{build_grid, compute_geometry, FillMode};
    use rand::SeedableRng;

    #[test]
    fn builds_a_model_with_every_room_accounted_for() {
        let mut grid = build_grid(5, 5);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let specs = vec![EndpointSpec::new(Placement::W), EndpointSpec::new(Placement::E)];
        let endpoints = place_endpoints(&mut grid, &specs, &mut rng).unwrap();
        let geometry = compute_geometry(5, 5, 20.0, 20.0, 4.0, FillMode::StretchEdge);
        let model = MazeModel::build(&grid, &endpoints, geometry, Vec::new());
        assert_eq!(model.nx, 5);
        assert_eq!(model.rooms.len(), 25);
        assert_eq!(model.endpoints.len(), 2);
    }
}
