//! Verifier and status reporting (§4.8, §3.1).
//!
//! Verification runs after every attempt and checks the invariants of §3;
//! `StatusEvent`s are reported through a caller-supplied [`StatusSink`] at
//! every phase boundary, and mirrored through the `log` facade so a caller
//! that only wires up `env_logger` still sees progress (§9).

use log::{debug, warn};

use crate::room::{Grid, RoomType, WallState};

#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    LayoutComputed { nx: u32, ny: u32, cell_mm: f64 },
    AttemptStarted { attempt: u32 },
    PathsCarved,
    IslandsFilled { count: usize },
    Joined { a: usize, b: usize },
    VerifyOk,
    VerifyFailed { reason: String },
    Aborted { kind: String },
    Completed,
    Warning(String),
}

/// Callback sink the core reports progress through. The core never writes
/// to standard output directly (§9).
pub trait StatusSink {
    fn on_event(&mut self, event: StatusEvent);
}

/// A `StatusSink` that only logs through the `log` facade and drops events
/// otherwise; used when the caller does not supply one.
#[derive(Debug, Default)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn on_event(&mut self, _event: StatusEvent) {}
}

/// Logs every event at the level appropriate to its severity, then forwards
/// it to an inner sink. Compose this around a caller's sink (or `NullSink`)
/// to get the ambient logging described in §9 without duplicating calls at
/// every emission site.
pub struct LoggingSink<S> {
    inner: S,
}

impl<S: StatusSink> LoggingSink<S> {
    pub fn new(inner: S) -> Self {
        LoggingSink { inner }
    }
}

impl<S: StatusSink> StatusSink for LoggingSink<S> {
    fn on_event(&mut self, event: StatusEvent) {
        match &event {
            StatusEvent::VerifyFailed { reason } => warn!("verify failed: {reason}"),
            StatusEvent::Aborted { kind } => warn!("attempt aborted: {kind}"),
            StatusEvent::Warning(message) => warn!("{message}"),
            other => debug!("{other:?}"),
        }
        self.inner.on_event(event);
    }
}

#[derive(Debug, Clone)]
pub enum VerifyFailure {
    EndpointsNotConnected,
    CarvedWallAlsoClosed { x: i32, y: i32 },
    BlankRoomCarved { x: i32, y: i32 },
    NormalRoomUnvisited { count: usize },
}

impl std::fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyFailure::EndpointsNotConnected => {
                write!(f, "non-dead-end endpoints are not all in one component")
            }
            VerifyFailure::CarvedWallAlsoClosed { x, y } => {
                write!(f, "wall at ({x},{y}) was closed by a modifier but is now carved")
            }
            VerifyFailure::BlankRoomCarved { x, y } => {
                write!(f, "blank room at ({x},{y}) has a carved wall")
            }
            VerifyFailure::NormalRoomUnvisited { count } => {
                write!(f, "{count} normal room(s) remain unvisited")
            }
        }
    }
}

/// Runs every invariant check of §4.8 / §8 over the grid after an attempt.
/// `allow_islands` relaxes the coverage check, matching the property that an
/// island with literally no open neighbor is otherwise impossible by
/// construction. `committed_closed_walls` is the set of walls a modifier
/// closed before endpoint placement and path carving ran (see
/// [`crate::room::Grid::closed_wall_segments`]) — `Grid::force_open` used by
/// the endpoint placer overwrites any prior state, so this is the only way
/// to catch an endpoint clobbering a modifier's closing.
pub fn verify(
    grid: &Grid,
    endpoints: &[crate::endpoints::Endpoint],
    allow_islands: bool,
    committed_closed_walls: &[(i32, i32, crate::geometry::Direction)],
) -> Result<(), VerifyFailure> {
    use crate::geometry::Direction;

    // Walls a modifier closed must still be closed: a carved wall here means
    // something later (endpoint placement's `force_open`) overwrote it.
    for &(x, y, dir) in committed_closed_walls {
        if grid.wall_state(x, y, dir) == WallState::Carved {
            return Err(VerifyFailure::CarvedWallAlsoClosed { x, y });
        }
    }

    // Blank isolation.
    for y in 0..grid.ny() as i32 {
        for x in 0..grid.nx() as i32 {
            let room = grid.room(grid.cell_room_id(x, y));
            if room.room_type != RoomType::Blank {
                continue;
            }
            for dir in Direction::ALL {
                if grid.wall_state(x, y, dir) == WallState::Carved {
                    return Err(VerifyFailure::BlankRoomCarved { x, y });
                }
            }
        }
    }

    // Coverage: every Normal/EndpointAnchor room visited, unless islands
    // are allowed (§8 property 1).
    let unvisited: usize = grid
        .live_room_ids()
        .into_iter()
        .filter(|&id| {
            let room = grid.room(id);
            room.room_type != RoomType::Blank && !room.visited
        })
        .count();
    if unvisited > 0 && !allow_islands {
        return Err(VerifyFailure::NormalRoomUnvisited { count: unvisited });
    }

    // Endpoint connectivity (§8 property 2): flood-fill over carved walls
    // from the first non-dead-end endpoint and check every other one is
    // reached.
    let joinable: Vec<_> = endpoints.iter().filter(|e| !e.dead_end).collect();
    if joinable.len() > 1 {
        let start = joinable[0].room_ref;
        let reached = flood_fill_carved(grid, start);
        if !joinable.iter().all(|e| reached.contains(&e.room_ref)) {
            return Err(VerifyFailure::EndpointsNotConnected);
        }
    }

    Ok(())
}

fn flood_fill_carved(grid: &Grid, start: crate::room::RoomId) -> std::collections::HashSet<crate::room::RoomId> {
    let mut seen = std::collections::HashSet::new();
    let mut stack = vec![start];
    seen.insert(start);
    while let Some(current) = stack.pop() {
        for (neighbor, segs) in grid.neighbors(current) {
            if seen.contains(&neighbor) {
                continue;
            }
            if segs
                .iter()
                .any(|&(x, y, d)| grid.wall_state(x, y, d) == WallState::Carved)
            {
                seen.insert(neighbor);
                stack.push(neighbor);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{place_endpoints, EndpointSpec};
    use crate::geometry::{Direction, Placement};
    use rand::SeedableRng;

    #[test]
    fn detects_blank_with_carved_wall() {
        let mut grid = Grid::new(4, 4);
        let id = grid.cell_room_id(1, 1);
        grid.room_mut(id).room_type = RoomType::Blank;
        grid.open(1, 1, Direction::E);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let endpoints = place_endpoints(&mut grid, &[EndpointSpec::new(Placement::W)], &mut rng).unwrap();
        let result = verify(&grid, &endpoints, true, &[]);
        assert!(matches!(result, Err(VerifyFailure::BlankRoomCarved { .. })));
    }

    #[test]
    fn passes_on_trivially_connected_single_endpoint() {
        let mut grid = Grid::new(3, 3);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let endpoints = place_endpoints(&mut grid, &[EndpointSpec::new(Placement::W)], &mut rng).unwrap();
        assert!(verify(&grid, &endpoints, true, &[]).is_ok());
    }

    #[test]
    fn detects_a_modifier_closed_wall_clobbered_by_force_open() {
        let mut grid = Grid::new(5, 5);
        // An interior wall a modifier closed, unrelated to any endpoint.
        grid.close(2, 2, Direction::W);
        let committed = grid.closed_wall_segments();
        assert!(committed.contains(&(2, 2, Direction::W)));
        // Simulate `force_open` clobbering it the way an endpoint would.
        grid.force_open(2, 2, Direction::W);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let endpoints = place_endpoints(&mut grid, &[EndpointSpec::new(Placement::E)], &mut rng).unwrap();
        let result = verify(&grid, &endpoints, true, &committed);
        assert!(matches!(result, Err(VerifyFailure::CarvedWallAlsoClosed { .. })));
    }
}
