//! Randomized depth-first path carving, island fill, and component joining
//! (§4.7). One call to [`run_attempt`] is one attempt; the generator retries
//! a bounded number of times on failure (§4.8, §5).

use std::collections::HashMap;

use rand::Rng;

use crate::endpoints::Endpoint;
use crate::error::GenerationError;
use crate::geometry::Direction;
use crate::room::{Grid, RoomId, RoomType, WallState};
use crate::verify::{StatusEvent, StatusSink};

/// Upper bound on steps a dead-end stub carve takes before giving up and
/// leaving the stub unconnected; dead ends are allowed to remain unjoined
/// (§4.7 step 2), but an unbounded wander through a large unvisited region
/// would make a single dead end dominate an attempt's runtime.
const DEAD_END_CARVE_BUDGET: usize = 256;

fn direction_rank(dir: Direction) -> u8 {
    match dir {
        Direction::N => 0,
        Direction::E => 1,
        Direction::S => 2,
        Direction::W => 3,
    }
}

fn open_neighbor_candidates(
    grid: &Grid,
    room_id: RoomId,
    want_visited: bool,
) -> Vec<(RoomId, (i32, i32, Direction))> {
    let mut out = Vec::new();
    for (neighbor_id, segs) in grid.neighbors(room_id) {
        if grid.room(neighbor_id).visited != want_visited {
            continue;
        }
        if let Some(&seg) = segs.iter().find(|&&(x, y, d)| grid.wall_state(x, y, d) == WallState::Open) {
            out.push((neighbor_id, seg));
        }
    }
    out
}

/// Randomized DFS carve rooted at `root`, visiting only currently-unvisited
/// rooms. Stops either when the stack empties or as soon as
/// `stop_after_visiting` reports true for a freshly-visited room (used to
/// end a tree carve the moment it reaches another declared endpoint, §4.7
/// step 1).
fn carve_tree(
    grid: &mut Grid,
    root: RoomId,
    path_id: u32,
    path_of: &mut HashMap<RoomId, u32>,
    rng: &mut impl Rng,
    stop_after_visiting: impl Fn(RoomId) -> bool,
) {
    grid.room_mut(root).visited = true;
    path_of.insert(root, path_id);
    if stop_after_visiting(root) {
        return;
    }
    let mut stack = vec![root];
    while let Some(&current) = stack.last() {
        let candidates = open_neighbor_candidates(grid, current, false);
        if candidates.is_empty() {
            stack.pop();
            continue;
        }
        let idx = rng.random_range(0..candidates.len());
        let (next, (x, y, dir)) = candidates[idx];
        grid.open(x, y, dir);
        grid.room_mut(next).visited = true;
        path_of.insert(next, path_id);
        stack.push(next);
        if stop_after_visiting(next) {
            return;
        }
    }
}

/// DFS carve for a dead-end endpoint: moves through unvisited rooms, but at
/// every step first checks whether an already-visited neighbor is directly
/// reachable and, if so, carves into it and stops. Returns `true` if it
/// connected, `false` if it exhausted its budget or ran out of moves first
/// (leaving a stub, which is allowed for dead ends, §4.7 step 2).
fn carve_dead_end(
    grid: &mut Grid,
    root: RoomId,
    path_id: u32,
    path_of: &mut HashMap<RoomId, u32>,
    rng: &mut impl Rng,
) -> bool {
    grid.room_mut(root).visited = true;
    path_of.insert(root, path_id);
    let mut stack = vec![root];
    let mut steps = 0usize;
    loop {
        let &current = match stack.last() {
            Some(c) => c,
            None => return false,
        };
        if let Some(&(_, (x, y, dir))) = open_neighbor_candidates(grid, current, true).first() {
            grid.open(x, y, dir);
            return true;
        }
        if steps >= DEAD_END_CARVE_BUDGET {
            return false;
        }
        let candidates = open_neighbor_candidates(grid, current, false);
        if candidates.is_empty() {
            stack.pop();
            continue;
        }
        let idx = rng.random_range(0..candidates.len());
        let (next, (x, y, dir)) = candidates[idx];
        grid.open(x, y, dir);
        grid.room_mut(next).visited = true;
        path_of.insert(next, path_id);
        stack.push(next);
        steps += 1;
    }
}

struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new(n: u32) -> Self {
        DisjointSet {
            parent: (0..n).collect(),
        }
    }

    fn grow_to(&mut self, n: u32) {
        while (self.parent.len() as u32) < n {
            let next = self.parent.len() as u32;
            self.parent.push(next);
        }
    }

    fn find(&mut self, x: u32) -> u32 {
        if self.parent[x as usize] != x {
            let root = self.find(self.parent[x as usize]);
            self.parent[x as usize] = root;
        }
        self.parent[x as usize]
    }

    fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra as usize] = rb;
        }
    }
}

/// Joins every non-dead-end endpoint into a single path component by
/// repeatedly carving the nearest open wall that straddles two distinct
/// components, preferring the smallest room-to-room distance and then the
/// lexicographically earliest `(x, y, dir)` segment (§4.7 step 4).
fn join_components(
    grid: &mut Grid,
    endpoints: &[Endpoint],
    path_of: &HashMap<RoomId, u32>,
    dsu: &mut DisjointSet,
    sink: &mut dyn StatusSink,
) -> Result<(), GenerationError> {
    let joinable: Vec<RoomId> = endpoints
        .iter()
        .filter(|e| !e.dead_end)
        .map(|e| e.room_ref)
        .collect();
    if joinable.len() < 2 {
        return Ok(());
    }

    loop {
        let roots: std::collections::HashSet<u32> = joinable
            .iter()
            .map(|&room| dsu.find(*path_of.get(&room).expect("endpoint must be visited by now")))
            .collect();
        if roots.len() <= 1 {
            return Ok(());
        }

        let mut best: Option<(i32, i32, i32, Direction, RoomId, RoomId)> = None;
        for &room_id in &joinable_search_space(grid, path_of) {
            let Some(&pid_a) = path_of.get(&room_id) else { continue };
            for (neighbor_id, segs) in grid.neighbors(room_id) {
                let Some(&pid_b) = path_of.get(&neighbor_id) else { continue };
                if dsu.find(pid_a) == dsu.find(pid_b) {
                    continue;
                }
                let Some(&(x, y, dir)) = segs.iter().find(|&&(x, y, d)| grid.wall_state(x, y, d) == WallState::Open) else { continue };
                let distance = grid.room_distance(room_id, neighbor_id);
                let candidate = (distance, x, y, dir, room_id, neighbor_id);
                let better = match &best {
                    None => true,
                    Some((bd, bx, by, bdir, _, _)) => {
                        (distance, x, y, direction_rank(dir))
                            < (*bd, *bx, *by, direction_rank(*bdir))
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }

        match best {
            Some((_, x, y, dir, room_a, room_b)) => {
                grid.open(x, y, dir);
                let pid_a = *path_of.get(&room_a).unwrap();
                let pid_b = *path_of.get(&room_b).unwrap();
                dsu.union(pid_a, pid_b);
                sink.on_event(StatusEvent::Joined { a: room_a, b: room_b });
            }
            None => {
                return Err(GenerationError::CannotJoin {
                    remaining: roots.len(),
                });
            }
        }
    }
}

/// Rooms that have been assigned a path id, which is every candidate worth
/// scanning for a joinable boundary wall.
fn joinable_search_space(grid: &Grid, path_of: &HashMap<RoomId, u32>) -> Vec<RoomId> {
    grid.live_room_ids()
        .into_iter()
        .filter(|id| path_of.contains_key(id))
        .collect()
}

/// Result of a single successful attempt, reported for logging purposes.
#[derive(Debug, Clone, Default)]
pub struct AttemptStats {
    pub islands_filled: usize,
}

/// Runs one full carve attempt: resets visited state, carves a tree from
/// each non-dead-end endpoint, stubs in dead ends, fills (or forbids)
/// islands, then joins every non-dead-end endpoint into one component
/// (§4.7).
pub fn run_attempt(
    grid: &mut Grid,
    endpoints: &[Endpoint],
    allow_islands: bool,
    rng: &mut impl Rng,
    sink: &mut dyn StatusSink,
) -> Result<AttemptStats, GenerationError> {
    for id in grid.live_room_ids() {
        grid.room_mut(id).visited = false;
    }

    let mut path_of: HashMap<RoomId, u32> = HashMap::new();
    let mut dsu = DisjointSet::new(0);
    let mut next_path_id: u32 = 0;

    let non_dead_end_rooms: std::collections::HashSet<RoomId> = endpoints
        .iter()
        .filter(|e| !e.dead_end)
        .map(|e| e.room_ref)
        .collect();

    // Step 1: one tree per non-dead-end endpoint, in declaration order.
    for endpoint in endpoints.iter().filter(|e| !e.dead_end) {
        if grid.room(endpoint.room_ref).visited {
            continue;
        }
        let path_id = next_path_id;
        next_path_id += 1;
        dsu.grow_to(next_path_id);
        let root = endpoint.room_ref;
        carve_tree(grid, root, path_id, &mut path_of, rng, |visited_id| {
            visited_id != root && non_dead_end_rooms.contains(&visited_id)
        });
    }

    // Step 2: dead-end stubs.
    for endpoint in endpoints.iter().filter(|e| e.dead_end) {
        if grid.room(endpoint.room_ref).visited {
            continue;
        }
        let path_id = next_path_id;
        next_path_id += 1;
        dsu.grow_to(next_path_id);
        carve_dead_end(grid, endpoint.room_ref, path_id, &mut path_of, rng);
    }

    // Step 3: islands.
    let unvisited: Vec<RoomId> = grid
        .live_room_ids()
        .into_iter()
        .filter(|&id| {
            let room = grid.room(id);
            room.room_type != RoomType::Blank && !room.visited
        })
        .collect();
    if !allow_islands && !unvisited.is_empty() {
        sink.on_event(StatusEvent::Aborted {
            kind: "islands_forbidden".to_string(),
        });
        return Err(GenerationError::IslandsForbidden {
            count: unvisited.len(),
        });
    }
    let mut islands_filled = 0usize;
    if allow_islands {
        for room_id in unvisited {
            if grid.room(room_id).visited {
                continue;
            }
            let path_id = next_path_id;
            next_path_id += 1;
            dsu.grow_to(next_path_id);
            carve_tree(grid, room_id, path_id, &mut path_of, rng, |_| false);
            islands_filled += 1;
        }
        sink.on_event(StatusEvent::IslandsFilled { count: islands_filled });
    }

    sink.on_event(StatusEvent::PathsCarved);

    // Step 4: join every non-dead-end endpoint into one component.
    join_components(grid, endpoints, &path_of, &mut dsu, sink)?;

    Ok(AttemptStats { islands_filled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{place_endpoints, EndpointSpec};
    use crate::geometry::Placement;
    use crate::verify::NullSink;
    use rand::SeedableRng;

    #[test]
    fn carves_a_path_between_two_endpoints() {
        let mut grid = Grid::new(5, 5);
        let specs = vec![EndpointSpec::new(Placement::W), EndpointSpec::new(Placement::E)];
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let endpoints = place_endpoints(&mut grid, &specs, &mut rng).unwrap();
        let mut sink = NullSink;
        let stats = run_attempt(&mut grid, &endpoints, true, &mut rng, &mut sink).unwrap();
        assert_eq!(stats.islands_filled, 0);
        assert!(crate::verify::verify(&grid, &endpoints, true, &[]).is_ok());
    }

    #[test]
    fn dead_end_endpoint_stays_unjoined_but_carved() {
        let mut grid = Grid::new(5, 5);
        let mut w = EndpointSpec::new(Placement::W);
        let mut s = EndpointSpec::new(Placement::S);
        w.dead_end = false;
        s.dead_end = true;
        let specs = vec![w, s];
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let endpoints = place_endpoints(&mut grid, &specs, &mut rng).unwrap();
        let mut sink = NullSink;
        run_attempt(&mut grid, &endpoints, true, &mut rng, &mut sink).unwrap();
        assert!(grid.room(endpoints[1].room_ref).visited);
    }

    #[test]
    fn forbidding_islands_fails_when_a_blank_split_leaves_a_gap() {
        let mut grid = Grid::new(3, 3);
        // Close off the center cell entirely so nothing can ever reach it.
        for dir in Direction::ALL {
            grid.close(1, 1, dir);
        }
        let specs = vec![EndpointSpec::new(Placement::W), EndpointSpec::new(Placement::E)];
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let endpoints = place_endpoints(&mut grid, &specs, &mut rng).unwrap();
        let mut sink = NullSink;
        let result = run_attempt(&mut grid, &endpoints, false, &mut rng, &mut sink);
        assert!(matches!(result, Err(GenerationError::IslandsForbidden { .. })));
    }
}
