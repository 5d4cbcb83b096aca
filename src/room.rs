//! Room model: the grid of rooms and the wall array it owns (§3, §4.2).
//!
//! Walls are not stored per-room. Instead, per design note §9, the grid owns
//! two flat arrays of wall segments keyed by `(cell, side)` in canonical
//! form (a wall is always addressed as the north wall of the cell below it,
//! or the west wall of the cell to its right). Rooms only carry a
//! `location`/`size`; merging a rectangle of cells into one room never has
//! to rewrite a wall array, because interior connectivity falls out of two
//! cells mapping to the same room id (see [`Grid::neighbors`]).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, Rect, RoomLocation, RoomSize};

pub type RoomId = usize;

/// Canonical `(x, y, dir)` identity of a wall segment: `S`/`E` segments map
/// to the `N`/`W` segment of the neighboring cell they are shared with, the
/// same identity `Grid` uses internally to store one entry per wall.
pub fn canonical_wall(x: i32, y: i32, dir: Direction) -> (i32, i32, Direction) {
    match dir {
        Direction::N | Direction::W => (x, y, dir),
        Direction::S => (x, y + 1, Direction::N),
        Direction::E => (x + 1, y, Direction::W),
    }
}

/// Tri-state wall: open (carvable), closed (permanent), or carved (part of
/// the maze graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallState {
    Open,
    Closed,
    Carved,
}

/// What a room participates as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Normal,
    Blank,
    EndpointAnchor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub location: RoomLocation,
    pub size: RoomSize,
    pub room_type: RoomType,
    #[serde(skip)]
    pub visited: bool,
    pub endpoint: Option<usize>,
}

impl Room {
    pub fn rect(&self) -> Rect {
        Rect::new(self.location.x, self.location.y, self.size.w, self.size.h)
    }

    pub fn is_merged(&self) -> bool {
        self.size.is_merged()
    }
}

/// The full room grid: cell-to-room mapping, rooms, and the shared wall
/// arrays.
#[derive(Debug, Clone)]
pub struct Grid {
    nx: u32,
    ny: u32,
    /// Room id per cell, row-major.
    cells: Vec<RoomId>,
    rooms: Vec<Room>,
    /// `horiz[y][x]` is the wall between cell `(x, y-1)` and `(x, y)`; rows
    /// `0..=ny`, so index `0` is the top boundary and `ny` the bottom one.
    horiz: Vec<WallState>,
    /// `vert[y][x]` is the wall between cell `(x-1, y)` and `(x, y)`; cols
    /// `0..=nx`, so index `0` is the left boundary and `nx` the right one.
    vert: Vec<WallState>,
}

impl Grid {
    /// Builds a fresh `nx` x `ny` grid of 1x1 Normal rooms, interior walls
    /// open, perimeter walls closed (§4.4).
    pub fn new(nx: u32, ny: u32) -> Self {
        let mut rooms = Vec::with_capacity((nx * ny) as usize);
        let mut cells = Vec::with_capacity((nx * ny) as usize);
        for y in 0..ny {
            for x in 0..nx {
                cells.push(rooms.len());
                rooms.push(Room {
                    location: RoomLocation::new(x as i32, y as i32),
                    size: RoomSize::SINGLE,
                    room_type: RoomType::Normal,
                    visited: false,
                    endpoint: None,
                });
            }
        }
        let horiz = vec![WallState::Open; ((ny + 1) * nx) as usize];
        let vert = vec![WallState::Open; (ny * (nx + 1)) as usize];
        let mut grid = Grid {
            nx,
            ny,
            cells,
            rooms,
            horiz,
            vert,
        };
        for x in 0..nx {
            grid.set_raw_wall(x as i32, 0, Direction::N, WallState::Closed);
            grid.set_raw_wall(x as i32, ny as i32 - 1, Direction::S, WallState::Closed);
        }
        for y in 0..ny {
            grid.set_raw_wall(0, y as i32, Direction::W, WallState::Closed);
            grid.set_raw_wall(nx as i32 - 1, y as i32, Direction::E, WallState::Closed);
        }
        grid
    }

    pub fn nx(&self) -> u32 {
        self.nx
    }

    pub fn ny(&self) -> u32 {
        self.ny
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.nx && (y as u32) < self.ny
    }

    pub fn cell_room_id(&self, x: i32, y: i32) -> RoomId {
        self.cells[(y as u32 * self.nx + x as u32) as usize]
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id]
    }

    pub fn room_mut(&mut self, id: RoomId) -> &mut Room {
        &mut self.rooms[id]
    }

    /// All currently-live room ids (merging away 1x1 cells leaves their old
    /// room entries unreferenced; this skips them).
    pub fn live_room_ids(&self) -> Vec<RoomId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for &id in &self.cells {
            if seen.insert(id) {
                ids.push(id);
            }
        }
        ids
    }

    fn wall_index(&self, x: i32, y: i32, dir: Direction) -> (bool, usize) {
        // Returns (is_horizontal, index).
        match dir {
            Direction::N => (true, (y as u32 * self.nx + x as u32) as usize),
            Direction::S => (true, ((y as u32 + 1) * self.nx + x as u32) as usize),
            Direction::W => (false, (y as u32 * (self.nx + 1) + x as u32) as usize),
            Direction::E => (false, (y as u32 * (self.nx + 1) + x as u32 + 1) as usize),
        }
    }

    pub fn wall_state(&self, x: i32, y: i32, dir: Direction) -> WallState {
        let (horizontal, idx) = self.wall_index(x, y, dir);
        if horizontal {
            self.horiz[idx]
        } else {
            self.vert[idx]
        }
    }

    fn set_raw_wall(&mut self, x: i32, y: i32, dir: Direction, state: WallState) {
        let (horizontal, idx) = self.wall_index(x, y, dir);
        if horizontal {
            self.horiz[idx] = state;
        } else {
            self.vert[idx] = state;
        }
    }

    /// Marks the wall closed. Idempotent (§4.2).
    pub fn close(&mut self, x: i32, y: i32, dir: Direction) {
        self.set_raw_wall(x, y, dir, WallState::Closed);
    }

    /// Opens (carves) the wall. Precondition: the wall must currently be
    /// [`WallState::Open`] (§4.2).
    pub fn open(&mut self, x: i32, y: i32, dir: Direction) {
        debug_assert_ne!(self.wall_state(x, y, dir), WallState::Closed);
        self.set_raw_wall(x, y, dir, WallState::Carved);
    }

    /// Forces a wall to carved regardless of its prior state. Used by the
    /// endpoint placer to open an exterior wall that the layout builder
    /// closed by default (§4.6).
    pub fn force_open(&mut self, x: i32, y: i32, dir: Direction) {
        self.set_raw_wall(x, y, dir, WallState::Carved);
    }

    /// Every boundary wall segment of `rect`, in `(x, y, dir)` order,
    /// matching the lexicographic tie-break of §4.7 step 4.
    pub fn boundary_segments(&self, rect: Rect) -> Vec<(i32, i32, Direction)> {
        let mut segs = Vec::new();
        for x in rect.x..rect.right() {
            segs.push((x, rect.y, Direction::N));
            segs.push((x, rect.bottom() - 1, Direction::S));
        }
        for y in rect.y..rect.bottom() {
            segs.push((rect.x, y, Direction::W));
            segs.push((rect.right() - 1, y, Direction::E));
        }
        segs
    }

    /// All interior (not on `rect`'s own border) wall segments of `rect`
    /// running horizontally or vertically, used by `DirectionHorizontal`
    /// and `DirectionVertical` closings (§4.5).
    pub fn interior_vertical_segments(&self, rect: Rect) -> Vec<(i32, i32, Direction)> {
        let mut segs = Vec::new();
        for y in rect.y..rect.bottom() {
            for x in (rect.x + 1)..rect.right() {
                segs.push((x, y, Direction::W));
            }
        }
        segs
    }

    pub fn interior_horizontal_segments(&self, rect: Rect) -> Vec<(i32, i32, Direction)> {
        let mut segs = Vec::new();
        for y in (rect.y + 1)..rect.bottom() {
            for x in rect.x..rect.right() {
                segs.push((x, y, Direction::N));
            }
        }
        segs
    }

    /// Replaces the 1x1 Normal rooms covering `rect` with a single merged
    /// room. Caller (the modifier engine) is responsible for validating the
    /// rectangle first (§4.5); this never fails.
    pub fn merge(&mut self, rect: Rect) -> RoomId {
        let new_id = self.rooms.len();
        self.rooms.push(Room {
            location: RoomLocation::new(rect.x, rect.y),
            size: RoomSize::new(rect.w, rect.h),
            room_type: RoomType::Normal,
            visited: false,
            endpoint: None,
        });
        for (x, y) in rect.cells() {
            let idx = (y as u32 * self.nx + x as u32) as usize;
            self.cells[idx] = new_id;
        }
        new_id
    }

    /// Whether every cell in `rect` currently maps to a distinct, non-merged,
    /// `Normal` room (the precondition for [`Grid::merge`], §4.5).
    pub fn rect_is_plain_normal(&self, rect: Rect) -> bool {
        rect.cells().all(|(x, y)| {
            let room = self.room(self.cell_room_id(x, y));
            room.room_type == RoomType::Normal && !room.is_merged()
        })
    }

    /// All live neighbor rooms of `room_id`, each with the list of boundary
    /// wall segments straddling the two rooms. Skips `Blank` neighbors,
    /// which are always treated as closed (§3 invariant 4).
    pub fn neighbors(&self, room_id: RoomId) -> Vec<(RoomId, Vec<(i32, i32, Direction)>)> {
        let room = self.room(room_id);
        let mut by_neighbor: Vec<(RoomId, Vec<(i32, i32, Direction)>)> = Vec::new();
        for (x, y) in room.rect().cells() {
            for dir in Direction::ALL {
                let (dx, dy) = dir.step();
                let (nx, ny) = (x + dx, y + dy);
                if !self.in_bounds(nx, ny) {
                    continue;
                }
                let neighbor_id = self.cell_room_id(nx, ny);
                if neighbor_id == room_id {
                    continue;
                }
                if self.room(neighbor_id).room_type == RoomType::Blank {
                    continue;
                }
                match by_neighbor.iter_mut().find(|(id, _)| *id == neighbor_id) {
                    Some((_, segs)) => segs.push((x, y, dir)),
                    None => by_neighbor.push((neighbor_id, vec![(x, y, dir)])),
                }
            }
        }
        by_neighbor
    }

    /// Every wall segment currently `Closed`, in canonical `(x, y, dir)` form
    /// (only `N` and `W`, per this grid's own wall-storage convention — see
    /// the module doc comment). Lets a caller snapshot "what a modifier
    /// closed" before a later stage (endpoint placement, path carving) runs,
    /// so it can check afterwards that none of those walls were clobbered.
    pub fn closed_wall_segments(&self) -> Vec<(i32, i32, Direction)> {
        let mut segs = Vec::new();
        for y in 0..self.ny as i32 {
            for x in 0..self.nx as i32 {
                for dir in [Direction::N, Direction::W] {
                    if self.wall_state(x, y, dir) == WallState::Closed {
                        segs.push((x, y, dir));
                    }
                }
            }
        }
        segs
    }

    /// Manhattan distance between the nearest pair of cells belonging to
    /// two rooms, used to rank join candidates (§4.7 step 4).
    pub fn room_distance(&self, a: RoomId, b: RoomId) -> i32 {
        let ra = self.room(a).rect();
        let rb = self.room(b).rect();
        let mut best = i32::MAX;
        for (ax, ay) in ra.cells() {
            for (bx, by) in rb.cells() {
                let d = (ax - bx).abs() + (ay - by).abs();
                if d < best {
                    best = d;
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_has_closed_perimeter_and_open_interior() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.wall_state(0, 0, Direction::W), WallState::Closed);
        assert_eq!(grid.wall_state(0, 0, Direction::N), WallState::Closed);
        assert_eq!(grid.wall_state(3, 2, Direction::E), WallState::Closed);
        assert_eq!(grid.wall_state(3, 2, Direction::S), WallState::Closed);
        assert_eq!(grid.wall_state(0, 0, Direction::E), WallState::Open);
        assert_eq!(grid.wall_state(1, 0, Direction::W), WallState::Open);
    }

    #[test]
    fn open_mirrors_on_both_sides() {
        let mut grid = Grid::new(3, 3);
        grid.open(0, 0, Direction::E);
        assert_eq!(grid.wall_state(0, 0, Direction::E), WallState::Carved);
        assert_eq!(grid.wall_state(1, 0, Direction::W), WallState::Carved);
    }

    #[test]
    fn merge_makes_interior_walls_irrelevant() {
        let mut grid = Grid::new(4, 4);
        let rect = Rect::new(1, 1, 2, 2);
        assert!(grid.rect_is_plain_normal(rect));
        let id = grid.merge(rect);
        for (x, y) in rect.cells() {
            assert_eq!(grid.cell_room_id(x, y), id);
        }
        assert_eq!(grid.live_room_ids().len(), 16 - 4 + 1);
    }

    #[test]
    fn neighbors_skip_blank_rooms() {
        let mut grid = Grid::new(3, 1);
        grid.room_mut(0).room_type = RoomType::Blank;
        let neighbors = grid.neighbors(1);
        assert!(neighbors.iter().all(|(id, _)| *id != 0));
    }
}
