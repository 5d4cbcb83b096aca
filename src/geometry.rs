//! Geometry primitives shared by the rest of the core.
//!
//! Stages the downstream modules build on:
//! 1) `Direction`/`Corner`/`Placement` name the symbolic anchors a modifier or
//!    endpoint can be declared at.
//! 2) `RoomSize`/`RoomOffset`/`RoomInsets` parse the small grammars of the
//!    configuration language (`NxN`, `dx,dy`, CSS-shorthand insets).
//! 3) `Rect` is the absolute, grid-clipped rectangle the placement resolver
//!    produces and every later stage consumes.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MazeError};

/// One of the four cardinal directions a wall can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    E,
    S,
    W,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

    /// Returns the opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::E => Direction::W,
            Direction::S => Direction::N,
            Direction::W => Direction::E,
        }
    }

    /// Unit step `(dx, dy)` taken when moving one cell in this direction.
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::E => (1, 0),
            Direction::S => (0, 1),
            Direction::W => (-1, 0),
        }
    }
}

/// A corner of the grid or of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NW,
    NE,
    SE,
    SW,
}

/// One of the nine symbolic anchors, or a uniformly random placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    W,
    NW,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    C,
    Random,
}

impl Placement {
    /// Placement class used to order application within a modifier phase:
    /// center first, then corners, then edges, then random last (§4.5).
    pub fn class(self) -> u8 {
        match self {
            Placement::C => 0,
            Placement::NW | Placement::NE | Placement::SE | Placement::SW => 1,
            Placement::W | Placement::N | Placement::E | Placement::S => 2,
            Placement::Random => 3,
        }
    }

    pub fn parse(s: &str) -> Result<Placement, MazeError> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "w" => Placement::W,
            "nw" => Placement::NW,
            "n" => Placement::N,
            "ne" => Placement::NE,
            "e" => Placement::E,
            "se" => Placement::SE,
            "s" => Placement::S,
            "sw" => Placement::SW,
            "c" => Placement::C,
            "r" | "random" => Placement::Random,
            other => {
                return Err(ConfigError::BadPlacement(other.to_string()).into());
            }
        })
    }
}

/// Integer location of a cell's top-left corner on the room grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomLocation {
    pub x: i32,
    pub y: i32,
}

impl RoomLocation {
    pub fn new(x: i32, y: i32) -> Self {
        RoomLocation { x, y }
    }
}

/// Width/height of a room in cells. Both components are always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomSize {
    pub w: u32,
    pub h: u32,
}

impl RoomSize {
    pub const SINGLE: RoomSize = RoomSize { w: 1, h: 1 };
    pub const SMALL: RoomSize = RoomSize { w: 2, h: 2 };
    pub const MEDIUM: RoomSize = RoomSize { w: 3, h: 3 };
    pub const LARGE: RoomSize = RoomSize { w: 4, h: 4 };

    pub fn new(w: u32, h: u32) -> Self {
        RoomSize { w, h }
    }

    pub fn is_merged(self) -> bool {
        self.w > 1 || self.h > 1
    }

    /// Parses `NAME | N | NxN` (§4.1).
    pub fn parse(s: &str) -> Result<RoomSize, MazeError> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "single" => return Ok(RoomSize::SINGLE),
            "small" => return Ok(RoomSize::SMALL),
            "medium" => return Ok(RoomSize::MEDIUM),
            "large" => return Ok(RoomSize::LARGE),
            _ => {}
        }
        if let Some((w, h)) = s.split_once(['x', 'X']) {
            let w: u32 = w
                .trim()
                .parse()
                .map_err(|_| ConfigError::BadSize(s.to_string()))?;
            let h: u32 = h
                .trim()
                .parse()
                .map_err(|_| ConfigError::BadSize(s.to_string()))?;
            if w == 0 || h == 0 {
                return Err(ConfigError::BadSize(s.to_string()).into());
            }
            return Ok(RoomSize::new(w, h));
        }
        let n: u32 = s
            .parse()
            .map_err(|_| ConfigError::BadSize(s.to_string()))?;
        if n == 0 {
            return Err(ConfigError::BadSize(s.to_string()).into());
        }
        Ok(RoomSize::new(n, n))
    }
}

/// A signed cell offset, either symbolic (diagonal-to-center) or explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomOffset {
    /// Diagonal toward the grid center; positive magnitude moves inward.
    Diagonal(i32),
    /// Independent (dx, dy); positive x east, positive y south.
    Explicit(i32, i32),
}

impl RoomOffset {
    pub const ZERO: RoomOffset = RoomOffset::Diagonal(0);

    /// Parses `N` (diagonal) or `N,N` (explicit) (§4.1).
    pub fn parse(s: &str) -> Result<RoomOffset, MazeError> {
        let s = s.trim();
        if let Some((x, y)) = s.split_once(',') {
            let x: i32 = x
                .trim()
                .parse()
                .map_err(|_| ConfigError::BadOffset(s.to_string()))?;
            let y: i32 = y
                .trim()
                .parse()
                .map_err(|_| ConfigError::BadOffset(s.to_string()))?;
            return Ok(RoomOffset::Explicit(x, y));
        }
        let n: i32 = s
            .parse()
            .map_err(|_| ConfigError::BadOffset(s.to_string()))?;
        Ok(RoomOffset::Diagonal(n))
    }
}

impl Default for RoomOffset {
    fn default() -> Self {
        RoomOffset::ZERO
    }
}

/// Four non-negative inset distances, CSS-shorthand style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomInsets {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl RoomInsets {
    pub fn uniform(n: u32) -> Self {
        RoomInsets {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    /// Parses 1-4 comma-separated non-negative integers, expanded by the
    /// usual CSS-shorthand rules: 1 value -> all sides; 2 -> (v/h, v/h); 3 ->
    /// (top, h, bottom); 4 -> (top, right, bottom, left) (§4.1).
    pub fn parse(s: &str) -> Result<RoomInsets, MazeError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let values: Result<Vec<u32>, _> = parts.iter().map(|p| p.parse::<u32>()).collect();
        let values = values.map_err(|_| ConfigError::BadInsets(s.to_string()))?;
        Ok(match values.len() {
            1 => RoomInsets::uniform(values[0]),
            2 => RoomInsets {
                top: values[0],
                bottom: values[0],
                right: values[1],
                left: values[1],
            },
            3 => RoomInsets {
                top: values[0],
                right: values[1],
                left: values[1],
                bottom: values[2],
            },
            4 => RoomInsets {
                top: values[0],
                right: values[1],
                bottom: values[2],
                left: values[3],
            },
            _ => return Err(ConfigError::BadInsets(s.to_string()).into()),
        })
    }
}

/// An absolute, axis-aligned rectangle of cells on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    /// Whether `self` lies entirely inside a `nx` x `ny` grid.
    pub fn fits_within(&self, nx: u32, ny: u32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= nx as i32 && self.bottom() <= ny as i32
    }

    /// Clips `self` to the `nx` x `ny` grid, returning `None` if the
    /// intersection is empty.
    pub fn clip(&self, nx: u32, ny: u32) -> Option<Rect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(nx as i32);
        let y1 = self.bottom().min(ny as i32);
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| (x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_sizes() {
        assert_eq!(RoomSize::parse("single").unwrap(), RoomSize::SINGLE);
        assert_eq!(RoomSize::parse("medium").unwrap(), RoomSize::MEDIUM);
    }

    #[test]
    fn parses_numeric_sizes() {
        assert_eq!(RoomSize::parse("7").unwrap(), RoomSize::new(7, 7));
        assert_eq!(RoomSize::parse("5x15").unwrap(), RoomSize::new(5, 15));
    }

    #[test]
    fn rejects_unknown_size_name() {
        assert!(RoomSize::parse("huge").is_err());
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(RoomOffset::parse("3").unwrap(), RoomOffset::Diagonal(3));
        assert_eq!(
            RoomOffset::parse("3,-2").unwrap(),
            RoomOffset::Explicit(3, -2)
        );
    }

    #[test]
    fn expands_insets_css_shorthand() {
        assert_eq!(RoomInsets::parse("1").unwrap(), RoomInsets::uniform(1));
        assert_eq!(
            RoomInsets::parse("1,2").unwrap(),
            RoomInsets {
                top: 1,
                bottom: 1,
                right: 2,
                left: 2
            }
        );
        assert_eq!(
            RoomInsets::parse("1,2,3,4").unwrap(),
            RoomInsets {
                top: 1,
                right: 2,
                bottom: 3,
                left: 4
            }
        );
    }

    #[test]
    fn clips_rect_to_grid() {
        let r = Rect::new(-2, -2, 5, 5);
        let clipped = r.clip(4, 4).unwrap();
        assert_eq!(clipped, Rect::new(0, 0, 3, 3));
    }
}
