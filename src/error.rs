//! Error types for the layout and path-generation core (§7).
//!
//! Grouped the way the failures actually occur in the pipeline: parsing a
//! `Configuration` can fail with a [`ConfigError`], applying a modifier can
//! fail with a [`ModifierError`], and running the path generator can fail
//! with a [`GenerationError`]. [`MazeError`] unifies all three behind a
//! single `std::error::Error` so callers that don't care which stage failed
//! can use `?` throughout.

use thiserror::Error;

use crate::geometry::Rect;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("invalid size: {0}")]
    BadSize(String),
    #[error("invalid offset: {0}")]
    BadOffset(String),
    #[error("invalid insets: {0}")]
    BadInsets(String),
    #[error("invalid placement: {0}")]
    BadPlacement(String),
    #[error("invalid closing: {0}")]
    BadClosing(String),
    #[error("invalid fill mode: {0}")]
    BadFillMode(String),
    #[error("invalid parity: {0}")]
    BadParity(String),
    #[error("dimension must be positive: {0}")]
    BadDimension(String),
    #[error("canvas too small: {width}x{height}mm at side length {side_length}mm yields a grid smaller than 3x3")]
    CanvasTooSmall {
        width: f64,
        height: f64,
        side_length: f64,
    },
}

#[derive(Debug, Error, Clone)]
pub enum ModifierError {
    #[error("invalid merge at {rect:?}: {reason}")]
    InvalidMerge { rect: Rect, reason: String },
    #[error("placement {placement:?} of size {size:?} is unplaceable on a {nx}x{ny} grid")]
    Unplaceable {
        placement: crate::geometry::Placement,
        size: crate::geometry::RoomSize,
        nx: u32,
        ny: u32,
    },
    #[error("could not place a random modifier after {attempts} attempts")]
    ConflictAfterRetries { attempts: u32 },
}

#[derive(Debug, Error, Clone)]
pub enum GenerationError {
    #[error("{count} room(s) remain unvisited and islands are not allowed")]
    IslandsForbidden { count: usize },
    #[error("could not join {remaining} separate path component(s)")]
    CannotJoin { remaining: usize },
    #[error("endpoint at {location:?} has no reachable neighbor")]
    EndpointTrapped { location: crate::geometry::RoomLocation },
    #[error("exceeded the maximum of {max_attempts} generation attempts")]
    MaxAttemptsExceeded { max_attempts: u32 },
}

#[derive(Debug, Error)]
pub enum MazeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Modifier(#[from] ModifierError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub type Result<T> = std::result::Result<T, MazeError>;
