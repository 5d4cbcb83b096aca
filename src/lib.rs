//! # Erbsland Maze
//!
//! A rectangular maze layout and path-generation core: resolves a canvas
//! size and room side length into a grid of rooms, applies blank/closing/
//! merge modifiers, places endpoints, and carves a randomized path that
//! connects them.
//!
//! ## Quick start
//!
//! ```rust
//! use erbsland_maze::config::Configuration;
//! use erbsland_maze::generator::Generator;
//!
//! let mut config = Configuration::new(120.0, 80.0);
//! config.seed = Some(42);
//! let mut generator = Generator::new(config);
//! let model = generator.run().expect("maze generation");
//! println!("generated a {}x{} maze", model.nx, model.ny);
//! ```
//!
//! ## Scope
//!
//! The core never draws anything: SVG/PNG rendering, interactive editing,
//! and persistence of arbitrary custom room metadata all live outside this
//! crate (out of scope per design). What it does own: layout, modifiers,
//! endpoints, the randomized path carve, and verification — plus the
//! logging/error/config ambient stack around them.

#[cfg(feature = "cli")]
pub mod cli;

pub mod config;
pub mod endpoints;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod modifiers;
pub mod path;
pub mod placement;
pub mod room;
pub mod verify;

pub use config::Configuration;
pub use error::{ConfigError, GenerationError, MazeError, ModifierError, Result};
pub use generator::Generator;
pub use model::MazeModel;
