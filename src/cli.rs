//! Command-line argument grammar (§6, §6.1), gated behind the `cli` feature
//! the same way the teacher gates its own `Args`/`ModeArg`.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::config::{Configuration, SvgOptions};
use crate::endpoints::EndpointSpec;
use crate::error::{ConfigError, MazeError};
use crate::geometry::{Placement, RoomInsets, RoomOffset, RoomSize};
use crate::layout::{FillMode, Parity};
use crate::modifiers::{ClosingSpec, ClosingType, Modifier};

/// `ENDSPEC := placement[/offset[/x]]` (§6). The trailing `/x` segment marks
/// the endpoint as a dead end.
#[derive(Debug, Clone)]
pub struct EndSpecArg(pub EndpointSpec);

impl FromStr for EndSpecArg {
    type Err = MazeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let placement = Placement::parse(parts.next().unwrap_or(""))?;
        let mut spec = EndpointSpec::new(placement);
        if let Some(offset_part) = parts.next() {
            if !offset_part.is_empty() {
                spec.offset = RoomOffset::parse(offset_part)?;
            }
        }
        if let Some(dead_end_part) = parts.next() {
            spec.dead_end = dead_end_part.trim().eq_ignore_ascii_case("x");
        }
        Ok(EndSpecArg(spec))
    }
}

/// `BLANKSPEC := placement[/size[/offset]]` (§6).
#[derive(Debug, Clone)]
pub struct BlankSpecArg(pub Modifier);

impl FromStr for BlankSpecArg {
    type Err = MazeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let placement = Placement::parse(parts.next().unwrap_or(""))?;
        let size = match parts.next() {
            Some(p) if !p.is_empty() => Some(RoomSize::parse(p)?),
            _ => None,
        };
        let offset = match parts.next() {
            Some(p) if !p.is_empty() => RoomOffset::parse(p)?,
            _ => RoomOffset::ZERO,
        };
        Ok(BlankSpecArg(Modifier::Blank(crate::modifiers::BlankSpec {
            placement,
            size,
            offset,
        })))
    }
}

/// `MERGESPEC := placement[/size[/offset]]` (§6).
#[derive(Debug, Clone)]
pub struct MergeSpecArg(pub Modifier);

impl FromStr for MergeSpecArg {
    type Err = MazeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let placement = Placement::parse(parts.next().unwrap_or(""))?;
        let size = match parts.next() {
            Some(p) if !p.is_empty() => Some(RoomSize::parse(p)?),
            _ => None,
        };
        let offset = match parts.next() {
            Some(p) if !p.is_empty() => RoomOffset::parse(p)?,
            _ => RoomOffset::ZERO,
        };
        Ok(MergeSpecArg(Modifier::Merge(crate::modifiers::MergeSpec {
            placement,
            size,
            offset,
        })))
    }
}

/// `CLOSINGSPEC := [^]closing/placement[/size[/offset]]` (§6); a leading
/// `^` inverts the selection.
#[derive(Debug, Clone)]
pub struct ClosingSpecArg(pub Modifier);

impl FromStr for ClosingSpecArg {
    type Err = MazeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (inverted, rest) = match s.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut parts = rest.split('/');
        let closing_type = ClosingType::parse(parts.next().unwrap_or(""))?;
        let placement = Placement::parse(parts.next().unwrap_or(""))?;
        let size = match parts.next() {
            Some(p) if !p.is_empty() => Some(RoomSize::parse(p)?),
            _ => None,
        };
        let offset = match parts.next() {
            Some(p) if !p.is_empty() => RoomOffset::parse(p)?,
            _ => RoomOffset::ZERO,
        };
        Ok(ClosingSpecArg(Modifier::Closing(ClosingSpec {
            closing_type,
            inverted,
            placement,
            size,
            offset,
        })))
    }
}

#[derive(Debug, Clone)]
pub struct ParityArg(pub Parity);

impl FromStr for ParityArg {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ParityArg(Parity::parse(s)?))
    }
}

#[derive(Debug, Clone)]
pub struct FillModeArg(pub FillMode);

impl FromStr for FillModeArg {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FillModeArg(FillMode::parse(s)?))
    }
}

/// Command-line arguments for the maze generator.
#[derive(Debug, Parser, Clone)]
#[command(name = "erbsland-maze", version, about = "Rectangular maze layout and path generator")]
pub struct Args {
    /// Canvas width in millimetres
    #[arg(long = "width", short = 'x', help = "Canvas width in millimetres")]
    pub width: f64,

    /// Canvas height in millimetres
    #[arg(long = "height", short = 'y', help = "Canvas height in millimetres")]
    pub height: f64,

    /// Wall thickness in millimetres
    #[arg(long = "wall-thickness", short = 't', default_value_t = 1.7, help = "Wall thickness in millimetres")]
    pub wall_thickness: f64,

    /// Room side length in millimetres
    #[arg(long = "side-length", short = 'l', default_value_t = 4.0, help = "Room side length in millimetres")]
    pub side_length: f64,

    /// Fill mode controlling how the grid is anchored in the canvas
    #[arg(long = "fill-mode", short = 'i', default_value = "stretch_edge", help = "Fill mode: stretch_edge|stretch|square_top_left|square_center|fixed_top_left|fixed_center")]
    pub fill_mode: FillModeArg,

    /// Parity constraint on the horizontal cell count
    #[arg(long = "width-parity", default_value = "odd", help = "Width cell-count parity: odd|even|none")]
    pub width_parity: ParityArg,

    /// Parity constraint on the vertical cell count
    #[arg(long = "height-parity", default_value = "odd", help = "Height cell-count parity: odd|even|none")]
    pub height_parity: ParityArg,

    /// Declares one endpoint; may be repeated
    #[arg(long = "endpoint", short = 'e', help = "ENDSPEC := placement[/offset[/x]]")]
    pub endpoint: Vec<EndSpecArg>,

    /// CSS-shorthand insets marking an outer frame of Blank rooms
    #[arg(long = "frame", short = 'f', help = "Frame insets: 1-4 comma-separated values")]
    pub frame: Option<String>,

    /// Declares a Blank modifier; may be repeated
    #[arg(long = "blank", short = 'b', help = "BLANKSPEC := placement[/size[/offset]]")]
    pub blank: Vec<BlankSpecArg>,

    /// Declares a Closing modifier; may be repeated
    #[arg(long = "closing", short = 'c', help = "CLOSINGSPEC := [^]closing/placement[/size[/offset]]")]
    pub closing: Vec<ClosingSpecArg>,

    /// Declares a Merge modifier; may be repeated
    #[arg(long = "merge", short = 'm', help = "MERGESPEC := placement[/size[/offset]]")]
    pub merge: Vec<MergeSpecArg>,

    /// RNG seed for reproducible mazes
    #[arg(long = "seed", short = 's', help = "RNG seed for reproducible mazes")]
    pub seed: Option<u64>,

    /// Maximum path-generation retry attempts
    #[arg(long = "maximum-attempts", default_value_t = 20, help = "Maximum path-generation retry attempts")]
    pub maximum_attempts: u32,

    /// Forbid islands of unreachable Normal rooms
    #[arg(long = "no-islands", default_value_t = false, help = "Abort if any room would remain unreachable")]
    pub no_islands: bool,

    /// Stop after layout and endpoints, emitting the grid with all walls open
    #[arg(long = "layout-only", default_value_t = false, help = "Stop after layout; emit the grid with all walls open")]
    pub layout_only: bool,

    /// Skip a failing modifier instead of aborting the run
    #[arg(long = "ignore-errors", default_value_t = false, help = "Skip a failing modifier instead of aborting")]
    pub ignore_errors: bool,

    /// Suppress the ASCII preview on stdout
    #[arg(long = "silent", default_value_t = false, help = "Suppress the ASCII preview on stdout")]
    pub silent: bool,

    /// File path to write the generated room/wall model as JSON
    #[arg(long = "output", short = 'o', help = "Write the room/wall model to a JSON file path")]
    pub output: Option<PathBuf>,

    /// Suppress endpoint/room markers in the ASCII preview
    #[arg(long = "no-marks", default_value_t = false, help = "Suppress endpoint markers in the ASCII preview")]
    pub no_marks: bool,

    /// SVG rendering is out of scope; these flags only round-trip (§6.1).
    #[arg(long = "svg-unit", default_value = "mm")]
    pub svg_unit: String,
    #[arg(long = "svg-dpi", default_value_t = 96.0)]
    pub svg_dpi: f64,
    #[arg(long = "svg-zero-point", default_value = "top_left")]
    pub svg_zero_point: String,
    #[arg(long = "svg-no-background", default_value_t = false)]
    pub svg_no_background: bool,
    #[arg(long = "svg-background-color")]
    pub svg_background_color: Option<String>,
    #[arg(long = "svg-room-color")]
    pub svg_room_color: Option<String>,
    #[arg(long = "svg-endpoint-color")]
    pub svg_endpoint_color: Vec<String>,
}

impl Args {
    /// Converts the parsed arguments into a `Configuration`, the boundary
    /// between the CLI grammar and the core (§6.1).
    pub fn into_configuration(self) -> Result<Configuration, MazeError> {
        let mut config = Configuration::new(self.width, self.height);
        config.wall_thickness = self.wall_thickness;
        config.side_length = self.side_length;
        config.fill_mode = self.fill_mode.0;
        config.width_parity = self.width_parity.0;
        config.height_parity = self.height_parity.0;
        config.endpoints = self.endpoint.into_iter().map(|e| e.0).collect();

        if let Some(frame) = &self.frame {
            config.modifiers.push(Modifier::Frame(RoomInsets::parse(frame)?));
        }
        config.modifiers.extend(self.blank.into_iter().map(|b| b.0));
        config.modifiers.extend(self.closing.into_iter().map(|c| c.0));
        config.modifiers.extend(self.merge.into_iter().map(|m| m.0));

        config.allow_islands = !self.no_islands;
        config.maximum_attempts = self.maximum_attempts;
        config.layout_only = self.layout_only;
        config.ignore_errors = self.ignore_errors;
        config.silent = self.silent;
        config.seed = self.seed;
        config.svg = SvgOptions {
            unit: self.svg_unit,
            dpi: self.svg_dpi,
            zero_point: self.svg_zero_point,
            no_background: self.svg_no_background,
            background_color: self.svg_background_color,
            room_color: self.svg_room_color,
            endpoint_colors: self.svg_endpoint_color,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_endspec_with_dead_end_marker() {
        let parsed: EndSpecArg = "nw/2,-1/x".parse().unwrap();
        assert!(parsed.0.dead_end);
        assert_eq!(parsed.0.placement, Placement::NW);
    }

    #[test]
    fn parses_inverted_closing_spec() {
        let parsed: ClosingSpecArg = "^cp/c/3x3".parse().unwrap();
        match parsed.0 {
            Modifier::Closing(spec) => {
                assert!(spec.inverted);
                assert_eq!(spec.closing_type, ClosingType::CornerPaths);
            }
            _ => panic!("expected a Closing modifier"),
        }
    }
}
