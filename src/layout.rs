//! Layout builder: resolves `(nx, ny)` from the millimetre canvas size plus
//! side length and parity, then instantiates the initial room grid (§4.4).
//! Also computes the per-cell mm geometry consumed (not drawn) by the
//! external renderer (§4.4.1).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::room::Grid;

pub const MIN_GRID_DIM: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    Odd,
    Even,
    None,
}

impl Parity {
    pub fn parse(s: &str) -> Result<Parity, ConfigError> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "odd" => Parity::Odd,
            "even" => Parity::Even,
            "none" => Parity::None,
            other => return Err(ConfigError::BadParity(other.to_string())),
        })
    }

    fn satisfies(self, n: u32) -> bool {
        match self {
            Parity::Odd => n % 2 == 1,
            Parity::Even => n % 2 == 0,
            Parity::None => true,
        }
    }

    /// Adjusts `n` by at most 1 toward the nearer value satisfying this
    /// parity, tie-breaking toward the larger value (§4.4).
    fn adjust(self, n: u32) -> u32 {
        if self.satisfies(n) {
            n
        } else {
            n + 1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillMode {
    StretchEdge,
    Stretch,
    SquareTopLeft,
    SquareCenter,
    FixedTopLeft,
    FixedCenter,
}

impl FillMode {
    pub fn parse(s: &str) -> Result<FillMode, ConfigError> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "stretch_edge" | "se" => FillMode::StretchEdge,
            "stretch" | "s" => FillMode::Stretch,
            "square_top_left" | "qt" => FillMode::SquareTopLeft,
            "square_center" | "q" => FillMode::SquareCenter,
            "fixed_top_left" | "ft" => FillMode::FixedTopLeft,
            "fixed_center" | "f" => FillMode::FixedCenter,
            other => return Err(ConfigError::BadFillMode(other.to_string())),
        })
    }
}

/// Per-row/per-column mm offsets and sizes, derived from `fill_mode`. Pure
/// data handed to the external renderer; the core never draws anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellGeometry {
    pub col_offset_mm: Vec<f64>,
    pub col_width_mm: Vec<f64>,
    pub row_offset_mm: Vec<f64>,
    pub row_height_mm: Vec<f64>,
}

fn axis_geometry(n: u32, total_mm: f64, side_mm: f64, mode: FillMode) -> (Vec<f64>, Vec<f64>) {
    let nf = n as f64;
    let remainder = total_mm - nf * side_mm;
    let sizes: Vec<f64> = match mode {
        FillMode::StretchEdge => {
            let half = remainder / 2.0;
            let mut s = vec![side_mm; n as usize];
            if n == 1 {
                s[0] += remainder;
            } else {
                s[0] += half;
                s[(n - 1) as usize] += half;
            }
            s
        }
        FillMode::Stretch => {
            let extra = remainder / nf;
            vec![side_mm + extra; n as usize]
        }
        FillMode::SquareTopLeft | FillMode::SquareCenter | FillMode::FixedTopLeft | FillMode::FixedCenter => {
            vec![side_mm; n as usize]
        }
    };
    let margin = match mode {
        FillMode::SquareCenter | FillMode::FixedCenter => remainder / 2.0,
        _ => 0.0,
    };
    let mut offsets = Vec::with_capacity(n as usize);
    let mut cursor = margin;
    for &sz in &sizes {
        offsets.push(cursor);
        cursor += sz;
    }
    (offsets, sizes)
}

pub fn compute_geometry(
    nx: u32,
    ny: u32,
    width_mm: f64,
    height_mm: f64,
    side_length_mm: f64,
    fill_mode: FillMode,
) -> CellGeometry {
    let (col_offset_mm, col_width_mm) = axis_geometry(nx, width_mm, side_length_mm, fill_mode);
    let (row_offset_mm, row_height_mm) = axis_geometry(ny, height_mm, side_length_mm, fill_mode);
    CellGeometry {
        col_offset_mm,
        col_width_mm,
        row_offset_mm,
        row_height_mm,
    }
}

/// Resolves `(width_mm, height_mm)` plus side length and parity to a grid
/// cell count, enforcing the 3x3 minimum (§4.4).
pub fn resolve_grid_dims(
    width_mm: f64,
    height_mm: f64,
    side_length_mm: f64,
    width_parity: Parity,
    height_parity: Parity,
) -> Result<(u32, u32), ConfigError> {
    if width_mm <= 0.0 || height_mm <= 0.0 {
        return Err(ConfigError::BadDimension(format!(
            "{width_mm}x{height_mm}"
        )));
    }
    if side_length_mm <= 0.0 {
        return Err(ConfigError::BadDimension(format!("side_length {side_length_mm}")));
    }
    let base_nx = (width_mm / side_length_mm).round().max(0.0) as u32;
    let base_ny = (height_mm / side_length_mm).round().max(0.0) as u32;
    let nx = width_parity.adjust(base_nx);
    let ny = height_parity.adjust(base_ny);
    debug!("resolved grid dims: base=({base_nx},{base_ny}) adjusted=({nx},{ny})");
    if nx < MIN_GRID_DIM || ny < MIN_GRID_DIM {
        return Err(ConfigError::CanvasTooSmall {
            width: width_mm,
            height: height_mm,
            side_length: side_length_mm,
        });
    }
    Ok((nx, ny))
}

/// Builds the initial `nx` x `ny` grid of Normal 1x1 rooms (§4.4).
pub fn build_grid(nx: u32, ny: u32) -> Grid {
    Grid::new(nx, ny)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_odd_parity_grid() {
        let (nx, ny) = resolve_grid_dims(40.0, 40.0, 5.0, Parity::Odd, Parity::Odd).unwrap();
        assert_eq!((nx, ny), (9, 9));
    }

    #[test]
    fn resolves_even_parity_grid() {
        let (nx, ny) = resolve_grid_dims(30.0, 30.0, 5.0, Parity::Even, Parity::Even).unwrap();
        assert_eq!((nx, ny), (6, 6));
    }

    #[test]
    fn rejects_canvas_too_small() {
        let result = resolve_grid_dims(4.0, 4.0, 4.0, Parity::None, Parity::None);
        assert!(result.is_err());
    }

    #[test]
    fn stretch_edge_keeps_interior_cells_exact() {
        let (offsets, sizes) = axis_geometry(5, 22.0, 4.0, FillMode::StretchEdge);
        assert_eq!(sizes[1], 4.0);
        assert_eq!(sizes[2], 4.0);
        assert_eq!(sizes[3], 4.0);
        assert!((sizes[0] - 5.0).abs() < 1e-9);
        assert!((offsets[0]).abs() < 1e-9);
    }
}
