//! Modifier engine: Frame / Blank / Closing / Merge application, in the
//! mandated phase order (§4.5).

use rand::Rng;

use crate::error::{MazeError, ModifierError};
use crate::geometry::{Direction, Placement, Rect, RoomInsets, RoomOffset, RoomSize};
use crate::placement::{resolve_fixed, resolve_random};
use crate::room::{Grid, RoomType, WallState};

/// How many times a `Random`-placed modifier may redraw before giving up
/// (§9 "Random placements").
const RANDOM_RETRY_BUDGET: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingType {
    CornerPaths,
    CornerNW,
    CornerNE,
    CornerSE,
    CornerSW,
    DirectionW,
    DirectionN,
    DirectionE,
    DirectionS,
    DirectionHorizontal,
    DirectionVertical,
    MiddlePaths,
    MiddleW,
    MiddleN,
    MiddleE,
    MiddleS,
}

impl ClosingType {
    pub fn parse(s: &str) -> Result<ClosingType, MazeError> {
        use ClosingType::*;
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "corner_paths" | "cp" => CornerPaths,
            "corner_nw" => CornerNW,
            "corner_ne" => CornerNE,
            "corner_se" => CornerSE,
            "corner_sw" => CornerSW,
            "dw" | "direction_w" => DirectionW,
            "dn" | "direction_n" => DirectionN,
            "de" | "direction_e" => DirectionE,
            "ds" | "direction_s" => DirectionS,
            "dh" | "direction_horizontal" => DirectionHorizontal,
            "dv" | "direction_vertical" => DirectionVertical,
            "middle_paths" | "mp" => MiddlePaths,
            "mw" | "middle_w" => MiddleW,
            "mn" | "middle_n" => MiddleN,
            "me" | "middle_e" => MiddleE,
            "ms" | "middle_s" => MiddleS,
            other => return Err(crate::error::ConfigError::BadClosing(other.to_string()).into()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct BlankSpec {
    pub placement: Placement,
    pub size: Option<RoomSize>,
    pub offset: RoomOffset,
}

#[derive(Debug, Clone)]
pub struct ClosingSpec {
    pub closing_type: ClosingType,
    pub inverted: bool,
    pub placement: Placement,
    pub size: Option<RoomSize>,
    pub offset: RoomOffset,
}

#[derive(Debug, Clone)]
pub struct MergeSpec {
    pub placement: Placement,
    pub size: Option<RoomSize>,
    pub offset: RoomOffset,
}

#[derive(Debug, Clone)]
pub enum Modifier {
    Frame(RoomInsets),
    Blank(BlankSpec),
    Closing(ClosingSpec),
    Merge(MergeSpec),
}

impl Modifier {
    fn placement_class(&self) -> u8 {
        match self {
            // Frame is a grid-wide modifier, applied before any classed
            // blank placement within the Blanks phase.
            Modifier::Frame(_) => 0,
            Modifier::Blank(s) => 1 + s.placement.class(),
            Modifier::Closing(s) => s.placement.class(),
            Modifier::Merge(s) => s.placement.class(),
        }
    }
}

fn resolve_rect(
    placement: Placement,
    size: RoomSize,
    offset: RoomOffset,
    nx: u32,
    ny: u32,
    rng: &mut impl Rng,
) -> Result<Rect, ModifierError> {
    match placement {
        Placement::Random => resolve_random(size, offset, nx, ny, rng).ok_or(ModifierError::Unplaceable {
            placement,
            size,
            nx,
            ny,
        }),
        _ => {
            let rect = resolve_fixed(placement, size, offset, nx, ny);
            rect.clip(nx, ny).ok_or(ModifierError::Unplaceable {
                placement,
                size,
                nx,
                ny,
            })
        }
    }
}

fn apply_frame(grid: &mut Grid, insets: &RoomInsets, warnings: &mut Vec<String>) {
    let (nx, ny) = (grid.nx(), grid.ny());
    let mut mark = |rect: Rect| {
        if let Some(rect) = rect.clip(nx, ny) {
            for (x, y) in rect.cells() {
                let id = grid.cell_room_id(x, y);
                grid.room_mut(id).room_type = RoomType::Blank;
            }
        }
    };
    if insets.top > 0 {
        mark(Rect::new(0, 0, nx, insets.top));
    }
    if insets.bottom > 0 {
        mark(Rect::new(0, ny as i32 - insets.bottom as i32, nx, insets.bottom));
    }
    if insets.left > 0 {
        mark(Rect::new(0, 0, insets.left, ny));
    }
    if insets.right > 0 {
        mark(Rect::new(nx as i32 - insets.right as i32, 0, insets.right, ny));
    }
    if insets.top.max(insets.bottom).max(insets.left).max(insets.right) >= 2 {
        warnings.push(format!(
            "frame thickness {:?} may trap endpoints with no non-blank neighbor",
            insets
        ));
    }
}

fn apply_blank(grid: &mut Grid, spec: &BlankSpec, rng: &mut impl Rng) -> Result<(), ModifierError> {
    let size = spec.size.unwrap_or(RoomSize::SINGLE);
    let rect = resolve_rect(spec.placement, size, spec.offset, grid.nx(), grid.ny(), rng)?;
    for (x, y) in rect.cells() {
        let id = grid.cell_room_id(x, y);
        grid.room_mut(id).room_type = RoomType::Blank;
    }
    Ok(())
}

/// Candidate wall segments for a closing type over `rect` (§4.5).
fn closing_candidates(grid: &Grid, closing_type: ClosingType, rect: Rect) -> Vec<(i32, i32, Direction)> {
    use ClosingType::*;
    let corner = |x: i32, y: i32, dirs: &[Direction]| -> Vec<(i32, i32, Direction)> {
        dirs.iter().map(|&d| (x, y, d)).collect()
    };
    match closing_type {
        CornerPaths => {
            let mut v = Vec::new();
            v.extend(corner(rect.x, rect.y, &[Direction::N, Direction::W]));
            v.extend(corner(rect.right() - 1, rect.y, &[Direction::N, Direction::E]));
            v.extend(corner(rect.right() - 1, rect.bottom() - 1, &[Direction::S, Direction::E]));
            v.extend(corner(rect.x, rect.bottom() - 1, &[Direction::S, Direction::W]));
            v
        }
        CornerNW => corner(rect.x, rect.y, &[Direction::N, Direction::W]),
        CornerNE => corner(rect.right() - 1, rect.y, &[Direction::N, Direction::E]),
        CornerSE => corner(rect.right() - 1, rect.bottom() - 1, &[Direction::S, Direction::E]),
        CornerSW => corner(rect.x, rect.bottom() - 1, &[Direction::S, Direction::W]),
        DirectionW => (rect.y..rect.bottom()).map(|y| (rect.x, y, Direction::W)).collect(),
        DirectionE => (rect.y..rect.bottom())
            .map(|y| (rect.right() - 1, y, Direction::E))
            .collect(),
        DirectionN => (rect.x..rect.right()).map(|x| (x, rect.y, Direction::N)).collect(),
        DirectionS => (rect.x..rect.right())
            .map(|x| (x, rect.bottom() - 1, Direction::S))
            .collect(),
        DirectionHorizontal => grid.interior_horizontal_segments(rect),
        DirectionVertical => grid.interior_vertical_segments(rect),
        MiddlePaths => {
            let mx = rect.x + rect.w as i32 / 2;
            let my = rect.y + rect.h as i32 / 2;
            vec![
                (mx, rect.y, Direction::N),
                (rect.right() - 1, my, Direction::E),
                (mx, rect.bottom() - 1, Direction::S),
                (rect.x, my, Direction::W),
            ]
        }
        MiddleN => {
            let mx = rect.x + rect.w as i32 / 2;
            vec![(mx, rect.y, Direction::N)]
        }
        MiddleE => {
            let my = rect.y + rect.h as i32 / 2;
            vec![(rect.right() - 1, my, Direction::E)]
        }
        MiddleS => {
            let mx = rect.x + rect.w as i32 / 2;
            vec![(mx, rect.bottom() - 1, Direction::S)]
        }
        MiddleW => {
            let my = rect.y + rect.h as i32 / 2;
            vec![(rect.x, my, Direction::W)]
        }
    }
}

fn apply_closing(grid: &mut Grid, spec: &ClosingSpec, rng: &mut impl Rng) -> Result<(), ModifierError> {
    let size = spec.size.unwrap_or(RoomSize::SINGLE);
    let rect = resolve_rect(spec.placement, size, spec.offset, grid.nx(), grid.ny(), rng)?;
    let candidates = closing_candidates(grid, spec.closing_type, rect);
    let selected: Vec<(i32, i32, Direction)> = if spec.inverted {
        let boundary = grid.boundary_segments(rect);
        boundary
            .into_iter()
            .filter(|seg| !candidates.contains(seg))
            .collect()
    } else {
        candidates
    };
    for (x, y, dir) in selected {
        grid.close(x, y, dir);
    }
    Ok(())
}

fn mergeable_reason(grid: &Grid, rect: Rect) -> Option<&'static str> {
    if !grid.rect_is_plain_normal(rect) {
        return Some("rectangle contains a non-normal or already-merged cell");
    }
    let all_closed = grid
        .boundary_segments(rect)
        .into_iter()
        .all(|(x, y, dir)| grid.wall_state(x, y, dir) == WallState::Closed);
    if all_closed {
        return Some("merged room would be completely enclosed");
    }
    None
}

fn apply_merge(grid: &mut Grid, spec: &MergeSpec, rng: &mut impl Rng) -> Result<(), MazeError> {
    let size = spec.size.unwrap_or(RoomSize::SINGLE);
    let (nx, ny) = (grid.nx(), grid.ny());
    if spec.placement == Placement::Random {
        for _ in 0..RANDOM_RETRY_BUDGET {
            let Some(rect) = resolve_random(size, spec.offset, nx, ny, rng) else {
                return Err(ModifierError::Unplaceable {
                    placement: spec.placement,
                    size,
                    nx,
                    ny,
                }
                .into());
            };
            if mergeable_reason(grid, rect).is_none() {
                grid.merge(rect);
                return Ok(());
            }
        }
        return Err(ModifierError::ConflictAfterRetries {
            attempts: RANDOM_RETRY_BUDGET,
        }
        .into());
    }
    let rect = resolve_fixed(spec.placement, size, spec.offset, nx, ny);
    let rect = rect.clip(nx, ny).ok_or(ModifierError::Unplaceable {
        placement: spec.placement,
        size,
        nx,
        ny,
    })?;
    if let Some(reason) = mergeable_reason(grid, rect) {
        return Err(ModifierError::InvalidMerge {
            rect,
            reason: reason.to_string(),
        }
        .into());
    }
    grid.merge(rect);
    Ok(())
}

/// Applies every modifier to `grid`, phase by phase (§4.5). On a non-fatal
/// error, if `ignore_errors` is set the offending modifier is skipped and a
/// warning recorded instead of aborting the whole run.
pub fn apply_modifiers(
    grid: &mut Grid,
    modifiers: &[Modifier],
    rng: &mut impl Rng,
    ignore_errors: bool,
    warnings: &mut Vec<String>,
) -> Result<(), MazeError> {
    let is_blank_phase = |m: &&Modifier| matches!(m, Modifier::Frame(_) | Modifier::Blank(_));
    let is_closing_phase = |m: &&Modifier| matches!(m, Modifier::Closing(_));
    let is_merge_phase = |m: &&Modifier| matches!(m, Modifier::Merge(_));

    for phase_filter in [&is_blank_phase as &dyn Fn(&&Modifier) -> bool, &is_closing_phase, &is_merge_phase] {
        let mut phase: Vec<&Modifier> = modifiers.iter().filter(phase_filter).collect();
        phase.sort_by_key(|m| m.placement_class());
        for modifier in phase {
            let result = match modifier {
                Modifier::Frame(insets) => {
                    apply_frame(grid, insets, warnings);
                    Ok(())
                }
                Modifier::Blank(spec) => apply_blank(grid, spec, rng).map_err(MazeError::from),
                Modifier::Closing(spec) => apply_closing(grid, spec, rng).map_err(MazeError::from),
                Modifier::Merge(spec) => apply_merge(grid, spec, rng),
            };
            if let Err(err) = result {
                if ignore_errors {
                    warnings.push(format!("skipped modifier after error: {err}"));
                } else {
                    return Err(err);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(1)
    }

    #[test]
    fn frame_marks_outer_ring_blank() {
        let mut grid = Grid::new(6, 6);
        let mut warnings = Vec::new();
        apply_frame(&mut grid, &RoomInsets::uniform(1), &mut warnings);
        for x in 0..6 {
            let id = grid.cell_room_id(x, 0);
            assert_eq!(grid.room(id).room_type, RoomType::Blank);
        }
        let center_id = grid.cell_room_id(3, 3);
        assert_eq!(grid.room(center_id).room_type, RoomType::Normal);
    }

    #[test]
    fn blank_is_idempotent() {
        let mut grid1 = Grid::new(5, 5);
        let mut grid2 = Grid::new(5, 5);
        let spec = BlankSpec {
            placement: Placement::C,
            size: Some(RoomSize::new(3, 3)),
            offset: RoomOffset::ZERO,
        };
        apply_blank(&mut grid1, &spec, &mut rng()).unwrap();
        apply_blank(&mut grid2, &spec, &mut rng()).unwrap();
        apply_blank(&mut grid2, &spec, &mut rng()).unwrap();
        for id in 0..grid1.live_room_ids().len() {
            assert_eq!(grid1.room(id).room_type, grid2.room(id).room_type);
        }
    }

    #[test]
    fn inversion_law_for_closings() {
        let mut plain = Grid::new(6, 6);
        let mut inverted = Grid::new(6, 6);
        let rect_spec = |inverted_flag: bool| ClosingSpec {
            closing_type: ClosingType::CornerPaths,
            inverted: inverted_flag,
            placement: Placement::C,
            size: Some(RoomSize::new(4, 4)),
            offset: RoomOffset::ZERO,
        };
        apply_closing(&mut plain, &rect_spec(false), &mut rng()).unwrap();
        apply_closing(&mut inverted, &rect_spec(true), &mut rng()).unwrap();

        let rect = resolve_fixed(Placement::C, RoomSize::new(4, 4), RoomOffset::ZERO, 6, 6);
        let boundary = plain.boundary_segments(rect);
        for seg in boundary {
            let (x, y, dir) = seg;
            let plain_closed = plain.wall_state(x, y, dir) == WallState::Closed;
            let inverted_closed = inverted.wall_state(x, y, dir) == WallState::Closed;
            assert_ne!(plain_closed, inverted_closed, "segment {:?} should differ", seg);
        }
    }

    #[test]
    fn merge_rejects_non_normal_cells() {
        let mut grid = Grid::new(5, 5);
        grid.merge(Rect::new(0, 0, 2, 2));
        let spec = MergeSpec {
            placement: Placement::NW,
            size: Some(RoomSize::new(3, 3)),
            offset: RoomOffset::ZERO,
        };
        let err = apply_merge(&mut grid, &spec, &mut rng());
        assert!(err.is_err());
    }
}
