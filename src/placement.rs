//! Placement resolver: turns `(placement, size, offset)` into an absolute
//! rectangle on the grid (§4.3).

use rand::Rng;

use crate::geometry::{Placement, Rect, RoomOffset, RoomSize};

/// Anchor cell for a non-random placement, before the rectangle is aligned
/// or offset is applied.
fn anchor_cell(placement: Placement, nx: u32, ny: u32) -> (i32, i32) {
    let cx = (nx as i32 - 1) / 2;
    let cy = (ny as i32 - 1) / 2;
    let (last_x, last_y) = (nx as i32 - 1, ny as i32 - 1);
    match placement {
        Placement::NW => (0, 0),
        Placement::NE => (last_x, 0),
        Placement::SE => (last_x, last_y),
        Placement::SW => (0, last_y),
        Placement::N => (cx, 0),
        Placement::S => (cx, last_y),
        Placement::W => (0, cy),
        Placement::E => (last_x, cy),
        Placement::C => (cx, cy),
        Placement::Random => (0, 0),
    }
}

/// Start coordinate that centers a run of `len` cells on `anchor`, rounding
/// toward the lower (NW) coordinate on ties.
fn center_align(anchor: i32, len: u32) -> i32 {
    anchor - len as i32 / 2
}

/// Top-left of `size` aligned to `placement`'s anchor on an `nx` x `ny` grid,
/// before any offset is applied.
fn aligned_rect(placement: Placement, size: RoomSize, nx: u32, ny: u32) -> Rect {
    let (ax, ay) = anchor_cell(placement, nx, ny);
    let (x, y) = match placement {
        Placement::NW => (ax, ay),
        Placement::NE => (ax - (size.w as i32 - 1), ay),
        Placement::SE => (ax - (size.w as i32 - 1), ay - (size.h as i32 - 1)),
        Placement::SW => (ax, ay - (size.h as i32 - 1)),
        Placement::N => (center_align(ax, size.w), ay),
        Placement::S => (center_align(ax, size.w), ay - (size.h as i32 - 1)),
        Placement::W => (ax, center_align(ay, size.h)),
        Placement::E => (ax - (size.w as i32 - 1), center_align(ay, size.h)),
        Placement::C => (center_align(ax, size.w), center_align(ay, size.h)),
        Placement::Random => (ax, ay),
    };
    Rect::new(x, y, size.w, size.h)
}

/// Unit step taken by a diagonal offset's "inward" direction for a given
/// placement; zero for `C`/`Random`, where it is a no-op (§4.3).
fn inward_unit(placement: Placement) -> (i32, i32) {
    match placement {
        Placement::NW => (1, 1),
        Placement::NE => (-1, 1),
        Placement::SE => (-1, -1),
        Placement::SW => (1, -1),
        Placement::N => (0, 1),
        Placement::S => (0, -1),
        Placement::W => (1, 0),
        Placement::E => (-1, 0),
        Placement::C | Placement::Random => (0, 0),
    }
}

fn apply_offset(rect: Rect, placement: Placement, offset: RoomOffset) -> Rect {
    let (dx, dy) = match offset {
        RoomOffset::Diagonal(k) => {
            let (ux, uy) = inward_unit(placement);
            (ux * k, uy * k)
        }
        RoomOffset::Explicit(dx, dy) => (dx, dy),
    };
    Rect::new(rect.x + dx, rect.y + dy, rect.w, rect.h)
}

/// Resolves a non-random placement to an absolute (possibly out-of-bounds)
/// rectangle. Bounds policy is left to the caller (§4.3, §4.5).
pub fn resolve_fixed(placement: Placement, size: RoomSize, offset: RoomOffset, nx: u32, ny: u32) -> Rect {
    debug_assert_ne!(placement, Placement::Random);
    let rect = aligned_rect(placement, size, nx, ny);
    apply_offset(rect, placement, offset)
}

/// Draws a uniformly random rectangle of `size` that lies wholly inside the
/// grid, then applies an explicit offset verbatim (a diagonal offset is a
/// no-op for `Random`, since "toward center" has no meaning without a fixed
/// anchor). Returns `None` if `size` does not fit on the grid at all.
pub fn resolve_random(size: RoomSize, offset: RoomOffset, nx: u32, ny: u32, rng: &mut impl Rng) -> Option<Rect> {
    if size.w > nx || size.h > ny {
        return None;
    }
    let max_x = nx - size.w;
    let max_y = ny - size.h;
    let x = if max_x == 0 { 0 } else { rng.random_range(0..=max_x) } as i32;
    let y = if max_y == 0 { 0 } else { rng.random_range(0..=max_y) } as i32;
    let rect = Rect::new(x, y, size.w, size.h);
    Some(match offset {
        RoomOffset::Diagonal(_) => rect,
        RoomOffset::Explicit(dx, dy) => Rect::new(rect.x + dx, rect.y + dy, rect.w, rect.h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nw_anchors_at_grid_corner() {
        let rect = resolve_fixed(Placement::NW, RoomSize::new(3, 2), RoomOffset::ZERO, 10, 10);
        assert_eq!(rect, Rect::new(0, 0, 3, 2));
    }

    #[test]
    fn center_rounds_nw_on_even_size() {
        // 8x8 grid, center cell is (3,3); a 2x2 rectangle centered there
        // with NW rounding starts at (2,2): center_align(3, 2) = 3 - 1 = 2.
        let rect = resolve_fixed(Placement::C, RoomSize::new(2, 2), RoomOffset::ZERO, 8, 8);
        assert_eq!(rect, Rect::new(2, 2, 2, 2));
        assert!(rect.contains(3, 3));
    }

    #[test]
    fn center_align_breaks_even_size_tie_toward_nw() {
        assert_eq!(center_align(3, 4), 1);
    }

    #[test]
    fn diagonal_offset_moves_nw_inward() {
        let rect = resolve_fixed(Placement::NW, RoomSize::SINGLE, RoomOffset::Diagonal(2), 10, 10);
        assert_eq!(rect, Rect::new(2, 2, 1, 1));
    }

    #[test]
    fn diagonal_offset_is_noop_at_center() {
        let base = resolve_fixed(Placement::C, RoomSize::SINGLE, RoomOffset::ZERO, 9, 9);
        let offset = resolve_fixed(Placement::C, RoomSize::SINGLE, RoomOffset::Diagonal(3), 9, 9);
        assert_eq!(base, offset);
    }

    #[test]
    fn random_fits_within_grid() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let rect = resolve_random(RoomSize::new(2, 2), RoomOffset::ZERO, 6, 6, &mut rng).unwrap();
        assert!(rect.fits_within(6, 6));
    }
}
