//! Endpoint placer: resolves declared endpoints onto concrete rooms and
//! opens their exterior walls (§4.6).

use rand::Rng;

use crate::error::{MazeError, ModifierError};
use crate::geometry::{Direction, Placement, RoomOffset, RoomSize};
use crate::placement::{resolve_fixed, resolve_random};
use crate::room::{Grid, RoomId, RoomType};

#[derive(Debug, Clone)]
pub struct EndpointSpec {
    pub placement: Placement,
    pub offset: RoomOffset,
    pub dead_end: bool,
}

impl EndpointSpec {
    pub fn new(placement: Placement) -> Self {
        EndpointSpec {
            placement,
            offset: RoomOffset::ZERO,
            dead_end: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub placement: Placement,
    pub offset: RoomOffset,
    pub dead_end: bool,
    pub room_ref: RoomId,
    pub direction: Direction,
}

fn forced_direction(placement: Placement) -> Option<Direction> {
    // Corners force a side; since a corner touches two exterior walls, this
    // picks the vertical one (N for the top corners, S for the bottom ones)
    // as the single opening side — an implementation decision the spec
    // leaves unstated for corner endpoints.
    match placement {
        Placement::W => Some(Direction::W),
        Placement::N => Some(Direction::N),
        Placement::E => Some(Direction::E),
        Placement::S => Some(Direction::S),
        Placement::NW | Placement::NE => Some(Direction::N),
        Placement::SW | Placement::SE => Some(Direction::S),
        Placement::C | Placement::Random => None,
    }
}

/// Direction of smallest absolute offset component; ties resolve to N then W
/// (§4.6).
fn offset_direction(offset: RoomOffset) -> Direction {
    let (dx, dy) = match offset {
        RoomOffset::Diagonal(k) => (k, k),
        RoomOffset::Explicit(dx, dy) => (dx, dy),
    };
    if dy.abs() <= dx.abs() {
        if dy <= 0 {
            Direction::N
        } else {
            Direction::S
        }
    } else if dx <= 0 {
        Direction::W
    } else {
        Direction::E
    }
}

fn resolve_endpoint_cell(
    spec: &EndpointSpec,
    nx: u32,
    ny: u32,
    rng: &mut impl Rng,
) -> Result<(i32, i32), ModifierError> {
    let size = RoomSize::SINGLE;
    let rect = if spec.placement == Placement::Random {
        resolve_random(size, spec.offset, nx, ny, rng).ok_or(ModifierError::Unplaceable {
            placement: spec.placement,
            size,
            nx,
            ny,
        })?
    } else {
        resolve_fixed(spec.placement, size, spec.offset, nx, ny)
            .clip(nx, ny)
            .ok_or(ModifierError::Unplaceable {
                placement: spec.placement,
                size,
                nx,
                ny,
            })?
    };
    Ok((rect.x, rect.y))
}

/// Resolves every declared endpoint onto a concrete room, converting Blank
/// target cells back to Normal and carving perimeter openings (§4.6).
pub fn place_endpoints(
    grid: &mut Grid,
    specs: &[EndpointSpec],
    rng: &mut impl Rng,
) -> Result<Vec<Endpoint>, MazeError> {
    let (nx, ny) = (grid.nx(), grid.ny());
    let mut endpoints = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        let (x, y) = resolve_endpoint_cell(spec, nx, ny, rng)?;
        let room_id = grid.cell_room_id(x, y);
        if grid.room(room_id).room_type == RoomType::Blank {
            grid.room_mut(room_id).room_type = RoomType::Normal;
        }
        grid.room_mut(room_id).room_type = RoomType::EndpointAnchor;
        grid.room_mut(room_id).endpoint = Some(index);

        let direction = match forced_direction(spec.placement) {
            Some(dir) => {
                grid.force_open(x, y, dir);
                dir
            }
            None => offset_direction(spec.offset),
        };

        endpoints.push(Endpoint {
            placement: spec.placement,
            offset: spec.offset,
            dead_end: spec.dead_end,
            room_ref: room_id,
            direction,
        });
    }
    Ok(endpoints)
}

/// The default endpoint pair used when none are declared: W and E, mid-row,
/// both joinable (§4.6).
pub fn default_endpoint_specs() -> Vec<EndpointSpec> {
    vec![EndpointSpec::new(Placement::W), EndpointSpec::new(Placement::E)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn default_endpoints_are_w_and_e() {
        let mut grid = Grid::new(9, 9);
        let specs = default_endpoint_specs();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let endpoints = place_endpoints(&mut grid, &specs, &mut rng).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].direction, Direction::W);
        assert_eq!(endpoints[1].direction, Direction::E);
    }

    #[test]
    fn endpoint_converts_blank_to_normal() {
        use crate::geometry::Rect;
        let mut grid = Grid::new(5, 5);
        let id = grid.cell_room_id(0, 2);
        grid.room_mut(id).room_type = RoomType::Blank;
        let _ = Rect::new(0, 0, 1, 1);
        let specs = vec![EndpointSpec::new(Placement::W)];
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let endpoints = place_endpoints(&mut grid, &specs, &mut rng).unwrap();
        let room = grid.room(endpoints[0].room_ref);
        assert_eq!(room.room_type, RoomType::EndpointAnchor);
    }
}
