//! Top-level orchestrator: layout -> modifiers -> endpoints -> path -> verify
//! (§5). Mirrors the teacher's single free `generate()` function, but as a
//! small struct since this pipeline carries a random stream and a status
//! sink across the retry loop rather than being stateless.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Configuration;
use crate::endpoints::{place_endpoints, Endpoint};
use crate::error::{GenerationError, MazeError};
use crate::geometry::Placement;
use crate::layout::{build_grid, compute_geometry, resolve_grid_dims, CellGeometry};
use crate::model::MazeModel;
use crate::modifiers::apply_modifiers;
use crate::path::run_attempt;
use crate::room::{canonical_wall, Grid};
use crate::verify::{verify, LoggingSink, NullSink, StatusEvent, StatusSink};

pub struct Generator {
    config: Configuration,
    rng: StdRng,
}

impl Generator {
    pub fn new(config: Configuration) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            // Same fallback the teacher uses: derive a seed from the
            // process's thread RNG so an unseeded run is still reported
            // (and, if logged, reproducible after the fact).
            let mut tr = rand::rng();
            tr.random()
        });
        Generator {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Runs the full pipeline to completion, reporting status through
    /// `sink` in addition to the ambient `log` output every event carries.
    pub fn run_with_sink(&mut self, sink: &mut dyn StatusSink) -> Result<MazeModel, MazeError> {
        let mut logging = LoggingSink::new(SinkRef(sink));
        self.run_inner(&mut logging)
    }

    pub fn run(&mut self) -> Result<MazeModel, MazeError> {
        let mut sink = NullSink;
        self.run_with_sink(&mut sink)
    }

    fn run_inner(&mut self, sink: &mut dyn StatusSink) -> Result<MazeModel, MazeError> {
        let (nx, ny) = resolve_grid_dims(
            self.config.width,
            self.config.height,
            self.config.side_length,
            self.config.width_parity,
            self.config.height_parity,
        )?;
        let geometry: CellGeometry = compute_geometry(
            nx,
            ny,
            self.config.width,
            self.config.height,
            self.config.side_length,
            self.config.fill_mode,
        );
        sink.on_event(StatusEvent::LayoutComputed {
            nx,
            ny,
            cell_mm: self.config.side_length,
        });

        let mut grid = build_grid(nx, ny);
        let mut warnings = Vec::new();
        apply_modifiers(
            &mut grid,
            &self.config.modifiers,
            &mut self.rng,
            self.config.ignore_errors,
            &mut warnings,
        )?;
        let modifier_closed_walls = grid.closed_wall_segments();

        let endpoint_specs = self.config.effective_endpoints();
        let endpoints = place_endpoints(&mut grid, &endpoint_specs, &mut self.rng)?;
        check_endpoints_reachable(&grid, &endpoints)?;

        // Exclude the walls an endpoint deliberately forced open (§4.6) from
        // the "must stay closed" set — only `C`/`Random` endpoints carve no
        // perimeter wall of their own, so every other endpoint's own opening
        // is expected to turn its wall from Closed to Carved.
        let endpoint_walls: std::collections::HashSet<(i32, i32, crate::geometry::Direction)> = endpoints
            .iter()
            .filter(|e| !matches!(e.placement, Placement::C | Placement::Random))
            .map(|e| {
                let location = grid.room(e.room_ref).location;
                canonical_wall(location.x, location.y, e.direction)
            })
            .collect();
        let committed_closed_walls: Vec<_> = modifier_closed_walls
            .into_iter()
            .filter(|seg| !endpoint_walls.contains(seg))
            .collect();

        for warning in &warnings {
            sink.on_event(StatusEvent::Warning(warning.clone()));
        }

        if self.config.layout_only {
            // No carving: the grid already shows exactly the layout and
            // modifiers committed so far (Closed where a modifier or the
            // perimeter demands it, Open everywhere else) — that is the
            // "all walls open" view the renderer wants (§7).
            sink.on_event(StatusEvent::Completed);
            return Ok(MazeModel::build(&grid, &endpoints, geometry, warnings));
        }

        // §4.7 step 5: a retry restarts from the modifier/endpoint-committed
        // wall state, not from whatever a failed attempt left carved.
        let committed_grid = grid.clone();
        let mut last_error: Option<MazeError> = None;
        for attempt in 1..=self.config.maximum_attempts {
            grid = committed_grid.clone();
            sink.on_event(StatusEvent::AttemptStarted { attempt });
            match run_attempt(&mut grid, &endpoints, self.config.allow_islands, &mut self.rng, sink) {
                Ok(_) => match verify(&grid, &endpoints, self.config.allow_islands, &committed_closed_walls) {
                    Ok(()) => {
                        sink.on_event(StatusEvent::VerifyOk);
                        sink.on_event(StatusEvent::Completed);
                        return Ok(MazeModel::build(&grid, &endpoints, geometry, warnings));
                    }
                    Err(failure) => {
                        sink.on_event(StatusEvent::VerifyFailed {
                            reason: failure.to_string(),
                        });
                        last_error = None;
                    }
                },
                Err(generation_error) => {
                    last_error = Some(generation_error.clone().into());
                }
            }
        }

        if self.config.ignore_errors {
            warnings.push("maximum attempts exceeded; returning last partial maze".to_string());
            sink.on_event(StatusEvent::Warning(warnings.last().unwrap().clone()));
            sink.on_event(StatusEvent::Completed);
            return Ok(MazeModel::build(&grid, &endpoints, geometry, warnings));
        }

        sink.on_event(StatusEvent::Aborted {
            kind: "max_attempts_exceeded".to_string(),
        });
        Err(last_error.unwrap_or_else(|| {
            GenerationError::MaxAttemptsExceeded {
                max_attempts: self.config.maximum_attempts,
            }
            .into()
        }))
    }
}

/// Fails fast if a declared endpoint has no reachable neighbor at all
/// (e.g. boxed in by a frame of blanks), rather than letting every attempt
/// discover this the hard way in the join phase (§7, *EndpointTrapped*).
fn check_endpoints_reachable(grid: &Grid, endpoints: &[Endpoint]) -> Result<(), MazeError> {
    for endpoint in endpoints {
        let has_open_neighbor = grid
            .neighbors(endpoint.room_ref)
            .iter()
            .any(|(_, segs)| segs.iter().any(|&(x, y, d)| grid.wall_state(x, y, d) != crate::room::WallState::Closed));
        if !has_open_neighbor {
            return Err(GenerationError::EndpointTrapped {
                location: grid.room(endpoint.room_ref).location,
            }
            .into());
        }
    }
    Ok(())
}

/// Adapts a `&mut dyn StatusSink` borrow into an owned `StatusSink` so it can
/// sit behind `LoggingSink`'s generic parameter.
struct SinkRef<'a>(&'a mut dyn StatusSink);

impl<'a> StatusSink for SinkRef<'a> {
    fn on_event(&mut self, event: StatusEvent) {
        self.0.on_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::EndpointSpec;

    #[test]
    fn generates_a_small_maze_deterministically() {
        let mut config = Configuration::new(40.0, 40.0);
        config.seed = Some(99);
        let mut a = Generator::new(config.clone());
        let mut b = Generator::new(config);
        let model_a = a.run().unwrap();
        let model_b = b.run().unwrap();
        assert_eq!(
            serde_json::to_string(&model_a).unwrap(),
            serde_json::to_string(&model_b).unwrap()
        );
    }

    #[test]
    fn layout_only_performs_no_carving() {
        let mut config = Configuration::new(40.0, 40.0);
        config.layout_only = true;
        config.seed = Some(1);
        let mut generator = Generator::new(config);
        let model = generator.run().unwrap();
        // Only the endpoints' own perimeter openings are carved; no
        // interior wall is touched since the path generator never runs.
        let interior_rooms = model
            .rooms
            .iter()
            .filter(|r| r.endpoint.is_none());
        assert!(interior_rooms
            .flat_map(|r| r.walls.iter())
            .all(|w| *w != crate::room::WallState::Carved));
    }

    #[test]
    fn trapped_endpoint_is_rejected_up_front() {
        use crate::geometry::RoomInsets;
        use crate::modifiers::Modifier;
        let mut config = Configuration::new(40.0, 40.0);
        config.seed = Some(1);
        config.modifiers.push(Modifier::Frame(RoomInsets::uniform(2)));
        config.endpoints = vec![EndpointSpec::new(Placement::W)];
        let mut generator = Generator::new(config);
        let result = generator.run();
        assert!(result.is_err());
    }
}
