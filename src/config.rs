//! Configuration record consumed from the CLI collaborator (§6).

use serde::{Deserialize, Serialize};

use crate::endpoints::{default_endpoint_specs, EndpointSpec};
use crate::layout::{FillMode, Parity};
use crate::modifiers::Modifier;

/// SVG output is out of scope for the core (§1); these flags are parsed and
/// stored verbatim so the CLI grammar round-trips, but nothing in the core
/// acts on them (§6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvgOptions {
    pub unit: String,
    pub dpi: f64,
    pub zero_point: String,
    pub no_background: bool,
    pub background_color: Option<String>,
    pub room_color: Option<String>,
    pub endpoint_colors: Vec<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        SvgOptions {
            unit: "mm".to_string(),
            dpi: 96.0,
            zero_point: "top_left".to_string(),
            no_background: false,
            background_color: None,
            room_color: None,
            endpoint_colors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Configuration {
    pub width: f64,
    pub height: f64,
    pub side_length: f64,
    pub wall_thickness: f64,
    pub width_parity: Parity,
    pub height_parity: Parity,
    pub fill_mode: FillMode,
    pub endpoints: Vec<EndpointSpec>,
    pub modifiers: Vec<Modifier>,
    pub allow_islands: bool,
    pub maximum_attempts: u32,
    pub layout_only: bool,
    pub ignore_errors: bool,
    pub silent: bool,
    pub seed: Option<u64>,
    pub svg: SvgOptions,
}

impl Configuration {
    pub fn new(width: f64, height: f64) -> Self {
        Configuration {
            width,
            height,
            side_length: 4.0,
            wall_thickness: 1.7,
            width_parity: Parity::Odd,
            height_parity: Parity::Odd,
            fill_mode: FillMode::StretchEdge,
            endpoints: Vec::new(),
            modifiers: Vec::new(),
            allow_islands: true,
            maximum_attempts: 20,
            layout_only: false,
            ignore_errors: false,
            silent: false,
            seed: None,
            svg: SvgOptions::default(),
        }
    }

    /// Endpoints to use for generation: the declared list, or the default
    /// W/E pair if none were declared (§4.6).
    pub fn effective_endpoints(&self) -> Vec<EndpointSpec> {
        if self.endpoints.is_empty() {
            default_endpoint_specs()
        } else {
            self.endpoints.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Configuration::new(100.0, 100.0);
        assert_eq!(config.side_length, 4.0);
        assert_eq!(config.wall_thickness, 1.7);
        assert!(config.allow_islands);
        assert_eq!(config.maximum_attempts, 20);
        assert!(!config.layout_only);
    }

    #[test]
    fn empty_endpoints_default_to_w_and_e() {
        let config = Configuration::new(40.0, 40.0);
        let endpoints = config.effective_endpoints();
        assert_eq!(endpoints.len(), 2);
    }
}
