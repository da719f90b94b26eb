//! Simulation parameters and host-supplied overrides.
//!
//! Parameters are derived from the size and density of the graph when a
//! session is initialised. Any value the host supplies in the `init` config
//! takes precedence, provided it passes validation.

use serde::{Deserialize, Serialize};

use crate::model::Graph;
use crate::{LayoutError, Position, Result};

/// Canvas width used when the host does not supply one.
pub const DEFAULT_WIDTH: f64 = 960.0;
/// Canvas height used when the host does not supply one.
pub const DEFAULT_HEIGHT: f64 = 600.0;

/// Resolved parameter set of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Layout bounds, origin at (0, 0).
    pub width: f64,
    pub height: f64,
    /// Repulsion strength (negative = repulsion).
    pub charge_strength: f64,
    /// Base rest length of a link, before the per-edge weight term.
    pub link_distance: f64,
    /// Extra clearance between node circles.
    pub collision_radius: f64,
    /// Pull toward the bounds center.
    pub center_strength: f64,
    /// Hookean stiffness of links.
    pub link_strength: f64,
    /// Rate at which alpha relaxes toward its target.
    pub alpha_decay: f64,
    /// Alpha below which the simulation comes to rest.
    pub alpha_min: f64,
    /// Fraction of velocity kept each tick.
    pub velocity_decay: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            charge_strength: -400.0,
            link_distance: 80.0,
            collision_radius: 20.0,
            center_strength: 0.08,
            link_strength: 0.4,
            alpha_decay: 0.01,
            alpha_min: 0.001,
            velocity_decay: 0.6,
        }
    }
}

impl SimulationParams {
    /// Derive parameters adapted to `graph`, then apply valid overrides.
    pub fn derive(graph: &Graph, overrides: &ConfigOverrides) -> Self {
        let n = graph.node_count();
        let density = graph.density();

        let mut params = Self {
            charge_strength: if n > 500 {
                -800.0
            } else if n > 200 {
                -600.0
            } else {
                -400.0
            },
            link_distance: 80.0 + (n as f64).sqrt() * 3.0,
            center_strength: if density < 0.01 { 0.08 } else { 0.03 },
            link_strength: if density > 0.05 { 0.2 } else { 0.4 },
            collision_radius: if n > 500 { 15.0 } else { 20.0 },
            ..Self::default()
        };
        params.merge(overrides);
        params
    }

    /// Overlay every override that passes validation; log and skip the rest.
    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        for (field, value, check) in overrides.entries() {
            let Some(value) = value else { continue };
            match check.validate(field, value) {
                Ok(()) => *self.field_mut(field) = value,
                Err(e) => tracing::warn!("Ignoring override: {}", e),
            }
        }
    }

    /// Center of the layout bounds.
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    fn field_mut(&mut self, field: &'static str) -> &mut f64 {
        match field {
            "width" => &mut self.width,
            "height" => &mut self.height,
            "charge_strength" => &mut self.charge_strength,
            "link_distance" => &mut self.link_distance,
            "collision_radius" => &mut self.collision_radius,
            "center_strength" => &mut self.center_strength,
            "link_strength" => &mut self.link_strength,
            "alpha_decay" => &mut self.alpha_decay,
            "alpha_min" => &mut self.alpha_min,
            "velocity_decay" => &mut self.velocity_decay,
            other => unreachable!("no parameter named {other}"),
        }
    }
}

/// Host-supplied parameter values. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub charge_strength: Option<f64>,
    pub link_distance: Option<f64>,
    pub collision_radius: Option<f64>,
    pub center_strength: Option<f64>,
    pub link_strength: Option<f64>,
    pub alpha_decay: Option<f64>,
    pub alpha_min: Option<f64>,
    pub velocity_decay: Option<f64>,
}

impl ConfigOverrides {
    /// Overrides carrying only the layout bounds.
    pub fn bounds(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    fn entries(&self) -> [(&'static str, Option<f64>, Check); 10] {
        [
            ("width", self.width, Check::Positive),
            ("height", self.height, Check::Positive),
            ("charge_strength", self.charge_strength, Check::NonPositive),
            ("link_distance", self.link_distance, Check::NonNegative),
            ("collision_radius", self.collision_radius, Check::NonNegative),
            ("center_strength", self.center_strength, Check::NonNegative),
            ("link_strength", self.link_strength, Check::NonNegative),
            ("alpha_decay", self.alpha_decay, Check::UnitOpen),
            ("alpha_min", self.alpha_min, Check::UnitOpen),
            ("velocity_decay", self.velocity_decay, Check::UnitOpen),
        ]
    }

    /// Validate every supplied value, failing on the first bad one.
    pub fn validate(&self) -> Result<()> {
        for (field, value, check) in self.entries() {
            if let Some(value) = value {
                check.validate(field, value)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Check {
    Positive,
    NonNegative,
    NonPositive,
    /// Strictly between 0 and 1.
    UnitOpen,
}

impl Check {
    fn validate(self, field: &'static str, value: f64) -> Result<()> {
        let reason = if !value.is_finite() {
            Some("must be finite")
        } else {
            match self {
                Check::Positive if value <= 0.0 => Some("must be > 0"),
                Check::NonNegative if value < 0.0 => Some("must be >= 0"),
                Check::NonPositive if value > 0.0 => Some("must be <= 0"),
                Check::UnitOpen if value <= 0.0 || value >= 1.0 => Some("must be in (0, 1)"),
                _ => None,
            }
        };
        match reason {
            Some(reason) => Err(LayoutError::InvalidConfig {
                field,
                reason: format!("{} (got {})", reason, value),
            }),
            None => Ok(()),
        }
    }
}
