//! Force-directed layout engine for weighted co-occurrence graphs.
//!
//! This crate computes stable 2-D layouts for graphs of entities connected
//! by shared events (people who attended the same meeting, co-authors, ...)
//! and streams position snapshots to whatever is rendering them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  Command   ┌──────────────────────────────────────────────┐
//! │   Host   │ ─────────▶ │ Actor task (owns the Session exclusively)    │
//! │ renderer │            │                                              │
//! │          │ ◀───────── │  ┌─────────┐  ┌────────┐  ┌────────────┐     │
//! └──────────┘   Event    │  │ Spatial │─▶│ Forces │─▶│ Integrator │     │
//!                         │  │  Grid   │  │        │  │ (cooling)  │     │
//!                         │  └─────────┘  └────────┘  └────────────┘     │
//!                         │        Strategies (radial, grid) bypass      │
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! ## Performance
//!
//! - Up to 500 nodes: exact O(n²) repulsion and collision
//! - Above 500 nodes: uniform 100-unit grid, 5×5 cell neighbourhood,
//!   near-linear per tick at the cost of ignoring far-field repulsion
//!
//! A session can be driven directly ([`Session::apply`] and
//! [`Session::tick`]) or through [`SimulationHandle::spawn`], which runs it
//! on its own task behind a pair of channels.

mod actor;
mod error;
mod forces;
mod grid;
mod integrator;
mod model;
mod params;
mod protocol;
mod session;
mod strategies;

pub use actor::{ActorConfig, EventStream, SimulationHandle, TickCadence};
pub use error::LayoutError;
pub use forces::{ForceModel, PAIRWISE_THRESHOLD};
pub use grid::{SpatialGrid, CELL_SIZE};
pub use integrator::Cooling;
pub use model::{node_radius, Edge, Graph, Node};
pub use params::{ConfigOverrides, SimulationParams};
pub use protocol::{
    decode_command, encode_event, Command, DragPhase, EdgeEndpoint, EdgeInput, EdgeView, Event,
    InitPayload, LayoutKind, NodeInput, NodeView, TickSnapshot,
};
pub use session::{Session, SessionState};
pub use strategies::{golden_spiral, grid_layout, radial_layout, RING_SIZE};

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// A 2D position in layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A 2D velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}
