//! The simulation session: owns graph state and runs the tick state machine.
//!
//! ```text
//!            init (non-empty), restart, drag start
//!   ┌──────┐ ─────────────────────────────────────▶ ┌─────────┐
//!   │ Idle │                                        │ Running │ ──┐ tick
//!   └──────┘ ◀───────────────────────────────────── └─────────┘ ◀─┘
//!            alpha < alpha_min, stop, radial/grid
//! ```
//!
//! Commands are applied whole between ticks. A session never blocks and
//! never schedules anything itself; the caller decides when to tick.

use tracing::{debug, info, trace, warn};

use crate::forces::ForceModel;
use crate::integrator::{integrate, Cooling};
use crate::model::Graph;
use crate::params::{ConfigOverrides, SimulationParams};
use crate::protocol::{
    Command, DragPhase, EdgeEndpoint, EdgeView, Event, InitPayload, LayoutKind, NodeView,
    TickSnapshot,
};
use crate::strategies::{golden_spiral, grid_layout, radial_layout};
use crate::{LayoutError, Position, Result};

/// Alpha target held while the host drags a node.
const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Whether the session wants more ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
}

/// A single graph view under simulation.
#[derive(Debug)]
pub struct Session {
    graph: Graph,
    params: SimulationParams,
    cooling: Cooling,
    state: SessionState,
    strategy: LayoutKind,
    ticks: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An idle session with no graph.
    pub fn new() -> Self {
        Self {
            graph: Graph::default(),
            params: SimulationParams::default(),
            cooling: Cooling::frozen(),
            state: SessionState::Idle,
            strategy: LayoutKind::Force,
            ticks: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn alpha(&self) -> f64 {
        self.cooling.alpha()
    }

    pub fn alpha_target(&self) -> f64 {
        self.cooling.alpha_target()
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn strategy(&self) -> LayoutKind {
        self.strategy
    }

    /// Ticks run since the last `init`.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Apply one command. Returns the event it produces directly, if any.
    ///
    /// Problems with the command itself (an unknown node, say) are logged
    /// and the command is dropped.
    pub fn apply(&mut self, command: Command) -> Option<Event> {
        match command {
            Command::Init(payload) => self.init(payload),
            Command::Drag {
                node_id,
                phase,
                x,
                y,
            } => {
                if let Err(e) = self.drag(&node_id, phase, x, y) {
                    warn!("Ignoring drag: {}", e);
                }
                None
            }
            Command::Restart { alpha } => {
                self.restart(alpha);
                None
            }
            Command::Resize { width, height } => {
                self.resize(width, height);
                None
            }
            Command::Layout { kind } => self.set_layout(kind),
            Command::Configure { overrides } => {
                self.configure(&overrides);
                None
            }
            Command::Stop => self.stop(),
        }
    }

    /// Load a new graph, derive parameters and start running.
    ///
    /// An empty graph ends immediately.
    pub fn init(&mut self, payload: InitPayload) -> Option<Event> {
        let (mut graph, hints) = Graph::from_input(payload.nodes, payload.edges);
        let params = SimulationParams::derive(&graph, &payload.config);

        let seeds = golden_spiral(graph.node_count(), &params);
        for ((node, hint), seed) in graph.nodes.iter_mut().zip(hints).zip(seeds) {
            node.position = hint.unwrap_or(seed);
        }

        debug!(
            "Session initialized: {} nodes, {} edges, grid={}, params={:?}",
            graph.node_count(),
            graph.edge_count(),
            ForceModel::uses_grid(graph.node_count()),
            params
        );

        self.graph = graph;
        self.params = params;
        self.strategy = LayoutKind::Force;
        self.ticks = 0;

        if self.graph.is_empty() {
            self.cooling.freeze();
            self.state = SessionState::Idle;
            return Some(Event::End);
        }

        self.cooling = Cooling::hot();
        self.state = SessionState::Running;
        None
    }

    /// Pin, move or release a node.
    ///
    /// `start` pins the node where it is and warms the simulation toward
    /// alpha 0.3. `drag` moves the pin; a missing coordinate keeps its
    /// current value. `end` releases the node and lets the simulation cool.
    pub fn drag(
        &mut self,
        node_id: &str,
        phase: DragPhase,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Result<()> {
        let node = self
            .graph
            .node_mut(node_id)
            .ok_or_else(|| LayoutError::UnknownNode(node_id.to_string()))?;

        match phase {
            DragPhase::Start => {
                node.pin(node.position);
                self.cooling.set_target(DRAG_ALPHA_TARGET);
                self.strategy = LayoutKind::Force;
                self.state = SessionState::Running;
            }
            DragPhase::Drag => {
                let current = node.pinned.unwrap_or(node.position);
                let at = Position::new(
                    x.filter(|v| v.is_finite()).unwrap_or(current.x),
                    y.filter(|v| v.is_finite()).unwrap_or(current.y),
                );
                node.pin(at);
            }
            DragPhase::End => {
                node.unpin();
                self.cooling.set_target(0.0);
            }
        }
        debug!("Drag {:?} on {}", phase, node_id);
        Ok(())
    }

    /// Re-heat to `alpha` (default 1) and resume the force simulation from
    /// the current positions.
    ///
    /// Alpha stays inside [0, 1]: a supplied value is clamped, not raised
    /// to 1, so `restart {alpha: 0.3}` gives a gentle re-heat while
    /// `restart {alpha: 5}` is the same as a full one.
    pub fn restart(&mut self, alpha: Option<f64>) {
        if self.graph.is_empty() {
            debug!("Restart ignored: no nodes");
            return;
        }
        let alpha = alpha.filter(|a| a.is_finite()).unwrap_or(1.0);
        self.cooling.reheat(alpha);
        self.strategy = LayoutKind::Force;
        self.state = SessionState::Running;
        debug!("Restarted at alpha {:.3}", self.cooling.alpha());
    }

    /// Update the layout bounds. Positions and alpha are untouched.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.params.merge(&ConfigOverrides::bounds(width, height));
    }

    /// Merge live parameter overrides. Positions and alpha are untouched.
    pub fn configure(&mut self, overrides: &ConfigOverrides) {
        self.params.merge(overrides);
    }

    /// Switch placement strategy.
    ///
    /// Radial and grid place every node at once and emit a single snapshot
    /// at alpha 0, leaving the session idle. Force re-seeds the spiral and
    /// starts a fresh simulation.
    pub fn set_layout(&mut self, kind: LayoutKind) -> Option<Event> {
        self.strategy = kind;
        match kind {
            LayoutKind::Radial | LayoutKind::Grid => {
                if kind == LayoutKind::Radial {
                    radial_layout(&mut self.graph.nodes, &self.params);
                } else {
                    grid_layout(&mut self.graph.nodes, &self.params);
                }
                self.cooling.freeze();
                self.state = SessionState::Idle;
                Some(Event::Tick(self.snapshot()))
            }
            LayoutKind::Force => {
                let seeds = golden_spiral(self.graph.node_count(), &self.params);
                for (node, seed) in self.graph.nodes.iter_mut().zip(seeds) {
                    node.unpin();
                    node.position = seed;
                    node.velocity = Default::default();
                }
                self.restart(None);
                None
            }
        }
    }

    /// Halt ticking. A running session reports that it has come to rest.
    pub fn stop(&mut self) -> Option<Event> {
        if self.state == SessionState::Idle {
            return None;
        }
        self.state = SessionState::Idle;
        info!("Simulation stopped after {} ticks", self.ticks);
        Some(Event::End)
    }

    /// Advance one tick.
    ///
    /// Returns `None` while idle, [`Event::End`] on the tick where alpha
    /// drops below `alpha_min`, and a snapshot otherwise.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != SessionState::Running {
            return None;
        }

        let alpha = self.cooling.step(self.params.alpha_decay);
        if self.cooling.is_settled(self.params.alpha_min) {
            self.state = SessionState::Idle;
            info!("Simulation at rest after {} ticks", self.ticks);
            return Some(Event::End);
        }

        ForceModel::new(self.params).apply(&mut self.graph);
        integrate(&mut self.graph.nodes, self.params.velocity_decay, alpha);
        self.ticks += 1;
        trace!("Tick {} alpha={:.4}", self.ticks, alpha);

        Some(Event::Tick(self.snapshot()))
    }

    /// Copy of the current node and edge state.
    pub fn snapshot(&self) -> TickSnapshot {
        let nodes = &self.graph.nodes;
        let endpoint = |i: usize| EdgeEndpoint {
            id: nodes[i].id.clone(),
            x: nodes[i].position.x,
            y: nodes[i].position.y,
        };

        TickSnapshot {
            nodes: nodes
                .iter()
                .map(|n| NodeView {
                    id: n.id.clone(),
                    x: n.position.x,
                    y: n.position.y,
                    radius: n.radius,
                    label: n.label.clone(),
                    weight: n.weight,
                })
                .collect(),
            edges: self
                .graph
                .edges
                .iter()
                .map(|e| EdgeView {
                    source: endpoint(e.source),
                    target: endpoint(e.target),
                    weight: e.weight,
                })
                .collect(),
            alpha: self.cooling.alpha(),
        }
    }
}
