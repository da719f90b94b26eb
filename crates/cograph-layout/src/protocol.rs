//! Commands in, events out.
//!
//! Both directions are plain JSON objects tagged by a `command` or `event`
//! field, suitable for line-delimited transports:
//!
//! ```json
//! {"command": "drag", "node_id": "alice", "phase": "drag", "x": 100, "y": 100}
//! {"event": "tick", "nodes": [...], "edges": [...], "alpha": 0.42}
//! ```

use serde::{Deserialize, Serialize};

use crate::params::ConfigOverrides;
use crate::Result;

/// Host → simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Replace the graph and start from scratch.
    Init(InitPayload),
    /// Pin, move or release one node.
    Drag {
        node_id: String,
        phase: DragPhase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
    /// Re-heat the simulation.
    Restart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alpha: Option<f64>,
    },
    /// Change the layout bounds.
    Resize { width: f64, height: f64 },
    /// Switch placement strategy.
    Layout {
        #[serde(rename = "type")]
        kind: LayoutKind,
    },
    /// Change parameters on a live session.
    Configure {
        #[serde(flatten)]
        overrides: ConfigOverrides,
    },
    /// Halt ticking immediately.
    Stop,
}

/// Payload of [`Command::Init`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitPayload {
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
    #[serde(default)]
    pub config: ConfigOverrides,
}

/// A node record as supplied by the data source.
///
/// Optional fields of the wrong type read as absent, so one bad record
/// field falls back to its default instead of rejecting the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    /// Initial position hint; the spiral seed is used unless both are set.
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub x: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub y: Option<f64>,
}

/// An edge record as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    pub source: String,
    pub target: String,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(Value::as_f64))
    }

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Start,
    Drag,
    End,
}

/// Placement strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Iterative force simulation.
    #[default]
    Force,
    Radial,
    Grid,
}

impl std::str::FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "force" => Ok(LayoutKind::Force),
            "radial" => Ok(LayoutKind::Radial),
            "grid" => Ok(LayoutKind::Grid),
            other => Err(format!("unknown layout: {} (expected force, radial or grid)", other)),
        }
    }
}

/// Simulation → host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Complete snapshot after a tick or a strategy switch.
    Tick(TickSnapshot),
    /// The simulation has come to rest.
    End,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub alpha: f64,
}

impl TickSnapshot {
    pub fn node(&self, id: &str) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: EdgeEndpoint,
    pub target: EdgeEndpoint,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEndpoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Parse one command from its JSON text.
pub fn decode_command(text: &str) -> Result<Command> {
    Ok(serde_json::from_str(text)?)
}

/// Render one event as a single line of JSON.
pub fn encode_event(event: &Event) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}
