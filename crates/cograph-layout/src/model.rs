//! Simulation state: nodes, active edges and the id lookup between them.

use std::collections::HashMap;

use crate::protocol::{EdgeInput, NodeInput};
use crate::{Position, Velocity};

const MIN_RADIUS: f64 = 6.0;
const MAX_RADIUS: f64 = 25.0;

/// Visual radius for a node of the given weight.
///
/// `clamp(sqrt(max(weight, 1)) * 4, 6, 25)`
pub fn node_radius(weight: f64) -> f64 {
    (weight.max(1.0).sqrt() * 4.0).clamp(MIN_RADIUS, MAX_RADIUS)
}

/// A node under simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique key within the session.
    pub id: String,
    pub label: String,
    /// Non-negative importance, e.g. interaction count.
    pub weight: f64,
    /// Derived from `weight` via [`node_radius`].
    pub radius: f64,
    pub position: Position,
    pub velocity: Velocity,
    /// Fixed coordinates while the host holds the node.
    pub pinned: Option<Position>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            weight,
            radius: node_radius(weight),
            position: Position::default(),
            velocity: Velocity::default(),
            pinned: None,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    /// Hold the node at `at`. Velocity is zeroed immediately.
    pub fn pin(&mut self, at: Position) {
        self.pinned = Some(at);
        self.position = at;
        self.velocity = Velocity::default();
    }

    pub fn unpin(&mut self) {
        self.pinned = None;
    }

    /// Re-assert the pin invariant: position equals the pin, velocity is zero.
    pub(crate) fn enforce_pin(&mut self) {
        if let Some(at) = self.pinned {
            self.position = at;
            self.velocity = Velocity::default();
        }
    }
}

/// An active edge between two nodes, by index into [`Graph::nodes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    /// Non-negative strength, e.g. co-occurrence count.
    pub weight: f64,
}

/// Nodes and active edges of one session.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl Graph {
    /// Build from host records.
    ///
    /// Missing labels default to the id, missing or invalid weights to 1.
    /// Duplicate ids keep their first occurrence. Edges whose endpoints are
    /// not both known are left out of the active set.
    ///
    /// Returns the graph together with any position hints that came with
    /// the node records, aligned with `nodes`.
    pub fn from_input(nodes: Vec<NodeInput>, edges: Vec<EdgeInput>) -> (Self, Vec<Option<Position>>) {
        let mut graph = Graph {
            nodes: Vec::with_capacity(nodes.len()),
            edges: Vec::with_capacity(edges.len()),
            index: HashMap::with_capacity(nodes.len()),
        };
        let mut hints = Vec::with_capacity(nodes.len());

        for input in nodes {
            if graph.index.contains_key(&input.id) {
                tracing::warn!("Dropping duplicate node id {:?}", input.id);
                continue;
            }
            let weight = sanitize_weight(input.weight);
            let label = input.label.unwrap_or_else(|| input.id.clone());
            hints.push(match (input.x, input.y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Position::new(x, y)),
                _ => None,
            });
            graph.index.insert(input.id.clone(), graph.nodes.len());
            graph.nodes.push(Node::new(input.id, label, weight));
        }

        let mut skipped = 0usize;
        for input in edges {
            match (graph.index.get(&input.source), graph.index.get(&input.target)) {
                (Some(&source), Some(&target)) => graph.edges.push(Edge {
                    source,
                    target,
                    weight: sanitize_weight(input.weight),
                }),
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!("Excluded {} edges with unknown endpoints", skipped);
        }

        (graph, hints)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the node with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let i = self.index_of(id)?;
        Some(&mut self.nodes[i])
    }

    /// `edge_count / node_count²`, zero for an empty graph.
    pub fn density(&self) -> f64 {
        let n = self.nodes.len() as f64;
        if n == 0.0 {
            0.0
        } else {
            self.edges.len() as f64 / (n * n)
        }
    }

    pub(crate) fn positions(&self) -> Vec<Position> {
        self.nodes.iter().map(|n| n.position).collect()
    }
}

fn sanitize_weight(weight: Option<f64>) -> f64 {
    weight.filter(|w| w.is_finite() && *w >= 0.0).unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> NodeInput {
        NodeInput {
            id: id.to_string(),
            ..Default::default()
        }
    }

    fn edge(source: &str, target: &str) -> EdgeInput {
        EdgeInput {
            source: source.to_string(),
            target: target.to_string(),
            weight: None,
        }
    }

    #[test]
    fn test_radius_clamps() {
        assert_eq!(node_radius(0.0), 6.0);
        assert_eq!(node_radius(1.0), 6.0);
        assert_eq!(node_radius(4.0), 8.0);
        assert_eq!(node_radius(1000.0), 25.0);
    }

    #[test]
    fn test_unknown_endpoints_are_excluded() {
        let (graph, _) = Graph::from_input(
            vec![node("A"), node("B")],
            vec![edge("A", "B"), edge("A", "Z")],
        );
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].source, 0);
        assert_eq!(graph.edges[0].target, 1);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let (graph, hints) = Graph::from_input(
            vec![NodeInput {
                id: "x".into(),
                weight: Some(f64::NAN),
                ..Default::default()
            }],
            vec![],
        );
        let n = &graph.nodes[0];
        assert_eq!(n.label, "x");
        assert_eq!(n.weight, 1.0);
        assert_eq!(hints, vec![None]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let (graph, _) = Graph::from_input(
            vec![
                NodeInput {
                    id: "a".into(),
                    weight: Some(3.0),
                    ..Default::default()
                },
                NodeInput {
                    id: "a".into(),
                    weight: Some(9.0),
                    ..Default::default()
                },
            ],
            vec![],
        );
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes[0].weight, 3.0);
    }

    #[test]
    fn test_pin_zeroes_velocity() {
        let mut n = Node::new("a", "a", 1.0);
        n.velocity = Velocity::new(3.0, -2.0);
        n.pin(Position::new(10.0, 20.0));
        assert!(n.velocity.is_zero());
        assert_eq!(n.position, Position::new(10.0, 20.0));
        n.unpin();
        assert!(!n.is_pinned());
    }
}
