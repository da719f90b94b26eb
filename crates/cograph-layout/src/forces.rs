//! Force contributions for one tick.
//!
//! Five passes run in a fixed order: center, repulsion, links, collision,
//! boundary. All but collision produce velocity deltas; collision corrects
//! positions directly, using the positions as they stand before integration.
//! Pinned nodes still act on their neighbours but never receive a delta.

use crate::grid::SpatialGrid;
use crate::model::{Edge, Graph, Node};
use crate::params::SimulationParams;
use crate::{Position, Velocity};

/// Node count above which repulsion and collision use the spatial grid.
pub const PAIRWISE_THRESHOLD: usize = 500;

/// Width of the soft margin along each layout edge.
pub const BOUNDARY_PADDING: f64 = 50.0;

const BOUNDARY_STRENGTH: f64 = 0.1;
const COLLISION_STRENGTH: f64 = 0.5;

type Delta = (f64, f64);

/// Force computation over a fixed parameter set.
#[derive(Debug, Clone, Copy)]
pub struct ForceModel {
    params: SimulationParams,
}

impl ForceModel {
    pub fn new(params: SimulationParams) -> Self {
        Self { params }
    }

    /// Whether a graph of `node_count` nodes takes the grid path.
    pub fn uses_grid(node_count: usize) -> bool {
        node_count > PAIRWISE_THRESHOLD
    }

    /// Run every pass against `graph`, in order.
    pub fn apply(&self, graph: &mut Graph) {
        let grid = Self::uses_grid(graph.node_count())
            .then(|| SpatialGrid::build(&graph.positions()));
        let grid = grid.as_ref();

        let center = self.center(&graph.nodes);
        add_velocities(&mut graph.nodes, &center);
        let repulsion = self.repulsion(&graph.nodes, grid);
        add_velocities(&mut graph.nodes, &repulsion);
        let links = self.links(&graph.nodes, &graph.edges);
        add_velocities(&mut graph.nodes, &links);
        // Collision only moves nodes within a few radii, so the grid built
        // from pre-pass positions still covers every overlapping pair.
        let shifts = self.collision(&graph.nodes, grid);
        for (node, (dx, dy)) in graph.nodes.iter_mut().zip(shifts) {
            if !node.is_pinned() {
                node.position.x += dx;
                node.position.y += dy;
            }
        }
        let boundary = self.boundary(&graph.nodes);
        add_velocities(&mut graph.nodes, &boundary);
    }

    /// Pull toward the bounds center: `(center - position) * center_strength`.
    pub fn center(&self, nodes: &[Node]) -> Vec<Velocity> {
        let c = self.params.center();
        let k = self.params.center_strength;
        nodes
            .iter()
            .map(|n| Velocity::new((c.x - n.position.x) * k, (c.y - n.position.y) * k))
            .collect()
    }

    /// Inverse-square repulsion between node pairs, half to each endpoint.
    ///
    /// With `grid` set, each node only sees the nodes in its 5×5 cell
    /// neighbourhood; otherwise every unordered pair is visited.
    pub fn repulsion(&self, nodes: &[Node], grid: Option<&SpatialGrid>) -> Vec<Velocity> {
        let charge = self.params.charge_strength;
        let deltas = pairwise(nodes, grid, |i, a, j, b| {
            let (ux, uy, dist) = separation(i, &a.position, j, &b.position);
            let dist = dist.max(1.0);
            let mass = 1.0 + (a.weight * b.weight).sqrt() * 0.1;
            let f = charge * mass / (dist * dist) * 0.5;
            Some((ux * f, uy * f))
        });
        deltas.into_iter().map(|(x, y)| Velocity::new(x, y)).collect()
    }

    /// Hookean springs along edges toward `link_distance + weight * 5`.
    ///
    /// Both endpoints get the full `(dist - rest) * link_strength`, in
    /// opposite directions.
    pub fn links(&self, nodes: &[Node], edges: &[Edge]) -> Vec<Velocity> {
        let mut deltas = vec![Velocity::default(); nodes.len()];
        for edge in edges {
            if edge.source == edge.target {
                continue;
            }
            let a = &nodes[edge.source].position;
            let b = &nodes[edge.target].position;
            let (ux, uy, dist) = separation(edge.source, a, edge.target, b);
            let rest = self.params.link_distance + edge.weight * 5.0;
            let f = (dist - rest) * self.params.link_strength;
            deltas[edge.source].x += ux * f;
            deltas[edge.source].y += uy * f;
            deltas[edge.target].x -= ux * f;
            deltas[edge.target].y -= uy * f;
        }
        deltas
    }

    /// Position corrections separating overlapping circles.
    ///
    /// Each endpoint of an overlapping pair moves by half the overlap,
    /// scaled by 0.5, away from the other.
    pub fn collision(&self, nodes: &[Node], grid: Option<&SpatialGrid>) -> Vec<(f64, f64)> {
        let padding = self.params.collision_radius;
        pairwise(nodes, grid, |i, a, j, b| {
            let (ux, uy, dist) = separation(i, &a.position, j, &b.position);
            let min_dist = a.radius + b.radius + padding;
            if dist >= min_dist {
                return None;
            }
            let shift = (min_dist - dist) * 0.5 * COLLISION_STRENGTH;
            Some((-ux * shift, -uy * shift))
        })
    }

    /// Soft containment for nodes inside the margin along any layout edge.
    pub fn boundary(&self, nodes: &[Node]) -> Vec<Velocity> {
        let (w, h) = (self.params.width, self.params.height);
        nodes
            .iter()
            .map(|n| {
                Velocity::new(
                    push_inward(n.position.x, w),
                    push_inward(n.position.y, h),
                )
            })
            .collect()
    }
}

fn push_inward(coord: f64, extent: f64) -> f64 {
    let mut v = 0.0;
    if coord < BOUNDARY_PADDING {
        v += (BOUNDARY_PADDING - coord) * BOUNDARY_STRENGTH;
    }
    if coord > extent - BOUNDARY_PADDING {
        v -= (coord - (extent - BOUNDARY_PADDING)) * BOUNDARY_STRENGTH;
    }
    v
}

fn add_velocities(nodes: &mut [Node], deltas: &[Velocity]) {
    for (node, d) in nodes.iter_mut().zip(deltas) {
        if !node.is_pinned() {
            node.velocity.x += d.x;
            node.velocity.y += d.y;
        }
    }
}

/// Unit vector from node `i` toward node `j` and their distance.
///
/// Coincident nodes get a fixed axis direction whose sign depends on index
/// order, so `separation(i, j)` is always the negation of `separation(j, i)`.
fn separation(i: usize, a: &Position, j: usize, b: &Position) -> (f64, f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > f64::EPSILON {
        (dx / dist, dy / dist, dist)
    } else if i < j {
        (1.0, 0.0, 0.0)
    } else {
        (-1.0, 0.0, 0.0)
    }
}

/// Accumulate an antisymmetric pair contribution for every node.
///
/// `contribution(i, a, j, b)` is the delta node `i` receives from `j`; node
/// `j` receives its negation. The exact path visits each unordered pair
/// once, the grid path visits each ordered neighbour pair from both sides.
fn pairwise<F>(nodes: &[Node], grid: Option<&SpatialGrid>, contribution: F) -> Vec<Delta>
where
    F: Fn(usize, &Node, usize, &Node) -> Option<Delta>,
{
    let mut deltas = vec![(0.0, 0.0); nodes.len()];
    match grid {
        None => {
            for i in 0..nodes.len() {
                for j in (i + 1)..nodes.len() {
                    if let Some((dx, dy)) = contribution(i, &nodes[i], j, &nodes[j]) {
                        deltas[i].0 += dx;
                        deltas[i].1 += dy;
                        deltas[j].0 -= dx;
                        deltas[j].1 -= dy;
                    }
                }
            }
        }
        Some(grid) => {
            for (i, node) in nodes.iter().enumerate() {
                for j in grid.neighbors(&node.position) {
                    if j == i {
                        continue;
                    }
                    if let Some((dx, dy)) = contribution(i, node, j, &nodes[j]) {
                        deltas[i].0 += dx;
                        deltas[i].1 += dy;
                    }
                }
            }
        }
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_at(id: &str, x: f64, y: f64) -> Node {
        let mut n = Node::new(id, id, 1.0);
        n.position = Position::new(x, y);
        n
    }

    fn model() -> ForceModel {
        ForceModel::new(SimulationParams {
            width: 1000.0,
            height: 1000.0,
            ..SimulationParams::default()
        })
    }

    #[test]
    fn test_center_pulls_inward() {
        let nodes = vec![node_at("a", 100.0, 900.0)];
        let d = model().center(&nodes);
        assert!((d[0].x - 400.0 * 0.08).abs() < 1e-9);
        assert!((d[0].y + 400.0 * 0.08).abs() < 1e-9);
    }

    #[test]
    fn test_repulsion_pushes_apart() {
        let nodes = vec![node_at("a", 400.0, 500.0), node_at("b", 500.0, 500.0)];
        let d = model().repulsion(&nodes, None);
        assert!(d[0].x < 0.0);
        assert!(d[1].x > 0.0);
        assert!((d[0].x + d[1].x).abs() < 1e-12);
        // -400 * 1.1 / 100² / 2
        assert!((d[0].x + 0.022).abs() < 1e-12);
    }

    #[test]
    fn test_heavier_nodes_repel_more() {
        let light = vec![node_at("a", 0.0, 0.0), node_at("b", 100.0, 0.0)];
        let mut heavy = light.clone();
        heavy[0].weight = 16.0;
        heavy[1].weight = 16.0;
        let m = model();
        assert!(m.repulsion(&heavy, None)[0].x < m.repulsion(&light, None)[0].x);
    }

    #[test]
    fn test_coincident_nodes_use_nominal_distance() {
        let nodes = vec![node_at("a", 300.0, 300.0), node_at("b", 300.0, 300.0)];
        let d = model().repulsion(&nodes, None);
        assert!(d[0].x.is_finite() && d[1].x.is_finite());
        assert!(d[0].x < 0.0 && d[1].x > 0.0);

        let shifts = model().collision(&nodes, None);
        assert!(shifts[0].0 < 0.0 && shifts[1].0 > 0.0);
    }

    #[test]
    fn test_grid_matches_exact_for_compact_cluster() {
        let nodes: Vec<Node> = (0..40)
            .map(|i| node_at(&i.to_string(), 300.0 + (i % 7) as f64 * 20.0, 300.0 + (i / 7) as f64 * 25.0))
            .collect();
        let grid = SpatialGrid::build(&nodes.iter().map(|n| n.position).collect::<Vec<_>>());
        let m = model();
        let exact = m.repulsion(&nodes, None);
        let approx = m.repulsion(&nodes, Some(&grid));
        for (e, a) in exact.iter().zip(&approx) {
            assert!((e.x - a.x).abs() < 1e-9);
            assert!((e.y - a.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_link_spring_toward_rest_length() {
        let nodes = vec![node_at("a", 0.0, 0.0), node_at("b", 300.0, 0.0)];
        let edges = vec![Edge {
            source: 0,
            target: 1,
            weight: 2.0,
        }];
        // Stretched beyond 80 + 2 * 5: endpoints pulled together
        let d = model().links(&nodes, &edges);
        assert!(d[0].x > 0.0 && d[1].x < 0.0);

        let near = vec![node_at("a", 0.0, 0.0), node_at("b", 30.0, 0.0)];
        let d = model().links(&near, &edges);
        assert!(d[0].x < 0.0 && d[1].x > 0.0);
    }

    #[test]
    fn test_link_spring_magnitude() {
        let nodes = vec![node_at("a", 0.0, 0.0), node_at("b", 300.0, 0.0)];
        let edges = vec![Edge {
            source: 0,
            target: 1,
            weight: 2.0,
        }];
        // (300 - (80 + 2 * 5)) * 0.4 on each endpoint
        let d = model().links(&nodes, &edges);
        assert!((d[0].x - 84.0).abs() < 1e-9);
        assert!((d[1].x + 84.0).abs() < 1e-9);
        assert_eq!(d[0].y, 0.0);
    }

    #[test]
    fn test_apply_sums_every_pass() {
        let mut graph = Graph::default();
        graph.nodes = vec![node_at("a", 200.0, 500.0), node_at("b", 800.0, 500.0)];
        graph.edges = vec![Edge {
            source: 0,
            target: 1,
            weight: 0.0,
        }];
        let m = model();
        let center = m.center(&graph.nodes);
        let repulsion = m.repulsion(&graph.nodes, None);
        let links = m.links(&graph.nodes, &graph.edges);

        m.apply(&mut graph);
        let expected = center[0].x + repulsion[0].x + links[0].x;
        assert!((graph.nodes[0].velocity.x - expected).abs() < 1e-9);
        assert!((graph.nodes[0].velocity.x + graph.nodes[1].velocity.x).abs() < 1e-9);
    }

    #[test]
    fn test_collision_only_for_overlaps() {
        // radii 6 + 6 + 20 = 32
        let apart = vec![node_at("a", 0.0, 0.0), node_at("b", 40.0, 0.0)];
        assert_eq!(model().collision(&apart, None), vec![(0.0, 0.0); 2]);

        let close = vec![node_at("a", 0.0, 0.0), node_at("b", 12.0, 0.0)];
        let shifts = model().collision(&close, None);
        // overlap 20, each side moves 20 * 0.5 * 0.5
        assert!((shifts[0].0 + 5.0).abs() < 1e-12);
        assert!((shifts[1].0 - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_soft_clamp() {
        let nodes = vec![
            node_at("a", 10.0, 500.0),
            node_at("b", 500.0, 500.0),
            node_at("c", 980.0, 995.0),
        ];
        let d = model().boundary(&nodes);
        assert!((d[0].x - 4.0).abs() < 1e-12);
        assert_eq!(d[1], Velocity::default());
        assert!((d[2].x + 3.0).abs() < 1e-12);
        assert!((d[2].y + 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_pinned_node_receives_nothing() {
        let mut graph = Graph::default();
        graph.nodes = vec![node_at("a", 100.0, 100.0), node_at("b", 110.0, 100.0)];
        graph.nodes[0].pin(Position::new(100.0, 100.0));

        model().apply(&mut graph);
        assert!(graph.nodes[0].velocity.is_zero());
        assert_eq!(graph.nodes[0].position, Position::new(100.0, 100.0));
        // b is still pushed away by the pinned node
        assert!(graph.nodes[1].position.x > 110.0);
    }
}
