//! Deterministic placements: the golden-angle seed and the non-iterative
//! radial and grid layouts.
//!
//! None of these look at prior velocities or forces. Radial and grid reset
//! velocities and release pins; the result depends only on node order and
//! weight.

use std::cmp::Reverse;
use std::f64::consts::PI;

use ordered_float::OrderedFloat;

use crate::model::Node;
use crate::params::SimulationParams;
use crate::{Position, Velocity};

/// Nodes per ring in the radial layout.
pub const RING_SIZE: usize = 8;

/// Margin kept clear on every side by the grid layout.
const GRID_MARGIN: f64 = 50.0;

/// Golden-angle spiral around the bounds center.
///
/// Node `i` sits at angle `i * π(3 − √5)` and radius
/// `spread * sqrt(i / n)`, where `spread = max(min(w, h) * 0.4, sqrt(n) * 30)`.
pub fn golden_spiral(count: usize, params: &SimulationParams) -> Vec<Position> {
    let n = count as f64;
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    let spread = (params.width.min(params.height) * 0.4).max(n.sqrt() * 30.0);
    let center = params.center();

    (0..count)
        .map(|i| {
            let angle = i as f64 * golden_angle;
            let r = spread * (i as f64 / n).sqrt();
            Position::new(center.x + r * angle.cos(), center.y + r * angle.sin())
        })
        .collect()
}

/// Concentric rings of [`RING_SIZE`], heaviest nodes innermost.
///
/// Rank `i` in a stable weight-descending order goes to ring `i / 8`, slot
/// `i % 8`, at radius `(ring + 1) * max_radius / ceil(n / 8)` and angle
/// `slot / 8 * 2π`, with `max_radius = min(w, h) * 0.45`.
pub fn radial_layout(nodes: &mut [Node], params: &SimulationParams) {
    if nodes.is_empty() {
        return;
    }

    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by_key(|&i| Reverse(OrderedFloat(nodes[i].weight)));

    let rings = nodes.len().div_ceil(RING_SIZE) as f64;
    let max_radius = params.width.min(params.height) * 0.45;
    let ring_spacing = max_radius / rings;
    let center = params.center();

    for (rank, &i) in order.iter().enumerate() {
        let ring = (rank / RING_SIZE) as f64;
        let slot = (rank % RING_SIZE) as f64;
        let r = (ring + 1.0) * ring_spacing;
        let angle = slot / RING_SIZE as f64 * 2.0 * PI;
        place(
            &mut nodes[i],
            Position::new(center.x + r * angle.cos(), center.y + r * angle.sin()),
        );
    }
}

/// Row-major grid of `ceil(sqrt(n))` columns inside the margined bounds,
/// each node centred in its cell.
pub fn grid_layout(nodes: &mut [Node], params: &SimulationParams) {
    if nodes.is_empty() {
        return;
    }

    let cols = (nodes.len() as f64).sqrt().ceil() as usize;
    let rows = nodes.len().div_ceil(cols);
    let cell_w = (params.width - 2.0 * GRID_MARGIN).max(0.0) / cols as f64;
    let cell_h = (params.height - 2.0 * GRID_MARGIN).max(0.0) / rows as f64;

    for (i, node) in nodes.iter_mut().enumerate() {
        let col = (i % cols) as f64;
        let row = (i / cols) as f64;
        place(
            node,
            Position::new(
                GRID_MARGIN + (col + 0.5) * cell_w,
                GRID_MARGIN + (row + 0.5) * cell_h,
            ),
        );
    }
}

fn place(node: &mut Node, at: Position) {
    node.position = at;
    node.velocity = Velocity::default();
    node.unpin();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimulationParams {
        SimulationParams {
            width: 1000.0,
            height: 800.0,
            ..SimulationParams::default()
        }
    }

    fn weighted(weights: &[f64]) -> Vec<Node> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Node::new(format!("n{i}"), format!("n{i}"), w))
            .collect()
    }

    #[test]
    fn test_spiral_first_node_at_center() {
        let positions = golden_spiral(50, &params());
        assert_eq!(positions[0], Position::new(500.0, 400.0));
        let spread = 800.0 * 0.4;
        for p in &positions {
            assert!(p.distance(&Position::new(500.0, 400.0)) <= spread + 1e-9);
        }
    }

    #[test]
    fn test_spiral_spread_grows_with_size() {
        // sqrt(2500) * 30 = 1500 exceeds min(w, h) * 0.4
        let positions = golden_spiral(2500, &params());
        let center = Position::new(500.0, 400.0);
        let farthest = positions
            .iter()
            .map(|p| p.distance(&center))
            .fold(0.0, f64::max);
        assert!(farthest > 1400.0 && farthest <= 1500.0);
    }

    #[test]
    fn test_radial_heaviest_innermost() {
        let mut nodes = weighted(&[1.0, 5.0, 3.0, 9.0, 2.0, 2.0, 7.0, 4.0, 6.0, 8.0]);
        radial_layout(&mut nodes, &params());

        let center = Position::new(500.0, 400.0);
        let inner = 360.0 / 2.0;
        // weight 9 has rank 0: ring 0, slot 0
        assert!((nodes[3].position.x - (500.0 + inner)).abs() < 1e-9);
        assert!((nodes[3].position.y - 400.0).abs() < 1e-9);
        // the tied pair keeps input order, so n5 and the lightest land outside
        assert!((nodes[4].position.distance(&center) - inner).abs() < 1e-9);
        assert!((nodes[5].position.distance(&center) - 360.0).abs() < 1e-9);
        assert!((nodes[0].position.distance(&center) - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_radial_ties_keep_order() {
        let mut nodes = weighted(&[2.0, 2.0]);
        radial_layout(&mut nodes, &params());
        // n0 keeps slot 0 (angle 0), n1 gets slot 1 (angle π/4)
        assert!(nodes[0].position.y == 400.0);
        assert!(nodes[1].position.y > 400.0);
    }

    #[test]
    fn test_grid_cells() {
        let mut nodes = weighted(&[1.0; 5]);
        nodes[2].pin(Position::new(1.0, 1.0));
        grid_layout(&mut nodes, &params());

        // 3 columns, 2 rows inside 900 x 700
        assert_eq!(nodes[0].position, Position::new(50.0 + 150.0, 50.0 + 175.0));
        assert_eq!(nodes[4].position, Position::new(50.0 + 450.0, 50.0 + 525.0));
        assert!(!nodes[2].is_pinned());
        assert!(nodes.iter().all(|n| n.velocity.is_zero()));
    }
}
