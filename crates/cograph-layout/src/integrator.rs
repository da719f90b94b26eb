//! Cooling schedule and velocity integration.

use crate::model::Node;

/// Simulation temperature.
///
/// `alpha` relaxes exponentially toward `alpha_target`; it is only ever
/// set outright by [`Cooling::reheat`] and [`Cooling::freeze`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooling {
    alpha: f64,
    alpha_target: f64,
}

impl Default for Cooling {
    fn default() -> Self {
        Self::frozen()
    }
}

impl Cooling {
    /// Fully heated, cooling toward zero.
    pub fn hot() -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
        }
    }

    /// At rest.
    pub fn frozen() -> Self {
        Self {
            alpha: 0.0,
            alpha_target: 0.0,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_target(&mut self, target: f64) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    /// Reset alpha to `alpha` (clamped to [0, 1]) and aim for zero.
    pub fn reheat(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.alpha_target = 0.0;
    }

    pub fn freeze(&mut self) {
        *self = Self::frozen();
    }

    /// Relax one tick: `alpha += (alpha_target - alpha) * alpha_decay`.
    pub fn step(&mut self, alpha_decay: f64) -> f64 {
        self.alpha += (self.alpha_target - self.alpha) * alpha_decay;
        self.alpha
    }

    pub fn is_settled(&self, alpha_min: f64) -> bool {
        self.alpha < alpha_min
    }
}

/// Advance positions from accumulated velocities.
///
/// Free nodes: `velocity *= velocity_decay; position += velocity * alpha`.
/// Pinned nodes snap to their pin with zero velocity.
pub fn integrate(nodes: &mut [Node], velocity_decay: f64, alpha: f64) {
    for node in nodes {
        if node.is_pinned() {
            node.enforce_pin();
            continue;
        }
        node.velocity.x *= velocity_decay;
        node.velocity.y *= velocity_decay;
        node.position.x += node.velocity.x * alpha;
        node.position.y += node.velocity.y * alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, Velocity};

    #[test]
    fn test_cooling_is_monotone_and_terminates() {
        let mut cooling = Cooling::hot();
        let mut previous = cooling.alpha();
        let mut ticks = 0;
        while !cooling.is_settled(0.001) {
            let alpha = cooling.step(0.01);
            assert!(alpha <= previous);
            previous = alpha;
            ticks += 1;
            assert!(ticks < 1000);
        }
        // 0.99^n < 0.001 first holds at n = 688
        assert_eq!(ticks, 688);
    }

    #[test]
    fn test_target_warms_a_cold_simulation() {
        let mut cooling = Cooling::frozen();
        cooling.set_target(0.3);
        let alpha = cooling.step(0.01);
        assert!((alpha - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_reheat_clamps() {
        let mut cooling = Cooling::frozen();
        cooling.reheat(4.0);
        assert_eq!(cooling.alpha(), 1.0);
        cooling.reheat(0.25);
        assert_eq!(cooling.alpha(), 0.25);
        assert_eq!(cooling.alpha_target(), 0.0);
    }

    #[test]
    fn test_integrate_free_and_pinned() {
        let mut free = Node::new("a", "a", 1.0);
        free.velocity = Velocity::new(10.0, -5.0);
        let mut held = Node::new("b", "b", 1.0);
        held.pin(Position::new(7.0, 8.0));
        held.position = Position::new(0.0, 0.0);
        held.velocity = Velocity::new(1.0, 1.0);

        let mut nodes = vec![free, held];
        integrate(&mut nodes, 0.6, 0.5);

        assert_eq!(nodes[0].velocity, Velocity::new(6.0, -3.0));
        assert_eq!(nodes[0].position, Position::new(3.0, -1.5));
        assert_eq!(nodes[1].position, Position::new(7.0, 8.0));
        assert!(nodes[1].velocity.is_zero());
    }
}
