//! Geometry shared between the graph model and the view.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point in logical layout space (not screen pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle in radians of the vector from `self` to `other` (`atan2(Δy, Δx)`).
    pub fn angle_to(&self, other: Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn midpoint(&self, other: Position) -> Position {
        Position {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Width and height of a layout area in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_angle() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert!((a.angle_to(b) - (4.0f64).atan2(3.0)).abs() < f64::EPSILON);
        assert_eq!(a.midpoint(b), Position::new(1.5, 2.0));
    }

    #[test]
    fn test_vertical_angle() {
        let top = Position::new(400.0, 200.0);
        let center = Position::new(400.0, 300.0);
        assert!((top.angle_to(center) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((center.angle_to(top) + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
