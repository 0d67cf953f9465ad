use serde::{Deserialize, Serialize};

/// A 2-D coordinate in trajectory space (not pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`, componentwise
    pub fn lerp(&self, other: &Point, frac: f64) -> Point {
        Point {
            x: self.x * (1.0 - frac) + other.x * frac,
            y: self.y * (1.0 - frac) + other.y * frac,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(5.0, -2.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Point::new(3.0, 0.0));
    }

    #[test]
    fn test_point_json_shape() {
        let p: Point = serde_json::from_str(r#"{"x": 0.25, "y": -1}"#).unwrap();
        assert_eq!(p, Point::new(0.25, -1.0));
    }
}
