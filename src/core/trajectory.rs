use serde::{Deserialize, Serialize};
use crate::core::Point;

/// Ordered sequence of points; insertion order is playback order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    points: Vec<Point>,
}

/// Axis-aligned bounding box of a trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn x_range(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn y_range(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

impl Trajectory {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Interpolated position for playback fraction `t`
    pub fn position_at(&self, t: f64) -> Option<Point> {
        position_at(&self.points, t)
    }

    /// Bounding box over all points, `None` when empty
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let init = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(self.points.iter().skip(1).fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            max_x: b.max_x.max(p.x),
            min_y: b.min_y.min(p.y),
            max_y: b.max_y.max(p.y),
        }))
    }
}

impl From<Vec<Point>> for Trajectory {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<Point> for Trajectory {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Map `t` onto the virtual index `t * (N-1)` and interpolate between the
/// two neighbouring points.
///
/// `t` is not clamped. Outside `[0, 1]` the first or last segment is
/// extended, so the result is a linear extrapolation rather than a panic.
pub fn position_at(points: &[Point], t: f64) -> Option<Point> {
    let n = points.len();
    match n {
        0 => None,
        1 => Some(points[0]),
        _ => {
            let last = n - 1;
            let idx = t * last as f64;
            // Keep i on a real segment start: [0, N-2]
            let i = if idx.is_nan() {
                0
            } else {
                (idx.floor().max(0.0) as usize).min(last - 1)
            };
            let j = (i + 1).min(last);
            let frac = idx - i as f64;
            Some(points[i].lerp(&points[j], frac))
        }
    }
}
