use crate::core::{Point, Trajectory};

/// Uniform scale plus offset mapping trajectory space onto a surface
///
/// `screen.x = x * scale + offset[0]`, `screen.y = -y * scale + offset[1]`:
/// increasing y in data space moves up on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub scale: f64,
    pub offset: [f64; 2],
}

impl Layout {
    /// Fit the trajectory's bounding box into a `size` surface with
    /// `padding` pixels kept free on each side. `None` for an empty trajectory.
    pub fn fit(trajectory: &Trajectory, size: [f32; 2], padding: f32) -> Option<Self> {
        let bounds = trajectory.bounds()?;

        let width = (size[0] as f64 - 2.0 * padding as f64).max(0.0);
        let height = (size[1] as f64 - 2.0 * padding as f64).max(0.0);

        let scale = f64::min(
            width / non_zero_range(bounds.x_range()),
            height / non_zero_range(bounds.y_range()),
        );

        let mid = bounds.center();
        let offset = [
            size[0] as f64 / 2.0 - mid.x * scale,
            size[1] as f64 / 2.0 + mid.y * scale,
        ];

        Some(Self { scale, offset })
    }

    pub fn to_screen(&self, p: Point) -> [f32; 2] {
        [
            (p.x * self.scale + self.offset[0]) as f32,
            (-p.y * self.scale + self.offset[1]) as f32,
        ]
    }
}

/// A collapsed axis counts as one unit wide
fn non_zero_range(range: f64) -> f64 {
    if range == 0.0 {
        1.0
    } else {
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traj(coords: &[(f64, f64)]) -> Trajectory {
        coords.iter().map(|&c| Point::from(c)).collect()
    }

    #[test]
    fn test_scale_uses_tighter_axis() {
        // 4 wide, 1 tall on a 400x400 surface: x limits the scale
        let t = traj(&[(0.0, 0.0), (4.0, 1.0)]);
        let layout = Layout::fit(&t, [400.0, 400.0], 0.0).unwrap();
        assert_eq!(layout.scale, 100.0);
    }

    #[test]
    fn test_padding_shrinks_drawable_area() {
        let t = traj(&[(0.0, 0.0), (1.0, 1.0)]);
        let layout = Layout::fit(&t, [120.0, 120.0], 10.0).unwrap();
        assert_eq!(layout.scale, 100.0);
        assert_eq!(layout.to_screen(Point::new(0.0, 0.0)), [10.0, 110.0]);
        assert_eq!(layout.to_screen(Point::new(1.0, 1.0)), [110.0, 10.0]);
    }

    #[test]
    fn test_bounding_box_center_maps_to_surface_center() {
        let t = traj(&[(3.0, 7.0), (9.0, -1.0), (5.0, 2.0)]);
        let layout = Layout::fit(&t, [640.0, 480.0], 20.0).unwrap();
        assert_eq!(layout.to_screen(Point::new(6.0, 3.0)), [320.0, 240.0]);
    }

    #[test]
    fn test_zero_range_substitutes_one() {
        let t = traj(&[(1.0, 2.0), (1.0, 2.0)]);
        let layout = Layout::fit(&t, [300.0, 100.0], 0.0).unwrap();
        assert_eq!(layout.scale, 100.0);
        assert!(layout.scale.is_finite());
    }

    #[test]
    fn test_padding_larger_than_surface() {
        let t = traj(&[(0.0, 0.0), (1.0, 1.0)]);
        let layout = Layout::fit(&t, [10.0, 10.0], 50.0).unwrap();
        assert_eq!(layout.scale, 0.0);
        assert_eq!(layout.to_screen(Point::new(1.0, 1.0)), [5.0, 5.0]);
    }

    #[test]
    fn test_empty_trajectory_has_no_layout() {
        assert!(Layout::fit(&Trajectory::default(), [100.0, 100.0], 0.0).is_none());
    }
}
