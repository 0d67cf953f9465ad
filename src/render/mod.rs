//! Path + marker rendering onto an abstract drawing surface

pub mod layout;

pub use layout::Layout;

use crate::core::{Point, Trajectory};

/// RGBA color, components in [0, 1]
pub type Color = [f32; 4];

/// Visual parameters for trajectory rendering
#[derive(Debug, Clone)]
pub struct RenderStyle {
    /// Space kept free on every side of the surface, in pixels
    pub padding: f32,
    pub line_width: f32,
    pub line_color: Color,
    pub marker_radius: f32,
    pub marker_color: Color,
    pub background: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            padding: 20.0,
            line_width: 2.0,
            line_color: [0.55, 0.6, 0.7, 1.0],
            marker_radius: 10.0,
            marker_color: [0.9, 0.25, 0.2, 1.0],
            background: [0.08, 0.08, 0.1, 1.0],
        }
    }
}

/// Drawing target for trajectory playback
///
/// Coordinates passed to the drawing calls are relative to the surface's
/// top-left corner, in pixels, with y growing downwards.
pub trait Surface {
    /// Width and height of the surface in pixels
    fn size(&self) -> [f32; 2];

    /// Fill the whole surface with the background color
    fn clear(&mut self, color: Color);

    /// Stroke a connected line through `points`
    fn stroke_polyline(&mut self, points: &[[f32; 2]], color: Color, width: f32);

    /// Draw a filled circle
    fn fill_circle(&mut self, center: [f32; 2], radius: f32, color: Color);
}

/// Render `trajectory` with the default style
pub fn render(surface: &mut dyn Surface, trajectory: &Trajectory, t: f64) {
    render_with_style(surface, trajectory, t, &RenderStyle::default());
}

/// Clear the surface, stroke the full path and draw the marker at the
/// position for `t`. Callers are expected to clamp `t` to [0, 1]; a
/// non-finite position draws no marker.
pub fn render_with_style(surface: &mut dyn Surface, trajectory: &Trajectory, t: f64, style: &RenderStyle) {
    surface.clear(style.background);

    let layout = match Layout::fit(trajectory, surface.size(), style.padding) {
        Some(layout) => layout,
        None => return,
    };

    if trajectory.len() > 1 {
        let path: Vec<[f32; 2]> = trajectory
            .points()
            .iter()
            .map(|p| layout.to_screen(*p))
            .collect();
        surface.stroke_polyline(&path, style.line_color, style.line_width);
    }

    if let Some(marker) = trajectory.position_at(t).filter(Point::is_finite) {
        surface.fill_circle(layout.to_screen(marker), style.marker_radius, style.marker_color);
    }
}
