use crate::playback::SessionPhase;
use crate::render::{render, Color, RenderStyle, Surface};
use crate::ui::SessionView;
use imgui::{Condition, DrawListMut, Ui};

/// [`Surface`] backed by an imgui window draw list
///
/// Drawing coordinates are relative to `origin`, the screen position of the
/// canvas' top-left corner.
pub struct DrawListSurface<'a> {
    draw_list: &'a DrawListMut<'a>,
    origin: [f32; 2],
    size: [f32; 2],
}

impl<'a> DrawListSurface<'a> {
    pub fn new(draw_list: &'a DrawListMut<'a>, origin: [f32; 2], size: [f32; 2]) -> Self {
        Self { draw_list, origin, size }
    }

    fn to_screen(&self, p: [f32; 2]) -> [f32; 2] {
        [self.origin[0] + p[0], self.origin[1] + p[1]]
    }
}

impl Surface for DrawListSurface<'_> {
    fn size(&self) -> [f32; 2] {
        self.size
    }

    fn clear(&mut self, color: Color) {
        let max = [self.origin[0] + self.size[0], self.origin[1] + self.size[1]];
        self.draw_list.add_rect(self.origin, max, color).filled(true).build();
    }

    fn stroke_polyline(&mut self, points: &[[f32; 2]], color: Color, width: f32) {
        let points: Vec<[f32; 2]> = points.iter().map(|p| self.to_screen(*p)).collect();
        self.draw_list.add_polyline(points, color).thickness(width).build();
    }

    fn fill_circle(&mut self, center: [f32; 2], radius: f32, color: Color) {
        self.draw_list
            .add_circle(self.to_screen(center), radius, color)
            .filled(true)
            .num_segments(32)
            .build();
    }
}

/// Window showing the reference path and the moving marker
pub struct PlaybackCanvas {
    /// Fill used before a trajectory is loaded
    background: Color,
}

impl Default for PlaybackCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackCanvas {
    pub fn new() -> Self {
        Self { background: RenderStyle::default().background }
    }

    pub fn render(&mut self, ui: &Ui, is_open: &mut bool, view: &SessionView) {
        ui.window("Playback")
            .size([900.0, 700.0], Condition::FirstUseEver)
            .position([20.0, 40.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                self.render_content(ui, view);
            });
    }

    pub fn render_content(&mut self, ui: &Ui, view: &SessionView) {
        let size = ui.content_region_avail();
        if size[0] < 1.0 || size[1] < 1.0 {
            return;
        }

        let origin = ui.cursor_screen_pos();
        let draw_list = ui.get_window_draw_list();

        {
            let mut surface = DrawListSurface::new(&draw_list, origin, size);
            match &view.trajectory {
                Some(trajectory) => render(&mut surface, trajectory, view.fraction.clamp(0.0, 1.0)),
                None => surface.clear(self.background),
            }
        }

        if view.phase == SessionPhase::CountingDown {
            if let Some(remaining) = view.countdown {
                let center = [origin[0] + size[0] / 2.0, origin[1] + size[1] / 2.0];
                draw_list.add_text(center, [1.0, 1.0, 1.0, 0.9], remaining.to_string());
            }
        }

        ui.dummy(size);
    }
}
