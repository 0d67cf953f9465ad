use crate::core::Trajectory;
use crate::playback::{SessionEvent, SessionPhase};
use crate::service::AnalysisReceipt;
use imgui::{Condition, Ui};
use std::sync::Arc;

/// UI-side mirror of the running session, fed by driver events
#[derive(Debug, Clone)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub trajectory: Option<Arc<Trajectory>>,
    pub fraction: f64,
    pub countdown: Option<u64>,
    pub receipt: Option<AnalysisReceipt>,
    pub error: Option<String>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            trajectory: None,
            fraction: 0.0,
            countdown: None,
            receipt: None,
            error: None,
        }
    }
}

impl SessionView {
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Phase(phase) => {
                self.phase = phase;
                if phase != SessionPhase::CountingDown {
                    self.countdown = None;
                }
            }
            SessionEvent::TrajectoryLoaded(trajectory) => {
                self.trajectory = Some(trajectory);
                self.fraction = 0.0;
            }
            SessionEvent::Countdown(remaining) => self.countdown = Some(remaining),
            SessionEvent::Frame(fraction) => self.fraction = fraction,
            SessionEvent::Submitted(receipt) => self.receipt = Some(receipt),
            SessionEvent::Failed(message) => self.error = Some(message),
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }
}

/// Action requested from the session window
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    None,
    Start { username: String },
    Cancel,
}

/// Participant entry, start/cancel buttons and session status
pub struct SessionWindow {
    username_input: String,
}

impl SessionWindow {
    pub fn new(username: &str) -> Self {
        Self { username_input: username.to_string() }
    }

    pub fn username(&self) -> &str {
        self.username_input.trim()
    }

    pub fn render(&mut self, ui: &Ui, is_open: &mut bool, view: &SessionView) -> SessionAction {
        let mut action = SessionAction::None;

        ui.window("Session")
            .size([320.0, 260.0], Condition::FirstUseEver)
            .position([940.0, 40.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                action = self.render_content(ui, view);
            });

        action
    }

    pub fn render_content(&mut self, ui: &Ui, view: &SessionView) -> SessionAction {
        let mut action = SessionAction::None;
        let active = view.is_active();

        ui.text("Participant:");
        {
            let _disabled = ui.begin_disabled(active);
            ui.input_text("##username", &mut self.username_input).build();
        }

        if active {
            // Recording has stopped once playback ends; the upload runs to completion
            let _disabled = ui.begin_disabled(!view.phase.is_cancellable());
            if ui.button("Cancel") {
                action = SessionAction::Cancel;
            }
        } else {
            let _disabled = ui.begin_disabled(self.username().is_empty());
            if ui.button("Start") {
                action = SessionAction::Start { username: self.username().to_string() };
            }
        }

        ui.separator();

        let status_color = match view.phase {
            SessionPhase::Failed => [1.0, 0.3, 0.3, 1.0],
            SessionPhase::Submitted => [0.3, 1.0, 0.4, 1.0],
            SessionPhase::Playing => [1.0, 0.2, 0.2, 1.0],
            _ => [0.8, 0.8, 0.8, 1.0],
        };
        ui.text_colored(status_color, view.phase.label());

        if let Some(remaining) = view.countdown {
            ui.same_line();
            ui.text(format!("({}s)", remaining));
        }

        self.draw_progress(ui, view.fraction as f32);

        if let Some(trajectory) = &view.trajectory {
            ui.text(format!("Trajectory: {} points", trajectory.len()));
        }

        if let Some(receipt) = &view.receipt {
            ui.text(format!("Client ID: {}", receipt.client_id));
            ui.text_wrapped(format!("Video: {}", receipt.video_url));
            ui.text_wrapped(format!("Trajectory: {}", receipt.trajectory_url));
        }

        if let Some(error) = &view.error {
            ui.text_colored([1.0, 0.3, 0.3, 1.0], "Error:");
            ui.text_wrapped(error);
        }

        action
    }

    fn draw_progress(&self, ui: &Ui, fraction: f32) {
        let width = ui.content_region_avail()[0];
        let height = 6.0;
        let pos_min = ui.cursor_screen_pos();
        let pos_max = [pos_min[0] + width, pos_min[1] + height];
        let draw_list = ui.get_window_draw_list();

        draw_list.add_rect(pos_min, pos_max, [0.25, 0.25, 0.28, 1.0]).filled(true).rounding(2.0).build();

        let fill_x = pos_min[0] + fraction.clamp(0.0, 1.0) * width;
        draw_list
            .add_rect(pos_min, [fill_x, pos_max[1]], [0.4, 0.6, 0.9, 1.0])
            .filled(true)
            .rounding(2.0)
            .build();

        ui.dummy([width, height]);
    }
}
