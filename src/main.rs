mod capture;
mod config;
mod core;
mod error;
mod playback;
mod render;
mod service;
mod ui;

use anyhow::{anyhow, Context as _, Result};
use capture::{MockRecorder, Recorder};
use config::AppSettings;
use imgui::{Context, FontConfig, FontSource};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use playback::{SessionDriver, SessionEvent};
use service::{LocalService, TrajectoryService};
use ui::{PlaybackCanvas, SessionAction, SessionView, SessionWindow};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use glutin::prelude::*;
use glutin::display::GetGlDisplay;
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasRawWindowHandle;
use glow::HasContext;

use std::ffi::CString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct AppState {
    settings: AppSettings,
    service: Arc<dyn TrajectoryService>,
    view: SessionView,
    canvas: PlaybackCanvas,
    session_window: SessionWindow,
    // Driver channel of the last session and cancel flag while it runs
    events: Option<Receiver<SessionEvent>>,
    cancel: Option<Arc<AtomicBool>>,
    show_canvas: bool,
    show_controls: bool,
}

impl AppState {
    fn new(settings: AppSettings) -> Self {
        let storage_dir = settings.storage_dir();
        info!("Storing submissions under {}", storage_dir.display());

        let service = match settings.trajectory_seed {
            Some(seed) => {
                info!("Generating trajectories from seed {}", seed);
                LocalService::with_seed(storage_dir, seed)
            }
            None => LocalService::new(storage_dir),
        };

        Self {
            service: Arc::new(service),
            view: SessionView::default(),
            canvas: PlaybackCanvas::new(),
            session_window: SessionWindow::new(&settings.username),
            events: None,
            cancel: None,
            show_canvas: settings.show_canvas,
            show_controls: settings.show_controls,
            settings,
        }
    }

    fn save_settings(&mut self) {
        self.settings.username = self.session_window.username().to_string();
        self.settings.show_canvas = self.show_canvas;
        self.settings.show_controls = self.show_controls;
        if let Err(e) = self.settings.save() {
            warn!("Failed to save settings: {:#}", e);
        }
    }

    /// Start a new session; the previous trajectory is discarded
    fn start_session(&mut self, rt: &tokio::runtime::Runtime, username: String) {
        if self.cancel.is_some() {
            return;
        }

        let (tx, rx) = channel();
        let driver = SessionDriver::new(self.settings.playback_config(), self.service.clone(), tx);
        self.cancel = Some(driver.cancel_handle());
        self.events = Some(rx);
        self.view = SessionView::default();

        let mut recorder: Box<dyn Recorder> = Box::new(MockRecorder::new("camera"));
        info!("Starting session for {} with recorder {}", username, recorder.name());

        rt.spawn(async move {
            // Outcome is reported through the event channel
            let _ = driver.run(&username, recorder.as_mut()).await;
        });
    }

    fn cancel_session(&mut self) {
        if let Some(cancel) = &self.cancel {
            cancel.store(true, Ordering::SeqCst);
        }
    }

    /// Drain driver events (call each frame)
    fn process_events(&mut self) {
        let receiver = match &self.events {
            Some(r) => r,
            None => return,
        };

        for event in receiver.try_iter() {
            let ends_session = event.ends_session();
            self.view.apply(event);
            if ends_session {
                self.cancel = None;
            }
        }
    }
}

/// Prefer the config with the most multisampling
///
/// # Panics
///
/// The picker must return a config; `DisplayBuilder::build` has no way to
/// report an empty list through its result.
fn pick_gl_config(configs: Box<dyn Iterator<Item = glutin::config::Config> + '_>) -> glutin::config::Config {
    configs
        .reduce(|best, config| if config.num_samples() > best.num_samples() { config } else { best })
        .expect("display offers no GL config")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    let event_loop = EventLoop::new().context("Failed to create EventLoop")?;

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(
            WindowBuilder::new()
                .with_title("Pursuit - Trajectory Playback Recorder")
                .with_inner_size(winit::dpi::LogicalSize::new(1300.0, 800.0)),
        ))
        .build(&event_loop, glutin::config::ConfigTemplateBuilder::new(), pick_gl_config)
        .map_err(|e| anyhow!("Failed to create window and display: {}", e))?;

    let window = window.context("Failed to create window")?;
    let gl_display = gl_config.display();

    let context = unsafe {
        gl_display.create_context(
            &gl_config,
            &glutin::context::ContextAttributesBuilder::new().build(Some(window.raw_window_handle())),
        )
    }
    .context("Failed to create GL context")?;

    let attrs = window.build_surface_attributes(
        glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new(),
    );
    let surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
        .context("Failed to create surface")?;
    let context = context.make_current(&surface).context("Failed to make context current")?;

    let load_gl = |symbol: &str| {
        CString::new(symbol)
            .map(|s| gl_display.get_proc_address(&s))
            .unwrap_or(std::ptr::null())
    };

    // Renderer and clear pass each get a glow context over the same GL context
    let gl = unsafe { glow::Context::from_loader_function(load_gl) };
    let gl_clear = unsafe { glow::Context::from_loader_function(load_gl) };

    let mut imgui = Context::create();
    imgui.set_log_filename(None::<std::path::PathBuf>);
    let ini_path = dirs::config_dir().map(|p| p.join("pursuit").join("layout.ini"));
    if let Some(parent) = ini_path.as_ref().and_then(|p| p.parent()) {
        let _ = std::fs::create_dir_all(parent);
    }
    imgui.set_ini_filename(ini_path);

    let hidpi_factor = window.scale_factor();
    let font_size = (14.0 * hidpi_factor) as f32;
    imgui.fonts().add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            size_pixels: font_size,
            ..FontConfig::default()
        }),
    }]);
    imgui.io_mut().font_global_scale = (1.0 / hidpi_factor) as f32;

    let mut platform = WinitPlatform::init(&mut imgui);
    platform.attach_window(imgui.io_mut(), &window, HiDpiMode::Default);

    let mut renderer = imgui_glow_renderer::AutoRenderer::initialize(gl, &mut imgui)
        .map_err(|e| anyhow!("Failed to initialize renderer: {}", e))?;

    let mut state = AppState::new(AppSettings::load());
    let mut last_frame_time = Instant::now();

    event_loop.run(move |event, window_target| {
        match event {
            Event::NewEvents(_) => {
                let now = Instant::now();
                imgui.io_mut().update_delta_time(now - last_frame_time);
                last_frame_time = now;
            }
            Event::AboutToWait => {
                state.process_events();

                if let Err(e) = platform.prepare_frame(imgui.io_mut(), &window) {
                    error!("Failed to prepare frame: {}", e);
                }
                window.request_redraw();
            }
            Event::WindowEvent { event: WindowEvent::RedrawRequested, .. } => {
                let ui = imgui.new_frame();

                ui.main_menu_bar(|| {
                    ui.menu("File", || {
                        if ui.menu_item("Exit") {
                            state.cancel_session();
                            state.save_settings();
                            window_target.exit();
                        }
                    });
                    ui.menu("View", || {
                        ui.checkbox("Playback", &mut state.show_canvas);
                        ui.checkbox("Session", &mut state.show_controls);
                    });
                });

                if state.show_canvas {
                    state.canvas.render(ui, &mut state.show_canvas, &state.view);
                }

                if state.show_controls {
                    match state.session_window.render(ui, &mut state.show_controls, &state.view) {
                        SessionAction::Start { username } => state.start_session(&rt, username),
                        SessionAction::Cancel => state.cancel_session(),
                        SessionAction::None => {}
                    }
                }

                platform.prepare_render(ui, &window);
                let draw_data = imgui.render();

                unsafe {
                    gl_clear.clear_color(0.1, 0.1, 0.1, 1.0);
                    gl_clear.clear(glow::COLOR_BUFFER_BIT);
                }

                if let Err(e) = renderer.render(draw_data) {
                    error!("Rendering failed: {}", e);
                    window_target.exit();
                }
                if let Err(e) = surface.swap_buffers(&context) {
                    error!("Failed to swap buffers: {}", e);
                    window_target.exit();
                }
            }
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                state.cancel_session();
                state.save_settings();
                window_target.exit();
            }
            _ => {}
        }

        platform.handle_event(imgui.io_mut(), &window, &event);
    })?;

    Ok(())
}
