use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::geometry::PointPx;
use super::input::{key_name, KeyStates};
use super::metrics::{LoopMetricsSnapshot, MetricsAccumulator};
use super::scheduler::TickScheduler;
use super::tools::{draw_console, ConsoleCommandProcessor, ConsoleState};
use super::{
    InputSnapshot, PointerButton, PointerEvent, Renderer, Scene, SceneCommand, Surface,
};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    /// Framebuffer size; the scene draws into a surface of exactly this size.
    pub framebuffer_width: u32,
    pub framebuffer_height: u32,
    pub target_tps: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Scene Editor".to_string(),
            framebuffer_width: 1280,
            framebuffer_height: 720,
            target_tps: 60,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.framebuffer_width as f64,
                config.framebuffer_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(
        Arc::clone(&window),
        config.framebuffer_width,
        config.framebuffer_height,
    )
    .map_err(AppError::CreateRenderer)?;

    let start = Instant::now();
    let mut runtime = LoopRuntime::new(scene, &config, start);
    runtime.start();
    info!(
        target_tps = config.target_tps.max(1),
        framebuffer_width = config.framebuffer_width,
        framebuffer_height = config.framebuffer_height,
        metrics_log_interval_ms = config.metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let base_title = config.window_title.clone();
    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(focused) => {
                    debug!(focused, "window_focus_changed");
                }
                WindowEvent::CursorMoved { position, .. } => {
                    runtime.handle_cursor_moved(renderer.window_to_framebuffer(position.x, position.y));
                }
                WindowEvent::CursorLeft { .. } => {
                    runtime.handle_cursor_left();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    runtime.handle_mouse_input(button, state);
                }
                WindowEvent::DroppedFile(path) => {
                    runtime.handle_file_dropped(&path);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    runtime.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    let render_start = Instant::now();
                    let surface = runtime.render_frame();
                    if let Err(error) = renderer.present(surface) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    runtime.record_frame(render_start.elapsed());
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                if runtime.poll(now) {
                    window.request_redraw();
                }
                if let Some(snapshot) = runtime.take_metrics(now) {
                    info!(
                        fps = snapshot.fps,
                        tps = snapshot.tps,
                        frame_time_ms = snapshot.frame_time_ms,
                        slipped_ticks = snapshot.slipped_ticks,
                        "loop_metrics"
                    );
                    let title = runtime.title_or(&base_title);
                    window.set_title(&format!("{title} | {}", snapshot.title_suffix()));
                }
                if runtime.quit_requested() {
                    window_target.exit();
                    return;
                }
                window_target.set_control_flow(match runtime.deadline() {
                    Some(deadline) => ControlFlow::WaitUntil(deadline),
                    None => ControlFlow::Wait,
                });
            }
            Event::LoopExiting => {
                runtime.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyRoute {
    Handled,
    Console,
}

/// Everything the event loop drives, minus the window and framebuffer.
struct LoopRuntime {
    scene: Box<dyn Scene>,
    keys: KeyStates,
    console: ConsoleState,
    commands: ConsoleCommandProcessor,
    scheduler: TickScheduler,
    metrics: MetricsAccumulator,
    surface: Surface,
    last_pointer: Option<PointPx>,
    fixed_dt_seconds: f32,
    console_dirty: bool,
    quit_requested: bool,
    is_loaded: bool,
}

impl LoopRuntime {
    fn new(scene: Box<dyn Scene>, config: &LoopConfig, start: Instant) -> Self {
        let scheduler = TickScheduler::from_rate(config.target_tps, start);
        let commands = ConsoleCommandProcessor::with_scene_commands(&scene.console_commands());
        Self {
            fixed_dt_seconds: scheduler.period().as_secs_f32(),
            scene,
            keys: KeyStates::default(),
            console: ConsoleState::default(),
            commands,
            scheduler,
            metrics: MetricsAccumulator::new(
                normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1)),
                start,
            ),
            surface: Surface::new(config.framebuffer_width, config.framebuffer_height),
            last_pointer: None,
            console_dirty: true,
            quit_requested: false,
            is_loaded: false,
        }
    }

    fn start(&mut self) {
        self.scene.load();
        self.is_loaded = true;
        info!("scene_loaded");
    }

    fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    fn handle_keyboard_input(&mut self, event: &KeyEvent) {
        let is_pressed = event.state == ElementState::Pressed;
        let route = self.route_key(event.physical_key, key_name(&event.logical_key), is_pressed);
        if route == KeyRoute::Console {
            self.console.handle_key_event(event);
            self.console_dirty = true;
            self.process_console();
        }
    }

    fn route_key(&mut self, physical: PhysicalKey, name: Option<String>, is_pressed: bool) -> KeyRoute {
        if is_pressed && physical == PhysicalKey::Code(KeyCode::Backquote) {
            self.console.toggle_open();
            self.console_dirty = true;
            info!(open = self.console.is_open(), "console_toggled");
            return KeyRoute::Handled;
        }

        if self.console.is_open() {
            if is_pressed {
                return KeyRoute::Console;
            }
            if let Some(name) = name {
                self.keys.set(&name, false);
            }
            return KeyRoute::Handled;
        }

        if is_pressed && physical == PhysicalKey::Code(KeyCode::Escape) {
            info!(reason = "escape_key", "shutdown_requested");
            self.quit_requested = true;
            return KeyRoute::Handled;
        }

        if let Some(name) = name {
            self.keys.set(&name, is_pressed);
        }
        KeyRoute::Handled
    }

    fn process_console(&mut self) {
        let outcome = self
            .commands
            .process_pending_lines(&mut self.console, self.scene.as_mut());
        if outcome.lines_processed > 0 {
            self.console_dirty = true;
        }
        if outcome.quit_requested {
            info!(reason = "console_quit", "shutdown_requested");
            self.quit_requested = true;
        }
    }

    fn handle_cursor_moved(&mut self, position: Option<PointPx>) {
        match position {
            Some(position) => {
                self.last_pointer = Some(position);
                self.scene.handle_pointer(PointerEvent::moved(position));
            }
            None => self.handle_cursor_left(),
        }
    }

    fn handle_cursor_left(&mut self) {
        if let Some(last) = self.last_pointer.take() {
            self.scene.handle_pointer(PointerEvent::leave(last));
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        let Some(position) = self.last_pointer else {
            return;
        };
        let button = match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
            _ => return,
        };
        let event = match state {
            ElementState::Pressed => PointerEvent::down(position),
            ElementState::Released => PointerEvent::up(position),
        };
        self.scene.handle_pointer(event.with_button(button));
    }

    fn handle_file_dropped(&mut self, path: &Path) {
        info!(path = %path.display(), "file_dropped");
        self.scene.handle_file_dropped(path);
    }

    /// Runs background completions and at most one due tick; returns whether a
    /// redraw is needed.
    fn poll(&mut self, now: Instant) -> bool {
        self.scene.poll_background_work();

        if self.scheduler.poll(now) {
            let snapshot = InputSnapshot::new(self.keys.clone(), self.fixed_dt_seconds);
            let command = self.scene.update(&snapshot);
            let finished_at = Instant::now();
            self.metrics.record_tick(
                finished_at.saturating_duration_since(now),
                self.scheduler.period(),
            );
            self.scheduler.rearm_after(finished_at);
            if command == SceneCommand::Quit {
                info!(reason = "scene_quit", "shutdown_requested");
                self.quit_requested = true;
            }
        }

        self.console_dirty || self.scene.needs_redraw()
    }

    fn render_frame(&mut self) -> &Surface {
        self.scene.render(&mut self.surface);
        draw_console(&mut self.surface, &self.console);
        self.console_dirty = false;
        &self.surface
    }

    fn record_frame(&mut self, frame_time: Duration) {
        self.metrics.record_frame(frame_time);
    }

    fn take_metrics(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        self.metrics.maybe_snapshot(now)
    }

    fn title_or(&self, fallback: &str) -> String {
        self.scene
            .debug_title()
            .unwrap_or_else(|| fallback.to_string())
    }

    fn shutdown(&mut self) {
        self.scheduler.cancel();
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
