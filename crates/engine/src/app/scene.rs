use std::path::Path;

use super::geometry::PointPx;
use super::input::KeyStates;
use super::rendering::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input visible to one fixed tick.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    keys: KeyStates,
    fixed_dt_seconds: f32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(keys: KeyStates, fixed_dt_seconds: f32) -> Self {
        Self {
            keys,
            fixed_dt_seconds,
        }
    }

    pub fn keys(&self) -> &KeyStates {
        &self.keys
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.keys.is_down(key)
    }

    pub fn fixed_dt_seconds(&self) -> f32 {
        self.fixed_dt_seconds
    }

    pub fn with_key_down(mut self, key: &str, is_down: bool) -> Self {
        self.keys.set(key, is_down);
        self
    }

    pub fn with_fixed_dt_seconds(mut self, fixed_dt_seconds: f32) -> Self {
        self.fixed_dt_seconds = fixed_dt_seconds;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// Cursor left the framebuffer; carries the last known position.
    Leave,
}

/// Pointer activity in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: PointPx,
    pub button: Option<PointerButton>,
}

impl PointerEvent {
    pub fn down(position: PointPx) -> Self {
        Self {
            kind: PointerEventKind::Down,
            position,
            button: Some(PointerButton::Primary),
        }
    }

    pub fn moved(position: PointPx) -> Self {
        Self {
            kind: PointerEventKind::Move,
            position,
            button: None,
        }
    }

    pub fn up(position: PointPx) -> Self {
        Self {
            kind: PointerEventKind::Up,
            position,
            button: Some(PointerButton::Primary),
        }
    }

    pub fn leave(position: PointPx) -> Self {
        Self {
            kind: PointerEventKind::Leave,
            position,
            button: None,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn is_primary(&self) -> bool {
        matches!(self.button, Some(PointerButton::Primary))
    }
}

/// A console command a scene contributes on top of the built-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleCommandSpec {
    pub name: &'static str,
    /// Full usage line, command name included; empty falls back to the name.
    pub usage: &'static str,
    pub summary: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleReply {
    lines: Vec<String>,
    failed: bool,
}

impl ConsoleReply {
    pub fn ok(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            failed: false,
        }
    }

    pub fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            failed: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::errors(vec![message.into()])
    }

    /// One `error: ...` line per message.
    pub fn errors(messages: Vec<String>) -> Self {
        Self {
            lines: messages
                .into_iter()
                .map(|message| format!("error: {message}"))
                .collect(),
            failed: true,
        }
    }

    pub fn output(&self) -> &[String] {
        &self.lines
    }

    pub fn into_output(self) -> Vec<String> {
        self.lines
    }

    pub fn is_error(&self) -> bool {
        self.failed
    }
}

pub trait Scene {
    fn load(&mut self);
    /// One fixed tick.
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn handle_pointer(&mut self, event: PointerEvent);
    fn handle_file_dropped(&mut self, _path: &Path) {}
    /// Applies completed asynchronous work; returns true when it changed anything visible.
    fn poll_background_work(&mut self) -> bool {
        false
    }
    fn console_commands(&self) -> Vec<ConsoleCommandSpec> {
        Vec::new()
    }
    fn execute_console_command(&mut self, name: &str, _args: &[String]) -> ConsoleReply {
        ConsoleReply::error(format!("unknown command '{name}'"))
    }
    fn render(&mut self, surface: &mut Surface);
    fn needs_redraw(&self) -> bool;
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}
