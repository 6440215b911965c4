use std::collections::VecDeque;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::app::geometry::{PointPx, Rect};
use crate::app::rendering::{line_advance_px, Surface};

const TEXT_SCALE: i32 = 2;
const PADDING_PX: i32 = 4 * TEXT_SCALE;
const BACKGROUND: [u8; 4] = [16, 16, 18, 255];
const TEXT_COLOR: [u8; 4] = [210, 230, 210, 255];
const ERROR_COLOR: [u8; 4] = [240, 120, 110, 255];
const PROMPT: &str = "> ";
const VISIBLE_OUTPUT_LINES: usize = 12;

pub(crate) const MAX_HISTORY_LINES: usize = 64;
pub(crate) const MAX_OUTPUT_LINES: usize = 256;
pub(crate) const MAX_PENDING_LINES: usize = 64;
pub(crate) const MAX_INPUT_CHARS: usize = 256;

/// Submitted lines plus the up/down recall cursor. The draft is whatever was
/// typed before recall started; stepping past the newest entry restores it.
#[derive(Debug, Default)]
struct LineHistory {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    draft: Option<String>,
}

impl LineHistory {
    fn record(&mut self, line: &str) {
        if !line.trim().is_empty() {
            push_bounded(&mut self.entries, line.to_string(), MAX_HISTORY_LINES);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.cursor = None;
        self.draft = None;
    }

    fn older(&mut self, current: &str) -> Option<String> {
        let newest = self.entries.len().checked_sub(1)?;
        let index = match self.cursor {
            Some(index) => index.saturating_sub(1),
            None => {
                self.draft = Some(current.to_string());
                newest
            }
        };
        self.cursor = Some(index);
        self.entries.get(index).cloned()
    }

    fn newer(&mut self) -> Option<String> {
        let index = self.cursor? + 1;
        if index < self.entries.len() {
            self.cursor = Some(index);
            return self.entries.get(index).cloned();
        }
        self.cursor = None;
        Some(self.draft.take().unwrap_or_default())
    }
}

/// Text console overlay: one input line, recall history, scrollback, and the
/// queue of submitted lines waiting for the command processor.
#[derive(Debug, Default)]
pub(crate) struct ConsoleState {
    is_open: bool,
    input: String,
    history: LineHistory,
    output: VecDeque<String>,
    pending: VecDeque<String>,
}

impl ConsoleState {
    pub(crate) fn is_open(&self) -> bool {
        self.is_open
    }

    pub(crate) fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
        self.reset_input();
    }

    pub(crate) fn handle_key_event(&mut self, key_event: &KeyEvent) {
        if !self.is_open || key_event.state != ElementState::Pressed {
            return;
        }
        let consumed = match key_event.physical_key {
            PhysicalKey::Code(code) => self.apply_editing_key(code),
            _ => false,
        };
        if !consumed {
            if let Some(text) = key_event.text.as_ref() {
                self.append_printable_text(text);
            }
        }
    }

    pub(crate) fn output_lines(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.output.iter().map(String::as_str)
    }

    pub(crate) fn current_line(&self) -> &str {
        &self.input
    }

    pub(crate) fn append_output_line(&mut self, line: impl Into<String>) {
        push_bounded(&mut self.output, line.into(), MAX_OUTPUT_LINES);
    }

    pub(crate) fn clear_output_lines(&mut self) {
        self.output.clear();
    }

    pub(crate) fn drain_pending_lines_into(&mut self, out: &mut Vec<String>) {
        out.extend(self.pending.drain(..));
    }

    pub(crate) fn append_printable_text(&mut self, text: &str) {
        let room = MAX_INPUT_CHARS.saturating_sub(self.input.chars().count());
        self.input
            .extend(text.chars().filter(|ch| !ch.is_control()).take(room));
    }

    /// Echoes the input line into the scrollback and queues it for execution.
    pub(crate) fn submit_current_line(&mut self) {
        let line = std::mem::take(&mut self.input);
        self.history.record(&line);
        self.append_output_line(format!("{PROMPT}{line}"));
        push_bounded(&mut self.pending, line, MAX_PENDING_LINES);
    }

    /// Returns true when `code` edited the line and must not also be typed.
    fn apply_editing_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter | KeyCode::NumpadEnter => self.submit_current_line(),
            KeyCode::Escape => {
                self.is_open = false;
                self.reset_input();
            }
            KeyCode::ArrowUp => {
                if let Some(line) = self.history.older(&self.input) {
                    self.input = line;
                }
            }
            KeyCode::ArrowDown => {
                if let Some(line) = self.history.newer() {
                    self.input = line;
                }
            }
            _ => return false,
        }
        true
    }

    fn reset_input(&mut self) {
        self.input.clear();
        self.history.reset();
    }
}

fn push_bounded(queue: &mut VecDeque<String>, value: String, max_len: usize) {
    while queue.len() >= max_len {
        queue.pop_front();
    }
    queue.push_back(value);
}

/// Docks the console to the bottom of `surface`: scrollback above, prompt last.
pub(crate) fn draw_console(surface: &mut Surface, state: &ConsoleState) {
    if !state.is_open() || surface.width() == 0 || surface.height() == 0 {
        return;
    }

    let line_height = line_advance_px(TEXT_SCALE);
    let height = surface.height() as i32;
    let room = ((height - 2 * PADDING_PX - line_height) / line_height).max(0) as usize;
    let visible = state.output.len().min(room).min(VISIBLE_OUTPUT_LINES);

    let panel_height = (visible as i32 + 1) * line_height + 2 * PADDING_PX;
    surface.fill_rect(
        Rect::new(
            0,
            (height - panel_height).max(0),
            surface.width() as i32,
            panel_height,
        ),
        BACKGROUND,
    );

    let prompt_y = height - PADDING_PX - line_height;
    let prompt = format!("{PROMPT}{}", state.current_line());
    surface.draw_text(PointPx::new(PADDING_PX, prompt_y), &prompt, TEXT_SCALE, TEXT_COLOR);

    let newest_first = state.output_lines().rev().take(visible);
    for (row, line) in newest_first.enumerate() {
        let color = if line.starts_with("error:") {
            ERROR_COLOR
        } else {
            TEXT_COLOR
        };
        let y = prompt_y - (row as i32 + 1) * line_height;
        surface.draw_text(PointPx::new(PADDING_PX, y), line, TEXT_SCALE, color);
    }
}
