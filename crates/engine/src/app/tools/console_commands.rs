use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::app::{ConsoleCommandSpec, Scene};

use super::ConsoleState;

/// Commands the console answers itself before anything reaches the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Help,
    Clear,
    Echo,
    Quit,
}

impl Builtin {
    const ALL: [Builtin; 4] = [Builtin::Help, Builtin::Clear, Builtin::Echo, Builtin::Quit];

    fn name(self) -> &'static str {
        match self {
            Builtin::Help => "help",
            Builtin::Clear => "clear",
            Builtin::Echo => "echo",
            Builtin::Quit => "quit",
        }
    }

    fn usage(self) -> &'static str {
        match self {
            Builtin::Echo => "echo <text...>",
            other => other.name(),
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Builtin::Help => "List commands",
            Builtin::Clear => "Clear console output",
            Builtin::Echo => "Print text to console",
            Builtin::Quit => "Quit app",
        }
    }

    fn check_args(self, args: &[String]) -> Result<(), UsageError> {
        let reason = match (self, args.is_empty()) {
            (Builtin::Echo, true) => "missing required argument <text...>",
            (Builtin::Echo, false) | (_, true) => return Ok(()),
            (_, false) => "unexpected arguments",
        };
        Err(UsageError {
            reason,
            usage: self.usage(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error: {reason}. usage: {usage}")]
struct UsageError {
    reason: &'static str,
    usage: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum RegisterError {
    #[error("command name cannot be empty")]
    EmptyName,
    #[error("duplicate command registration: {0}")]
    Duplicate(String),
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Builtin(Builtin),
    Scene,
}

#[derive(Debug, Clone)]
struct CommandEntry {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
    target: Target,
}

impl CommandEntry {
    fn help_line(&self) -> String {
        if self.usage.is_empty() {
            format!("{} - {}", self.name, self.summary)
        } else {
            format!("{} - {}", self.usage, self.summary)
        }
    }
}

/// Registration order is help order; lookups ignore ASCII case.
#[derive(Debug, Default)]
struct CommandTable {
    entries: Vec<CommandEntry>,
    by_lower_name: HashMap<String, usize>,
}

impl CommandTable {
    fn with_builtins() -> Self {
        let mut table = Self::default();
        for builtin in Builtin::ALL {
            let entry = CommandEntry {
                name: builtin.name(),
                usage: builtin.usage(),
                summary: builtin.summary(),
                target: Target::Builtin(builtin),
            };
            if let Err(error) = table.insert(entry) {
                warn!(command = builtin.name(), error = %error, "console_builtin_rejected");
            }
        }
        table
    }

    fn insert(&mut self, entry: CommandEntry) -> Result<(), RegisterError> {
        if entry.name.trim().is_empty() {
            return Err(RegisterError::EmptyName);
        }
        let lower = entry.name.to_ascii_lowercase();
        if self.by_lower_name.contains_key(&lower) {
            return Err(RegisterError::Duplicate(entry.name.to_string()));
        }
        self.by_lower_name.insert(lower, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    fn insert_scene_command(&mut self, spec: &ConsoleCommandSpec) -> Result<(), RegisterError> {
        self.insert(CommandEntry {
            name: spec.name,
            usage: spec.usage,
            summary: spec.summary,
            target: Target::Scene,
        })
    }

    fn get(&self, name: &str) -> Option<&CommandEntry> {
        let index = self.by_lower_name.get(&name.to_ascii_lowercase())?;
        self.entries.get(*index)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ConsoleOutcome {
    pub(crate) quit_requested: bool,
    pub(crate) lines_processed: usize,
}

/// Turns submitted console lines into built-in actions or scene calls.
pub(crate) struct ConsoleCommandProcessor {
    table: CommandTable,
}

impl ConsoleCommandProcessor {
    pub(crate) fn with_scene_commands(specs: &[ConsoleCommandSpec]) -> Self {
        let mut table = CommandTable::with_builtins();
        for spec in specs {
            if let Err(error) = table.insert_scene_command(spec) {
                warn!(command = spec.name, error = %error, "console_command_rejected");
            }
        }
        Self { table }
    }

    pub(crate) fn process_pending_lines(
        &mut self,
        console: &mut ConsoleState,
        scene: &mut dyn Scene,
    ) -> ConsoleOutcome {
        let mut lines = Vec::new();
        console.drain_pending_lines_into(&mut lines);

        let mut outcome = ConsoleOutcome::default();
        for line in &lines {
            outcome.lines_processed += 1;
            outcome.quit_requested |= self.run_line(console, scene, line);
        }
        outcome
    }

    /// Returns true when the line asked the app to quit.
    fn run_line(&self, console: &mut ConsoleState, scene: &mut dyn Scene, line: &str) -> bool {
        let tokens = match tokenize_line(line.trim()) {
            Ok(tokens) => tokens,
            Err(error) => {
                console.append_output_line(format!("error: {error}. usage: help"));
                return false;
            }
        };
        let Some((name, args)) = tokens.split_first() else {
            return false;
        };
        let Some(entry) = self.table.get(name) else {
            console.append_output_line(format!("error: unknown command '{name}'. try: help"));
            return false;
        };

        match entry.target {
            Target::Scene => {
                let reply = scene.execute_console_command(entry.name, args);
                debug!(command = entry.name, failed = reply.is_error(), "console_command_executed");
                for output in reply.into_output() {
                    console.append_output_line(output);
                }
                false
            }
            Target::Builtin(builtin) => match builtin.check_args(args) {
                Ok(()) => self.run_builtin(console, builtin, args),
                Err(error) => {
                    console.append_output_line(error.to_string());
                    false
                }
            },
        }
    }

    fn run_builtin(&self, console: &mut ConsoleState, builtin: Builtin, args: &[String]) -> bool {
        match builtin {
            Builtin::Help => {
                for entry in &self.table.entries {
                    console.append_output_line(entry.help_line());
                }
            }
            Builtin::Clear => console.clear_output_lines(),
            Builtin::Echo => console.append_output_line(args.join(" ")),
            Builtin::Quit => return true,
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unterminated quoted string")]
pub(crate) struct UnterminatedQuote;

/// Splits on whitespace; double quotes group words and may produce empty tokens.
pub(crate) fn tokenize_line(line: &str) -> Result<Vec<String>, UnterminatedQuote> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;
    let mut quoted = false;

    for ch in line.chars() {
        if ch == '"' {
            quoted = !quoted;
            if current.is_none() {
                current = Some(String::new());
            }
        } else if ch.is_whitespace() && !quoted {
            tokens.extend(current.take());
        } else {
            current.get_or_insert_with(String::new).push(ch);
        }
    }

    if quoted {
        return Err(UnterminatedQuote);
    }
    tokens.extend(current);
    Ok(tokens)
}
