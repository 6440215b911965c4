mod console;
mod console_commands;

pub(crate) use console::{draw_console, ConsoleState};
pub(crate) use console_commands::ConsoleCommandProcessor;
