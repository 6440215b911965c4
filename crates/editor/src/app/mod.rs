pub(crate) mod bootstrap;
mod config;
mod editor;
pub(crate) mod loop_runner;
