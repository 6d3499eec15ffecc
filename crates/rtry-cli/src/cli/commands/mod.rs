//! CLI command handlers, one per file.

mod completions;
mod config;
mod schedule;
mod simulate;

pub use completions::{run_completions, run_man};
pub use config::run_config;
pub use schedule::run_schedule;
pub use simulate::run_simulate;

#[cfg(test)]
pub(crate) use simulate::parse_outcomes;
