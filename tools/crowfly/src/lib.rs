//! crowfly command line tool: CSV loading, batch runs, search traces

pub mod batch;
pub mod cli;
pub mod loader;
pub mod logging;
pub mod report;
pub mod trace;

pub use cli::{exit_code, run, Cli, Commands};
