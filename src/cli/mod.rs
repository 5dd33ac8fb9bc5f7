//! Command line front end: argument definitions, errors and the scrub command.

pub mod args;
pub mod commands;
pub mod error;

pub use args::Cli;
pub use commands::{execute_command, ScrubOutcome};
pub use error::{CliError, CliResult};
