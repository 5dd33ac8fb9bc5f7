//! CLI-level errors (wraps settings and document errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::config::SettingsError;
use crate::exitcode;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: crate::Error },

    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: crate::Error },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Settings(SettingsError::Missing(_)) => exitcode::USAGE,
            CliError::Settings(SettingsError::Load(_)) => exitcode::CONFIG,
            CliError::Read { .. } => exitcode::NOINPUT,
            CliError::Parse { .. } => exitcode::DATAERR,
            CliError::Write { .. } => exitcode::CANTCREAT,
        }
    }

    /// Whether the usage line should be shown along with the error.
    pub fn is_usage(&self) -> bool {
        self.exit_code() == exitcode::USAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let missing = CliError::from(SettingsError::Missing("search"));
        assert_eq!(missing.exit_code(), exitcode::USAGE);
        assert!(missing.is_usage());

        let read = CliError::Read {
            path: PathBuf::from("sitemap.xml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(read.exit_code(), exitcode::NOINPUT);
        assert_eq!(read.to_string(), "cannot read sitemap.xml: gone");

        let parse = CliError::Parse {
            path: PathBuf::from("sitemap.xml"),
            source: crate::Error::MalformedXML("oops".into()),
        };
        assert_eq!(parse.exit_code(), exitcode::DATAERR);
        assert!(!parse.is_usage());
    }
}
