use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::cli::args::Cli;
use crate::cli::error::{CliError, CliResult};
use crate::config::Settings;
use crate::transform::{Scrub, ScrubReport};
use crate::{Document, Error};

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: ScrubReport,
}

/// Resolve settings from all layers, then scrub the input document into the output.
pub fn execute_command(cli: &Cli) -> CliResult<ScrubOutcome> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut settings, cli);
    // Missing search or replace fails here, before any file is touched.
    let scrub = settings.scrub()?;
    run(&settings, &scrub)
}

/// Command line arguments take precedence over every other layer.
pub fn apply_cli_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(search) = &cli.search {
        settings.search = Some(search.clone());
    }
    if let Some(replace) = &cli.replace {
        settings.replace = Some(replace.clone());
    }
    if let Some(input) = &cli.input {
        settings.input = input.clone();
    }
    if let Some(output) = &cli.output {
        settings.output = output.clone();
    }
    if cli.no_prune {
        settings.prune_tags.clear();
    } else if !cli.prune.is_empty() {
        settings.prune_tags = cli.prune.clone();
    }
    if let Some(indent) = cli.indent {
        settings.indent = indent;
    }
}

#[instrument(level = "debug", skip(settings, scrub), fields(input = %settings.input.display()))]
pub fn run(settings: &Settings, scrub: &Scrub) -> CliResult<ScrubOutcome> {
    let mut document = Document::parse_file(&settings.input).map_err(|e| match e {
        Error::Io(source) => CliError::Read {
            path: settings.input.clone(),
            source,
        },
        source => CliError::Parse {
            path: settings.input.clone(),
            source,
        },
    })?;
    debug!(root = ?document.root_element().map(|(name, _)| name), "document loaded");

    let report = scrub.apply_document(&mut document);

    document
        .write_file(&settings.output, &settings.write_options())
        .map_err(|source| CliError::Write {
            path: settings.output.clone(),
            source,
        })?;
    info!(output = %settings.output.display(), "document written");

    Ok(ScrubOutcome {
        input: settings.input.clone(),
        output: settings.output.clone(),
        report,
    })
}
