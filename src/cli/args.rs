//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

/// Replace text and prune tags in an XML sitemap
#[derive(Parser, Debug)]
#[command(name = "sitemap-scrub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Literal text to search for
    pub search: Option<String>,

    /// Replacement text
    pub replace: Option<String>,

    /// Source document [default: sitemap.xml]
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Destination document [default: output.xml]
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Tag to prune, repeatable; replaces the configured tags
    #[arg(short, long = "prune", value_name = "TAG")]
    pub prune: Vec<String>,

    /// Do not prune any tag
    #[arg(long, conflicts_with = "prune")]
    pub no_prune: bool,

    /// TOML configuration file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output indentation width, 0 for a single line
    #[arg(long, value_name = "N")]
    pub indent: Option<usize>,

    /// Enable debug logging (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,
}
