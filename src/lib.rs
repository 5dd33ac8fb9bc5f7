//! Rewrite XML sitemaps as ordered document trees.
//!
//! A document is parsed into a [`Value`] tree of maps, lists and strings,
//! rewritten with [`replace_text`] and [`prune_tag`], and written back as xml.

pub mod cli;
pub mod config;
mod document;
mod error;
pub mod exitcode;
mod parser;
pub mod transform;
mod value;

pub use crate::document::{Document, WriteOptions};
pub use crate::error::{Error, Result};
pub use crate::parser::ReadOptions;
pub use crate::transform::{prune_tag, pruned, replace_text, replaced, Scrub, ScrubReport};
pub use crate::value::{Leaves, Map, Value};
