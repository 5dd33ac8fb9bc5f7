//! Tree rewrites applied to a parsed document.
//!
//! Both transformations mutate a tree they exclusively borrow and never fail.
//! [`Scrub`] runs them in a fixed order: text replacement first, then one
//! pruning pass per tag name.

use crate::document::Document;
use crate::value::Value;
use tracing::{debug, info};

/// Default tags removed from sitemaps: image metadata and Google PageMap blocks.
pub const DEFAULT_PRUNE_TAGS: [&str; 2] = ["image:image", "PageMap"];

/// Remove every entry keyed `tag` from all mapping nodes of `tree`, at any depth.
///
/// Removed subtrees are not descended into. Key order of the remaining
/// entries is kept. Returns the number of entries removed.
pub fn prune_tag(tree: &mut Value, tag: &str) -> usize {
    match tree {
        Value::Text(_) => 0,
        Value::Map(map) => {
            let mut removed = usize::from(map.shift_remove(tag).is_some());
            for child in map.values_mut() {
                removed += prune_tag(child, tag);
            }
            removed
        }
        Value::List(list) => list.iter_mut().map(|child| prune_tag(child, tag)).sum(),
    }
}

/// By-value form of [`prune_tag`].
pub fn pruned(mut tree: Value, tag: &str) -> Value {
    prune_tag(&mut tree, tag);
    tree
}

/// Replace all non-overlapping occurrences of `search` with `replace` in every
/// string leaf of `tree`, scanning left to right.
///
/// `search` is literal text. An empty `search` leaves the tree untouched.
/// Map keys are never rewritten. Returns the number of leaves that changed.
pub fn replace_text(tree: &mut Value, search: &str, replace: &str) -> usize {
    if search.is_empty() || search == replace {
        return 0;
    }
    replace_in(tree, search, replace)
}

fn replace_in(tree: &mut Value, search: &str, replace: &str) -> usize {
    match tree {
        Value::Text(text) => {
            if text.contains(search) {
                *text = text.replace(search, replace);
                1
            } else {
                0
            }
        }
        Value::Map(map) => map
            .values_mut()
            .map(|child| replace_in(child, search, replace))
            .sum(),
        Value::List(list) => list
            .iter_mut()
            .map(|child| replace_in(child, search, replace))
            .sum(),
    }
}

/// By-value form of [`replace_text`].
pub fn replaced(mut tree: Value, search: &str, replace: &str) -> Value {
    replace_text(&mut tree, search, replace);
    tree
}

/// A configured rewrite: one text substitution followed by tag pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scrub {
    pub search: String,
    pub replace: String,
    /// Pruned in this order, one pass per tag.
    pub prune_tags: Vec<String>,
}

/// Counts collected while applying a [`Scrub`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrubReport {
    pub replaced_leaves: usize,
    pub pruned: Vec<(String, usize)>,
}

impl ScrubReport {
    pub fn pruned_total(&self) -> usize {
        self.pruned.iter().map(|(_, count)| count).sum()
    }
}

impl Scrub {
    /// Scrub with the default prune tags.
    pub fn new<S: Into<String>, R: Into<String>>(search: S, replace: R) -> Scrub {
        Scrub {
            search: search.into(),
            replace: replace.into(),
            prune_tags: DEFAULT_PRUNE_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn with_prune_tags<I, S>(mut self, tags: I) -> Scrub
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prune_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn apply(&self, tree: &mut Value) -> ScrubReport {
        let replaced_leaves = replace_text(tree, &self.search, &self.replace);
        debug!(
            search = %self.search,
            replace = %self.replace,
            replaced_leaves,
            "replaced text"
        );

        let mut pruned = Vec::with_capacity(self.prune_tags.len());
        for tag in &self.prune_tags {
            let count = prune_tag(tree, tag);
            debug!(tag = %tag, count, "pruned tag");
            pruned.push((tag.clone(), count));
        }

        let report = ScrubReport {
            replaced_leaves,
            pruned,
        };
        info!(
            replaced_leaves = report.replaced_leaves,
            pruned = report.pruned_total(),
            "scrub complete"
        );
        report
    }

    pub fn apply_document(&self, document: &mut Document) -> ScrubReport {
        self.apply(document.tree_mut())
    }
}
