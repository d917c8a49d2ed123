//! DOM query capability used by form extraction.
//!
//! Extraction only needs to find descendants by tag, read attributes with a
//! presence flag, and read text content. `FormNode` captures exactly that so
//! the extractor runs the same over a parsed `scraper` document or a
//! hand-built tree in tests.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

pub trait FormNode: Sized {
    /// Lowercase tag name.
    fn tag(&self) -> &str;

    /// `Some` when the attribute is present, even if its value is empty.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Concatenated text content of the node and its descendants.
    fn text(&self) -> String;

    /// Descendant elements whose tag is in `tags`, in document order.
    /// The node itself is never included.
    fn descendants(&self, tags: &[&str]) -> Vec<Self>;
}

impl<'a> FormNode for ElementRef<'a> {
    fn tag(&self) -> &str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }

    fn descendants(&self, tags: &[&str]) -> Vec<Self> {
        // descendants() starts with the node itself.
        (**self)
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| tags.contains(&el.value().name()))
            .collect()
    }
}

/// Find the first element matching `selector`, typically a `<form>`.
pub fn find_form<'a>(document: &'a Html, selector: &str) -> Result<ElementRef<'a>> {
    let sel = Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("Invalid selector '{selector}': {e}"))?;
    let found = document.select(&sel).next();
    debug!(selector = %selector, found = found.is_some(), "form lookup");
    found.ok_or_else(|| anyhow::anyhow!("No element matches selector '{selector}'"))
}
