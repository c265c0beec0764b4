//! Ordered regex fallback chains for scraping CLI output.
//!
//! FreeRTR prints the same attribute in more than one shape depending on
//! release and command (`mtu is 1500` or `mtu=1500`). A [`FieldRule`] lists
//! the shapes in order; the first pattern that matches wins.

use log::warn;
use regex::{Captures, Regex};

/// Ordered list of patterns extracting one field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: &'static str,
    patterns: Vec<Regex>,
}

impl FieldRule {
    /// Build a rule from explicit patterns, tried in order.
    ///
    /// Each pattern must have at least one capture group. Patterns that do
    /// not compile are logged and left out of the chain.
    pub fn new(field: &'static str, sources: &[&str]) -> Self {
        let patterns = sources
            .iter()
            .filter_map(|source| match Regex::new(source) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("dropping pattern {:?} for {}: {}", source, field, e);
                    None
                }
            })
            .collect();

        Self { field, patterns }
    }

    /// The `<field> is <value>` then `<field>=<value>` chain.
    ///
    /// Values end at a space, a comma or the end of the line.
    pub fn attribute(field: &'static str) -> Self {
        let escaped = regex::escape(field);
        let is_form = format!(r"\b{} is ([^ ,\r\n]*)", escaped);
        let equals_form = format!(r"\b{}=([^ ,\r\n]*)", escaped);
        Self::new(field, &[is_form.as_str(), equals_form.as_str()])
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Number of usable patterns in the chain.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Captures of the first pattern that matches `text`.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.patterns.iter().find_map(|re| re.captures(text))
    }

    /// First capture group of the first matching pattern, trimmed.
    pub fn extract<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    }

    /// Like [`extract`](Self::extract), with `""` for a miss.
    pub fn extract_or_empty(&self, text: &str) -> String {
        self.extract(text).unwrap_or_default().to_string()
    }
}
