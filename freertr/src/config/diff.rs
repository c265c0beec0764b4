//! Structural diff between a candidate and a running configuration.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::line::{ConfigLine, NetworkConfig};
use crate::error::ConfigError;

/// Marker closing a block dump.
pub const END_MARKER: &str = "end";

/// How a candidate line is looked up in the running configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Present anywhere with the same text and parent path.
    #[default]
    Line,
    /// Same text at the same position.
    Strict,
    /// The whole candidate equals the running block, or all of it is sent.
    Exact,
    /// No comparison; every candidate line is sent.
    None,
}

/// What is sent for a changed line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplaceMode {
    /// Only the changed lines, with their parents.
    #[default]
    Line,
    /// The whole top-level block containing a changed line.
    Block,
}

impl FromStr for MatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(MatchMode::Line),
            "strict" => Ok(MatchMode::Strict),
            "exact" => Ok(MatchMode::Exact),
            "none" => Ok(MatchMode::None),
            other => Err(ConfigError::InvalidOption {
                option: "match",
                value: other.to_string(),
                expected: "line, strict, exact or none",
            }),
        }
    }
}

impl FromStr for ReplaceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(ReplaceMode::Line),
            "block" => Ok(ReplaceMode::Block),
            other => Err(ConfigError::InvalidOption {
                option: "replace",
                value: other.to_string(),
                expected: "line or block",
            }),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchMode::Line => "line",
            MatchMode::Strict => "strict",
            MatchMode::Exact => "exact",
            MatchMode::None => "none",
        };
        f.write_str(name)
    }
}

/// Options for [`NetworkConfig::difference`].
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    pub match_mode: MatchMode,
    pub replace_mode: ReplaceMode,
    /// Compare against this block of the running configuration only.
    /// Ignored with [`MatchMode::Line`].
    pub path: Vec<String>,
}

impl DiffOptions {
    pub fn new(match_mode: MatchMode, replace_mode: ReplaceMode) -> Self {
        Self {
            match_mode,
            replace_mode,
            path: vec![],
        }
    }

    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }
}

/// Output shape of [`ConfigObjects::dumps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// Line texts without indentation.
    Commands,
    /// Lines and their direct children as written, then `end`.
    Block,
    /// Lines as written.
    Raw,
}

/// Lines selected from a configuration, in order.
#[derive(Debug, Clone)]
pub struct ConfigObjects<'a> {
    config: &'a NetworkConfig,
    items: Vec<usize>,
}

impl<'a> ConfigObjects<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ConfigLine> + '_ {
        self.items.iter().map(|idx| self.config.item(*idx))
    }

    /// Line texts, one command each.
    pub fn commands(&self) -> Vec<String> {
        self.iter().map(|line| line.text.clone()).collect()
    }

    pub fn dumps(&self, format: DumpFormat) -> String {
        let lines: Vec<&str> = match format {
            DumpFormat::Commands => self.iter().map(|l| l.text.as_str()).collect(),
            DumpFormat::Raw => self.iter().map(|l| l.raw.as_str()).collect(),
            DumpFormat::Block => {
                let mut order: Vec<usize> = vec![];
                for idx in &self.items {
                    for candidate in std::iter::once(idx).chain(self.config.child_indices(*idx)) {
                        if !order.contains(candidate) {
                            order.push(*candidate);
                        }
                    }
                }
                order
                    .iter()
                    .map(|idx| self.config.item(*idx).raw.as_str())
                    .chain(std::iter::once(END_MARKER))
                    .collect()
            }
        };
        lines.join("\n")
    }
}

impl NetworkConfig {
    /// Every line, in order.
    pub fn objects(&self) -> ConfigObjects<'_> {
        ConfigObjects {
            config: self,
            items: (0..self.len()).collect(),
        }
    }

    /// Lines of `self` needed to bring `other` in line with it.
    ///
    /// Each changed line is preceded by any of its parents not already
    /// emitted, so the result replays in order on the device. Neither
    /// input is modified.
    pub fn difference<'a>(&'a self, other: &NetworkConfig, options: &DiffOptions) -> ConfigObjects<'a> {
        if options.match_mode == MatchMode::None {
            return self.objects();
        }

        let theirs: Vec<&ConfigLine> = if !options.path.is_empty() && options.match_mode != MatchMode::Line {
            other.get_block(&options.path).unwrap_or_default()
        } else {
            other.iter().collect()
        };

        let updates = match options.match_mode {
            MatchMode::Line => self.diff_line(&theirs),
            MatchMode::Strict => self.diff_strict(&theirs),
            MatchMode::Exact => self.diff_exact(&theirs),
            MatchMode::None => (0..self.len()).collect(),
        };

        let updates = match options.replace_mode {
            ReplaceMode::Line => updates,
            ReplaceMode::Block => self.expand_blocks(&updates),
        };

        let mut visited: HashSet<&str> = HashSet::new();
        let mut expanded = vec![];
        for idx in updates {
            for parent in self.parent_indices(idx) {
                if visited.insert(self.item(*parent).line()) {
                    expanded.push(*parent);
                }
            }
            if visited.insert(self.item(idx).line()) {
                expanded.push(idx);
            }
        }

        ConfigObjects {
            config: self,
            items: expanded,
        }
    }

    fn diff_line(&self, theirs: &[&ConfigLine]) -> Vec<usize> {
        let known: HashSet<&str> = theirs.iter().map(|l| l.line()).collect();
        (0..self.len())
            .filter(|idx| !known.contains(self.item(*idx).line()))
            .collect()
    }

    fn diff_strict(&self, theirs: &[&ConfigLine]) -> Vec<usize> {
        let mut reference: Vec<&str> = theirs
            .first()
            .map(|first| first.parents().iter().map(String::as_str).collect())
            .unwrap_or_default();
        reference.extend(theirs.iter().map(|l| l.raw.trim()));

        self.iter()
            .enumerate()
            .filter(|(idx, line)| reference.get(*idx) != Some(&line.raw.trim()))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn diff_exact(&self, theirs: &[&ConfigLine]) -> Vec<usize> {
        let same = theirs.len() == self.len() && self.iter().zip(theirs).all(|(ours, t)| ours == *t);
        if same { vec![] } else { (0..self.len()).collect() }
    }

    /// The blocks of the top-level lines (or parents) of `updates`.
    fn expand_blocks(&self, updates: &[usize]) -> Vec<usize> {
        let mut roots: Vec<usize> = vec![];
        for idx in updates {
            let parents = self.parent_indices(*idx);
            if parents.is_empty() {
                if !roots.contains(idx) {
                    roots.push(*idx);
                }
            } else {
                for parent in parents {
                    if !roots.contains(parent) {
                        roots.push(*parent);
                    }
                }
            }
        }

        roots.into_iter().flat_map(|root| self.expand_block(root)).collect()
    }
}
