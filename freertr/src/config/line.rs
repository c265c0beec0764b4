//! Indented configuration text as a forest of lines.

use std::fmt;

use crate::error::{ConfigError, Result};

/// Lines starting with one of these are comments.
pub const COMMENT_TOKENS: &[&str] = &["#", "!", "/*", "*/", "echo"];

/// One configuration line and its place in the tree.
///
/// Two lines are equal when their text and parent path are equal;
/// indentation is not compared.
#[derive(Debug, Clone)]
pub struct ConfigLine {
    /// Text without surrounding whitespace.
    pub text: String,

    /// Text as it appeared, indentation included.
    pub raw: String,

    parents: Vec<usize>,
    children: Vec<usize>,
    path: Vec<String>,
    line: String,
}

impl ConfigLine {
    fn new(raw: impl Into<String>, parents: Vec<usize>, path: Vec<String>) -> Self {
        let raw = raw.into();
        let text = raw.trim().to_string();
        let line = path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(text.as_str()))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            text,
            raw,
            parents,
            children: vec![],
            path,
            line,
        }
    }

    /// Parent texts from the root down.
    pub fn parents(&self) -> &[String] {
        &self.path
    }

    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Parent texts and own text joined with spaces.
    pub fn line(&self) -> &str {
        &self.line
    }
}

impl PartialEq for ConfigLine {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line
    }
}

impl Eq for ConfigLine {}

impl fmt::Display for ConfigLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A parsed configuration.
///
/// Lines live in an arena in source order; parent and child links are
/// indices into it.
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    indent: usize,
    items: Vec<ConfigLine>,
}

impl NetworkConfig {
    /// Empty configuration indenting each level by `indent` spaces.
    pub fn new(indent: usize) -> Self {
        Self {
            indent,
            items: vec![],
        }
    }

    /// Parse configuration text.
    ///
    /// Unindented lines are roots; a more indented line is a child of the
    /// nearest preceding less indented one. Blank lines, lines made only
    /// of `{`, `}` and `;`, and comment lines are skipped.
    pub fn parse(text: &str, indent: usize) -> Self {
        let mut config = Self::new(indent);
        config.load(text);
        config
    }

    /// Replace the contents with parsed `text`.
    pub fn load(&mut self, text: &str) {
        self.items.clear();

        let mut ancestors: Vec<usize> = vec![];
        let mut indents: Vec<usize> = vec![0];

        for raw in text.split('\n') {
            let raw = raw.trim_end();
            let bare: String = raw.chars().filter(|c| !matches!(c, '{' | '}' | ';')).collect();
            let bare = bare.trim();
            if bare.is_empty() || is_comment(bare) {
                continue;
            }

            let idx = self.items.len();
            let line_indent = raw.len() - raw.trim_start().len();

            if line_indent == 0 {
                self.items.push(ConfigLine::new(raw, vec![], vec![]));
                ancestors = vec![idx];
                indents = vec![0];
                continue;
            }

            while indents.last().is_some_and(|last| *last > line_indent) {
                indents.pop();
            }
            if indents.last().is_none_or(|last| *last < line_indent) {
                indents.push(line_indent);
            }

            let level = indents.len() - 1;
            let parents: Vec<usize> = ancestors.iter().take(level).copied().collect();
            let path = self.texts(&parents);
            self.items.push(ConfigLine::new(raw, parents, path));

            if level > ancestors.len() {
                continue;
            }

            ancestors.truncate(level);
            if let Some(parent) = ancestors.last() {
                self.items[*parent].children.push(idx);
            }
            ancestors.push(idx);
        }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn items(&self) -> &[ConfigLine] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigLine> {
        self.items.iter()
    }

    /// Direct children of `line`, which must belong to this config.
    pub fn children<'a>(&'a self, line: &'a ConfigLine) -> impl Iterator<Item = &'a ConfigLine> {
        line.children.iter().filter_map(|idx| self.items.get(*idx))
    }

    /// The line at `path` (parent texts followed by the line's own text).
    pub fn get_object<S: AsRef<str>>(&self, path: &[S]) -> Option<&ConfigLine> {
        self.find(path).map(|idx| &self.items[idx])
    }

    /// The line at `path` followed by all of its descendants.
    pub fn get_block<S: AsRef<str>>(&self, path: &[S]) -> Result<Vec<&ConfigLine>> {
        let idx = self.find(path).ok_or_else(|| ConfigError::PathNotFound {
            path: path.iter().map(|p| p.as_ref().to_string()).collect(),
        })?;
        Ok(self.expand_block(idx).into_iter().map(|i| &self.items[i]).collect())
    }

    /// Add `lines` under `parents`, creating missing parents.
    ///
    /// New lines are indented `indent` spaces per level. Lines already
    /// present at the same place are skipped.
    pub fn add<S, P>(&mut self, lines: &[S], parents: &[P])
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        let lines = lines
            .iter()
            .map(|l| l.as_ref())
            .filter(|l| !is_comment(l.trim()));

        if parents.is_empty() {
            for line in lines {
                let item = ConfigLine::new(line, vec![], vec![]);
                if !self.items.contains(&item) {
                    self.items.push(item);
                }
            }
            return;
        }

        let mut ancestors: Vec<usize> = vec![];
        for depth in 0..parents.len() {
            if let Some(idx) = self.find(&parents[..=depth]) {
                ancestors.push(idx);
                continue;
            }

            let text = parents[depth].as_ref().trim();
            let raw = format!("{}{}", " ".repeat(depth * self.indent), text);
            let idx = self.push_child(raw, &ancestors);
            ancestors.push(idx);
        }

        let offset = " ".repeat(parents.len() * self.indent);
        for line in lines {
            let text = line.trim();
            let exists = ancestors
                .last()
                .map(|parent| {
                    self.items[*parent]
                        .children
                        .iter()
                        .any(|child| self.items[*child].text == text)
                })
                .unwrap_or(false);
            if !exists {
                self.push_child(format!("{}{}", offset, text), &ancestors);
            }
        }
    }

    /// Parents followed by the child texts of the block they name.
    ///
    /// The first parent is unindented; everything after it is indented by
    /// one space.
    pub fn sublevel_config<S: AsRef<str>>(&self, parents: &[S]) -> String {
        let children: Vec<&str> = self
            .get_object(parents)
            .map(|obj| self.children(obj).map(|c| c.text.as_str()).collect())
            .unwrap_or_default();

        parents
            .iter()
            .map(|p| p.as_ref())
            .chain(children)
            .enumerate()
            .map(|(i, text)| if i == 0 { text.to_string() } else { format!(" {}", text) })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn item(&self, idx: usize) -> &ConfigLine {
        &self.items[idx]
    }

    pub(crate) fn parent_indices(&self, idx: usize) -> &[usize] {
        &self.items[idx].parents
    }

    pub(crate) fn child_indices(&self, idx: usize) -> &[usize] {
        &self.items[idx].children
    }

    /// `idx` and its descendants, depth first.
    pub(crate) fn expand_block(&self, idx: usize) -> Vec<usize> {
        let mut block = vec![];
        let mut stack = vec![idx];

        while let Some(current) = stack.pop() {
            if block.contains(&current) {
                continue;
            }
            block.push(current);
            stack.extend(self.items[current].children.iter().rev());
        }

        block
    }

    fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<usize> {
        let (last, parents) = path.split_last()?;
        self.items.iter().position(|item| {
            item.text == last.as_ref().trim()
                && item.path.len() == parents.len()
                && item.path.iter().zip(parents).all(|(a, b)| a == b.as_ref().trim())
        })
    }

    fn push_child(&mut self, raw: String, ancestors: &[usize]) -> usize {
        let idx = self.items.len();
        let path = self.texts(ancestors);
        self.items.push(ConfigLine::new(raw, ancestors.to_vec(), path));
        if let Some(parent) = ancestors.last() {
            self.items[*parent].children.push(idx);
        }
        idx
    }

    fn texts(&self, indices: &[usize]) -> Vec<String> {
        indices.iter().map(|i| self.items[*i].text.clone()).collect()
    }
}

impl fmt::Display for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw: Vec<&str> = self.items.iter().map(|i| i.raw.as_str()).collect();
        write!(f, "{}", raw.join("\n"))
    }
}

fn is_comment(text: &str) -> bool {
    COMMENT_TOKENS.iter().any(|token| text.starts_with(token))
}
