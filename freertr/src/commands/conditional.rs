//! `wait_for` expressions evaluated against command output.
//!
//! Grammar: `result[<index>] [not] <op> <value>`, where `<op>` is one of
//!
//! | op         | aliases       |
//! |------------|---------------|
//! | `eq`       | `==`          |
//! | `neq`      | `ne`, `!=`    |
//! | `gt`       | `>`           |
//! | `ge`       | `>=`          |
//! | `lt`       | `<`           |
//! | `le`       | `<=`          |
//! | `contains` |               |
//! | `matches`  |               |
//!
//! The value may be quoted with `'` or `"` to include spaces.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    Matches,
}

impl Operator {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "eq" | "==" => Operator::Eq,
            "neq" | "ne" | "!=" => Operator::Neq,
            "gt" | ">" => Operator::Gt,
            "ge" | ">=" => Operator::Ge,
            "lt" | "<" => Operator::Lt,
            "le" | "<=" => Operator::Le,
            "contains" => Operator::Contains,
            "matches" => Operator::Matches,
            _ => return None,
        })
    }
}

/// A parsed `wait_for` expression.
#[derive(Debug, Clone)]
pub struct Conditional {
    raw: String,
    index: usize,
    negate: bool,
    op: Operator,
    value: String,
    pattern: Option<Regex>,
}

impl Conditional {
    /// The expression as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Index of the command output this expression reads.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// Evaluate against the outputs of one round. A missing output never
    /// satisfies the expression.
    pub fn evaluate<S: AsRef<str>>(&self, outputs: &[S]) -> bool {
        let Some(output) = outputs.get(self.index) else {
            return false;
        };
        let output = output.as_ref().trim();

        let holds = match self.op {
            Operator::Eq => values_equal(output, &self.value),
            Operator::Neq => !values_equal(output, &self.value),
            Operator::Gt => compare(output, &self.value, |a, b| a > b),
            Operator::Ge => compare(output, &self.value, |a, b| a >= b),
            Operator::Lt => compare(output, &self.value, |a, b| a < b),
            Operator::Le => compare(output, &self.value, |a, b| a <= b),
            Operator::Contains => output.contains(self.value.as_str()),
            Operator::Matches => self.pattern.as_ref().is_some_and(|re| re.is_match(output)),
        };

        holds != self.negate
    }
}

impl FromStr for Conditional {
    type Err = CommandError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CommandError::InvalidConditional {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let mut tokens = split_tokens(expression).map_err(|reason| invalid(reason))?;
        if tokens.len() < 3 {
            return Err(invalid("expected `result[N] [not] <op> <value>`"));
        }

        let key = tokens.remove(0);
        let value = tokens.pop().unwrap_or_default();

        let negate = match tokens.iter().position(|t| t == "not") {
            Some(pos) => {
                tokens.remove(pos);
                true
            }
            None => false,
        };

        let op = match tokens.as_slice() {
            [op] => Operator::from_token(op).ok_or_else(|| invalid("unknown operator"))?,
            _ => return Err(invalid("expected exactly one operator")),
        };

        let index = key
            .strip_prefix("result[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|idx| idx.parse().ok())
            .ok_or_else(|| invalid("key must look like result[N]"))?;

        let pattern = match op {
            Operator::Matches => Some(
                regex::RegexBuilder::new(&value)
                    .multi_line(true)
                    .build()
                    .map_err(|e| invalid(&e.to_string()))?,
            ),
            _ => None,
        };

        Ok(Self {
            raw: expression.to_string(),
            index,
            negate,
            op,
            value,
            pattern,
        })
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Whitespace split honouring single and double quotes.
fn split_tokens(expression: &str) -> Result<Vec<String>, &'static str> {
    let mut tokens = vec![];
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in expression.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn values_equal(output: &str, value: &str) -> bool {
    match (output.parse::<f64>(), value.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => output == value,
    }
}

fn compare(output: &str, value: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (output.parse::<f64>(), value.parse::<f64>()) {
        (Ok(a), Ok(b)) => cmp(a, b),
        _ => false,
    }
}
