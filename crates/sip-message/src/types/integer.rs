use std::fmt;

use crate::error::{Error, Result};
use crate::header::ParserCategory;
use crate::types::param::Params;

/// `1*DIGIT [comment] *(;param)`: Content-Length, Max-Forwards, Expires,
/// Min-Expires, Retry-After
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntegerCategory {
    pub value: u32,
    /// Parenthesised comment, without the parentheses (Retry-After only)
    pub comment: Option<String>,
    pub params: Params,
}

impl IntegerCategory {
    pub fn new(value: u32) -> Self {
        IntegerCategory {
            value,
            ..Default::default()
        }
    }
}

impl fmt::Display for IntegerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(comment) = &self.comment {
            write!(f, " ({comment})")?;
        }
        write!(f, "{}", self.params)
    }
}

impl ParserCategory for IntegerCategory {
    fn parse(text: &str) -> Result<Self> {
        let (head, params) = Params::split_trailing(text)?;
        let digits_end = head
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(head.len());
        let value = head[..digits_end]
            .parse::<u32>()
            .map_err(|_| Error::invalid_header("", format!("expected a number, found '{head}'")))?;

        let trailing = head[digits_end..].trim();
        let comment = if trailing.is_empty() {
            None
        } else {
            let inner = trailing
                .strip_prefix('(')
                .and_then(|t| t.strip_suffix(')'))
                .ok_or_else(|| Error::invalid_header("", format!("unexpected text '{trailing}' after number")))?;
            Some(inner.to_string())
        };

        Ok(IntegerCategory { value, comment, params })
    }
}
