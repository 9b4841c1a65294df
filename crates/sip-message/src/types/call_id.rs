use std::fmt;

use crate::error::{Error, Result};
use crate::header::ParserCategory;
use crate::types::param::Params;

/// `word ["@" word]`: Call-ID, In-Reply-To, and with params Replaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CallId {
    pub value: String,
    pub params: Params,
}

impl CallId {
    pub fn new(value: impl Into<String>) -> Self {
        CallId {
            value: value.into(),
            params: Params::new(),
        }
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.params)
    }
}

impl PartialEq<str> for CallId {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for CallId {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl ParserCategory for CallId {
    fn parse(text: &str) -> Result<Self> {
        let (value, params) = Params::split_trailing(text)?;
        if value.is_empty() || value.contains(char::is_whitespace) {
            return Err(Error::invalid_header("", format!("invalid call id '{value}'")));
        }
        Ok(CallId {
            value: value.to_string(),
            params,
        })
    }
}
