use std::fmt;

use crate::error::Result;
use crate::header::ParserCategory;

/// Free text header value (Subject, User-Agent, Date, unknown headers).
///
/// Commas are part of the text; a multi-valued header of this category
/// gets one value per header line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StringCategory {
    pub value: String,
}

impl StringCategory {
    pub fn new(value: impl Into<String>) -> Self {
        StringCategory { value: value.into() }
    }
}

impl fmt::Display for StringCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl PartialEq<str> for StringCategory {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for StringCategory {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl ParserCategory for StringCategory {
    const COMMA_SEPARATED: bool = false;

    fn parse(text: &str) -> Result<Self> {
        Ok(StringCategory::new(text.trim()))
    }
}
