use std::fmt;

use crate::error::{Error, Result};
use crate::grammar::{quote, unquote};
use crate::header::ParserCategory;

/// `warn-code SP warn-agent SP warn-text`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Warning {
    pub code: u16,
    pub agent: String,
    pub text: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.code, self.agent, quote(&self.text))
    }
}

impl ParserCategory for Warning {
    fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::invalid_header("", format!("expected '<code> <agent> \"<text>\"', found '{text}'"));
        let mut parts = text.trim().splitn(3, ' ');
        let code = parts
            .next()
            .filter(|code| code.len() == 3)
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(invalid)?;
        let agent = parts.next().filter(|a| !a.is_empty()).ok_or_else(invalid)?;
        let text = parts.next().and_then(|t| unquote(t.trim())).ok_or_else(invalid)?;
        Ok(Warning {
            code,
            agent: agent.to_string(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_warning() {
        let warning = Warning::parse("301 isi.edu \"Incompatible network address type 'E.164'\"").unwrap();
        assert_eq!(warning.code, 301);
        assert_eq!(warning.agent, "isi.edu");
        assert_eq!(warning.text, "Incompatible network address type 'E.164'");

        assert!(Warning::parse("30 isi.edu \"x\"").is_err());
        assert!(Warning::parse("301 isi.edu unquoted").is_err());
    }
}
