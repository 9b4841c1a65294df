use std::fmt;

use crate::error::{Error, Result};
use crate::grammar::{is_token_char, split_top_level};
use crate::header::ParserCategory;
use crate::types::param::Param;

/// Challenge or credentials: `Digest realm="atlanta.com", nonce="84a4cc6f"`
///
/// Parameters are comma-separated, so each header line holds exactly one
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Auth {
    pub scheme: String,
    pub params: Vec<Param>,
}

impl Auth {
    /// Unquoted value of a parameter
    pub fn param(&self, name: &str) -> Option<String> {
        let value = self
            .params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))?
            .value
            .as_deref()?;
        Some(crate::grammar::unquote(value).unwrap_or_else(|| value.to_string()))
    }
}

impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scheme)?;
        for (i, param) in self.params.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            match &param.value {
                Some(value) => write!(f, "{}={}", param.name, value)?,
                None => f.write_str(&param.name)?,
            }
        }
        Ok(())
    }
}

impl ParserCategory for Auth {
    const COMMA_SEPARATED: bool = false;

    fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (scheme, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        if scheme.is_empty() || !scheme.chars().all(is_token_char) {
            return Err(Error::invalid_header("", format!("invalid auth scheme '{scheme}'")));
        }
        let params = split_top_level(rest, ',')
            .into_iter()
            .map(|piece| match piece.split_once('=') {
                Some((name, value)) => Param::new(name.trim(), Some(value.trim().to_string())),
                None => Param::flag(piece),
            })
            .collect();
        Ok(Auth {
            scheme: scheme.to_string(),
            params,
        })
    }
}
