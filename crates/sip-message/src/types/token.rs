use std::fmt;

use crate::error::{Error, Result};
use crate::grammar::is_token_char;
use crate::header::ParserCategory;
use crate::types::param::Params;

/// `token *(;param)`: Event, Supported, Allow, Content-Disposition, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Token {
    pub value: String,
    pub params: Params,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Token {
            value: value.into(),
            params: Params::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.params)
    }
}

impl ParserCategory for Token {
    fn parse(text: &str) -> Result<Self> {
        let (value, params) = Params::split_trailing(text)?;
        if value.is_empty() || !value.chars().all(|c| is_token_char(c) || matches!(c, '/' | ':')) {
            return Err(Error::invalid_header("", format!("invalid token '{value}'")));
        }
        Ok(Token {
            value: value.to_string(),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token() {
        let token = Token::parse("presence;id=123").unwrap();
        assert_eq!(token.value, "presence");
        assert_eq!(token.params.value("id").as_deref(), Some("123"));
        assert_eq!(token.to_string(), "presence;id=123");

        assert!(Token::parse("").is_err());
        assert!(Token::parse("two words").is_err());
    }
}
