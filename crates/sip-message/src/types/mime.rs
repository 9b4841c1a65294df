use std::fmt;

use crate::error::{Error, Result};
use crate::grammar::is_token_char;
use crate::header::ParserCategory;
use crate::types::param::Params;

/// A media type such as `application/sdp;charset=utf-8` (Content-Type, Accept)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Mime {
    pub media_type: String,
    pub subtype: String,
    pub params: Params,
}

impl Mime {
    pub fn new(media_type: impl Into<String>, subtype: impl Into<String>) -> Self {
        Mime {
            media_type: media_type.into(),
            subtype: subtype.into(),
            params: Params::new(),
        }
    }

    /// Case-insensitive match on type and subtype, ignoring parameters
    pub fn is(&self, media_type: &str, subtype: &str) -> bool {
        self.media_type.eq_ignore_ascii_case(media_type) && self.subtype.eq_ignore_ascii_case(subtype)
    }

    /// The `boundary` parameter of a multipart type
    pub fn boundary(&self) -> Option<String> {
        self.params.value("boundary")
    }
}

impl fmt::Display for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.media_type, self.subtype, self.params)
    }
}

impl ParserCategory for Mime {
    fn parse(text: &str) -> Result<Self> {
        let (head, params) = Params::split_trailing(text)?;
        let (media_type, subtype) = head
            .split_once('/')
            .map(|(t, s)| (t.trim(), s.trim()))
            .filter(|(t, s)| {
                !t.is_empty() && !s.is_empty() && t.chars().all(is_token_char) && s.chars().all(is_token_char)
            })
            .ok_or_else(|| Error::invalid_header("", format!("invalid media type '{head}'")))?;
        Ok(Mime {
            media_type: media_type.to_string(),
            subtype: subtype.to_string(),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mime() {
        let mime = Mime::parse("multipart/mixed; boundary=\"unique-boundary-1\"").unwrap();
        assert!(mime.is("Multipart", "MIXED"));
        assert_eq!(mime.boundary().as_deref(), Some("unique-boundary-1"));

        assert!(Mime::parse("application/sdp").unwrap().is("application", "sdp"));
        assert!(Mime::parse("application").is_err());
        assert!(Mime::parse("/sdp").is_err());
    }
}
