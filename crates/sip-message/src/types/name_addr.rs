use std::fmt;

use crate::error::{Error, Result};
use crate::grammar::{quote, unquote};
use crate::header::ParserCategory;
use crate::types::param::Params;
use crate::types::uri::Uri;

/// `[display-name] <URI> *(;param)` or `addr-spec *(;param)`.
///
/// Used by From, To, Contact, Route, Record-Route, Refer-To, Referred-By,
/// Reply-To and the *-Info headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NameAddr {
    pub display_name: Option<String>,
    pub uri: Uri,
    /// Header parameters (after the closing `>`)
    pub params: Params,
    /// `Contact: *`
    pub all_contacts: bool,
}

impl NameAddr {
    pub fn new(uri: Uri) -> Self {
        NameAddr {
            uri,
            ..Default::default()
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The `tag` parameter
    pub fn tag(&self) -> Option<String> {
        self.params.value("tag")
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.params.set("tag", Some(tag.into()));
    }
}

impl fmt::Display for NameAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all_contacts {
            return f.write_str("*");
        }
        if let Some(name) = &self.display_name {
            write!(f, "{} ", quote(name))?;
        }
        write!(f, "<{}>{}", self.uri, self.params)
    }
}

// Index one past the closing quote of a quoted string starting at 0
fn quoted_end(input: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in input.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

fn bracketed(display_name: Option<String>, rest: &str) -> Result<NameAddr> {
    let rest = rest
        .trim_start()
        .strip_prefix('<')
        .ok_or_else(|| Error::invalid_header("", "expected '<' after display name"))?;
    let close = rest
        .find('>')
        .ok_or_else(|| Error::invalid_header("", "unterminated '<'"))?;
    let uri = rest[..close].parse()?;
    let trailing = rest[close + 1..].trim();
    let params = match trailing.strip_prefix(';') {
        Some(params) => Params::parse(params)?,
        None if trailing.is_empty() => Params::new(),
        None => {
            return Err(Error::invalid_header("", format!("unexpected text '{trailing}' after URI")));
        }
    };
    Ok(NameAddr {
        display_name,
        uri,
        params,
        all_contacts: false,
    })
}

impl ParserCategory for NameAddr {
    fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text == "*" {
            return Ok(NameAddr {
                all_contacts: true,
                ..Default::default()
            });
        }

        if text.starts_with('"') {
            let end = quoted_end(text)
                .ok_or_else(|| Error::invalid_header("", "unterminated display name"))?;
            return bracketed(unquote(&text[..end]), &text[end..]);
        }

        if let Some(open) = text.find('<') {
            let name = text[..open].trim();
            let name = (!name.is_empty()).then(|| name.to_string());
            return bracketed(name, &text[open..]);
        }

        // addr-spec: parameters after the URI belong to the header
        let (uri, params) = Params::split_trailing(text)?;
        Ok(NameAddr {
            display_name: None,
            uri: uri.parse()?,
            params,
            all_contacts: false,
        })
    }
}
