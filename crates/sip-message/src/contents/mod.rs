//! # Message contents
//!
//! A message body is kept as a raw span until someone asks for it typed.
//! [`Contents::parse`] picks a representation from the Content-Type through
//! a small factory table:
//!
//! | Content-Type | Variant |
//! |---|---|
//! | `application/sdp` | [`Contents::Sdp`] |
//! | `text/*` | [`Contents::Text`] |
//! | `multipart/*` | [`Contents::Multipart`] |
//! | anything else | [`Contents::Octets`] |
//!
//! The message's [`ContentContainer`] caches the typed value and hands it
//! out at most once through `release`.

mod container;
mod multipart;
mod sdp;

use bytes::Bytes;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Mime;

pub use container::ContentContainer;
pub use multipart::{MimePart, MultipartContents};
pub use sdp::{SdpContents, SdpLine};

/// A `text/*` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainContents {
    pub mime: Mime,
    pub text: String,
}

impl PlainContents {
    /// A `text/plain` body
    pub fn new(text: impl Into<String>) -> Self {
        PlainContents {
            mime: Mime::new("text", "plain"),
            text: text.into(),
        }
    }
}

/// Any body without a more specific representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetContents {
    pub mime: Mime,
    pub data: Bytes,
}

/// A typed message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Sdp(SdpContents),
    Text(PlainContents),
    Multipart(MultipartContents),
    Octets(OctetContents),
}

type ContentsParser = fn(&Mime, Bytes) -> Result<Contents>;

fn parse_sdp(_: &Mime, body: Bytes) -> Result<Contents> {
    SdpContents::parse(&body).map(Contents::Sdp)
}

fn parse_text(mime: &Mime, body: Bytes) -> Result<Contents> {
    let text = String::from_utf8(body.to_vec())
        .map_err(|_| Error::invalid_contents(format!("{mime} body is not valid UTF-8")))?;
    Ok(Contents::Text(PlainContents {
        mime: mime.clone(),
        text,
    }))
}

fn parse_multipart(mime: &Mime, body: Bytes) -> Result<Contents> {
    MultipartContents::parse(mime, &body).map(Contents::Multipart)
}

// (type, subtype or None for any, parser)
const FACTORIES: &[(&str, Option<&str>, ContentsParser)] = &[
    ("application", Some("sdp"), parse_sdp),
    ("text", None, parse_text),
    ("multipart", None, parse_multipart),
];

impl Contents {
    /// Builds the representation registered for `mime`, falling back to
    /// [`Contents::Octets`].
    pub fn parse(mime: &Mime, body: Bytes) -> Result<Contents> {
        let factory = FACTORIES.iter().find(|(media_type, subtype, _)| {
            mime.media_type.eq_ignore_ascii_case(media_type)
                && subtype.map_or(true, |subtype| mime.subtype.eq_ignore_ascii_case(subtype))
        });
        match factory {
            Some((_, _, parse)) => {
                debug!(content_type = %mime, len = body.len(), "parsing message contents");
                parse(mime, body)
            }
            None => Ok(Contents::Octets(OctetContents {
                mime: mime.clone(),
                data: body,
            })),
        }
    }

    /// The Content-Type describing this body
    pub fn mime(&self) -> Mime {
        match self {
            Contents::Sdp(_) => Mime::new("application", "sdp"),
            Contents::Text(text) => text.mime.clone(),
            Contents::Multipart(multipart) => multipart.mime.clone(),
            Contents::Octets(octets) => octets.mime.clone(),
        }
    }

    /// The body bytes as they go on the wire
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Contents::Sdp(sdp) => sdp.to_bytes(),
            Contents::Text(text) => Bytes::from(text.text.clone()),
            Contents::Multipart(multipart) => multipart.to_bytes(),
            Contents::Octets(octets) => octets.data.clone(),
        }
    }

    pub fn as_sdp(&self) -> Option<&SdpContents> {
        match self {
            Contents::Sdp(sdp) => Some(sdp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::ParserCategory;

    #[test]
    fn test_factory_selects_by_content_type() {
        let sdp = Contents::parse(&Mime::parse("Application/SDP").unwrap(), Bytes::from_static(b"v=0\r\n")).unwrap();
        assert!(sdp.as_sdp().is_some());

        let text = Contents::parse(&Mime::parse("text/html").unwrap(), Bytes::from_static(b"<p>hi</p>")).unwrap();
        match &text {
            Contents::Text(plain) => assert_eq!(plain.text, "<p>hi</p>"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(text.mime().is("text", "html"));

        let other = Contents::parse(&Mime::parse("application/pidf+xml").unwrap(), Bytes::from_static(b"<presence/>")).unwrap();
        assert!(matches!(other, Contents::Octets(_)));
        assert_eq!(&other.to_bytes()[..], b"<presence/>");
    }

    #[test]
    fn test_factory_reports_bad_bodies() {
        let err = Contents::parse(&Mime::new("application", "sdp"), Bytes::from_static(b"garbage")).unwrap_err();
        assert!(matches!(err, Error::InvalidContents { .. }));
        assert!(Contents::parse(&Mime::new("text", "plain"), Bytes::from_static(&[0xc3, 0x28])).is_err());
    }
}
