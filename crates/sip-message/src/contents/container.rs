use std::borrow::Cow;
use std::cell::OnceCell;

use bytes::Bytes;

use crate::buffer::{BufferArena, Span};
use crate::contents::Contents;
use crate::error::{Error, Result};
use crate::types::Mime;

/// Owner of a message body and its typed representation.
///
/// The raw body is a span into the message's arena. The typed [`Contents`]
/// is built on first request and cached; `release` moves it out to the
/// caller, after which the container is empty for good (until new contents
/// or a new body are set).
#[derive(Debug, Clone, Default)]
pub struct ContentContainer {
    body: Option<Span>,
    contents: OnceCell<Option<Contents>>,
    released: bool,
    // typed contents are the source of truth for encoding
    modified: bool,
}

impl ContentContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the raw body without parsing it.
    pub fn set_body(&mut self, body: Span) {
        self.body = Some(body);
        self.contents = OnceCell::new();
        self.released = false;
        self.modified = false;
    }

    /// The raw body span, if the body has not been replaced
    pub fn body(&self) -> Option<Span> {
        if self.modified {
            None
        } else {
            self.body
        }
    }

    /// Replaces the contents, dropping any previous body.
    pub fn set_contents(&mut self, contents: Contents) {
        self.body = None;
        self.contents = OnceCell::from(Some(contents));
        self.released = false;
        self.modified = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Whether the typed contents replaced or modified the raw body
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// The typed contents, built from the body on first call.
    ///
    /// Fills the cache through a shared reference. Returns `None` if there
    /// is no body or the contents were released.
    pub fn contents(&self, arena: &BufferArena, content_type: Option<&Mime>) -> Result<Option<&Contents>> {
        if self.contents.get().is_none() {
            let built = self.build(arena, content_type)?;
            let _ = self.contents.set(built);
        }
        Ok(self.contents.get().and_then(Option::as_ref))
    }

    /// Mutable typed contents; the encoder renders them from now on.
    pub fn contents_mut(&mut self, arena: &BufferArena, content_type: Option<&Mime>) -> Result<Option<&mut Contents>> {
        self.contents(arena, content_type)?;
        let contents = self.contents.get_mut().and_then(Option::as_mut);
        if contents.is_some() {
            self.modified = true;
        }
        Ok(contents)
    }

    /// Moves the contents out, leaving the container empty.
    ///
    /// Fails if there is nothing to release, including a second release.
    pub fn release(&mut self, arena: &BufferArena, content_type: Option<&Mime>) -> Result<Contents> {
        if self.released {
            return Err(Error::contents_unavailable("contents were already released"));
        }
        self.contents(arena, content_type)?;
        let contents = self
            .contents
            .take()
            .flatten()
            .ok_or_else(|| Error::contents_unavailable("message has no contents"))?;
        self.body = None;
        self.contents = OnceCell::from(None);
        self.released = true;
        self.modified = true;
        Ok(contents)
    }

    /// The body bytes the encoder writes
    pub fn encoded_body<'a>(&'a self, arena: &'a BufferArena) -> Result<Cow<'a, [u8]>> {
        if self.modified {
            return Ok(match self.contents.get() {
                Some(Some(contents)) => Cow::Owned(contents.to_bytes().to_vec()),
                _ => Cow::Borrowed(&[]),
            });
        }
        match &self.body {
            Some(span) => Ok(Cow::Borrowed(arena.resolve(span)?)),
            None => Ok(Cow::Borrowed(&[])),
        }
    }

    fn build(&self, arena: &BufferArena, content_type: Option<&Mime>) -> Result<Option<Contents>> {
        if self.released {
            return Ok(None);
        }
        let body = match &self.body {
            Some(span) if !span.is_empty() => arena.resolve(span)?,
            _ => return Ok(None),
        };
        let octet_stream;
        let mime = match content_type {
            Some(mime) => mime,
            None => {
                octet_stream = Mime::new("application", "octet-stream");
                &octet_stream
            }
        };
        Contents::parse(mime, Bytes::copy_from_slice(body)).map(Some)
    }
}
