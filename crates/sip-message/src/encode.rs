//! # Encoder
//!
//! Headers are written in the order they were added, known and unknown
//! interleaved. Each header is written from whichever form is current:
//!
//! - never modified: the received line, byte for byte
//! - handed out mutably: its parsed values, one `Name: value` line each,
//!   at the position of its first occurrence
//!
//! So a parsed message that was only read re-encodes to exactly the bytes
//! it was parsed from. Content-Length is the one exception: it is
//! recomputed whenever the raw value does not match the body being written.

use std::borrow::Cow;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::buffer::BufferArena;
use crate::error::{Error, Result};
use crate::grammar::escape_uri_header;
use crate::header::{HeaderFieldValueList, HeaderKind};
use crate::message::SipMessage;

/// One header line ready to be written
struct HeaderUnit<'a> {
    order: u64,
    name: &'a str,
    value: Cow<'a, [u8]>,
    /// The line as received, if it is still current
    line: Option<&'a [u8]>,
}

fn push_list<'a>(
    units: &mut Vec<HeaderUnit<'a>>,
    name: &'a str,
    list: &'a HeaderFieldValueList,
    arena: &'a BufferArena,
) -> Result<()> {
    match list.rendered() {
        Some(rendered) => {
            for value in rendered {
                units.push(HeaderUnit {
                    order: list.order(),
                    name,
                    value: Cow::Owned(value.into_bytes()),
                    line: None,
                });
            }
        }
        None => {
            for value in list.values() {
                let line = match value.line() {
                    Some(line) => Some(arena.resolve(&line)?),
                    None => None,
                };
                units.push(HeaderUnit {
                    order: value.order(),
                    name,
                    value: Cow::Borrowed(arena.resolve(&value.span())?),
                    line,
                });
            }
        }
    }
    Ok(())
}

// The raw Content-Length, if the list holds exactly one untouched number
fn raw_content_length(list: &HeaderFieldValueList, arena: &BufferArena) -> Option<usize> {
    if list.is_touched() || list.len() != 1 {
        return None;
    }
    let bytes = arena.resolve(&list.values()[0].span()).ok()?;
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

impl SipMessage {
    // Every header except Content-Length, in output order
    fn header_units(&self) -> Result<Vec<HeaderUnit<'_>>> {
        let mut units = Vec::new();
        for (kind, list) in self.headers.iter() {
            if kind != HeaderKind::ContentLength {
                push_list(&mut units, kind.as_str(), list, &self.arena)?;
            }
        }
        for entry in self.unknown.entries() {
            push_list(&mut units, entry.name(), entry.values(), &self.arena)?;
        }
        units.sort_by_key(|unit| unit.order);
        Ok(units)
    }

    /// Writes the full message: start line, headers, blank line, body.
    ///
    /// Fails with [`Error::NoStartLine`] if the start line was never set.
    pub fn encode(&self, out: &mut BytesMut) -> Result<()> {
        let slot = self.start_line.as_ref().ok_or_else(Error::no_start_line)?;
        match slot.raw {
            Some(span) if !slot.touched => out.put_slice(self.arena.resolve(&span)?),
            _ => out.put_slice(slot.parsed.to_string().as_bytes()),
        }
        out.put_slice(b"\r\n");

        let body = self.contents.encoded_body(&self.arena)?;
        let mut units = self.header_units()?;

        match self.headers.get(HeaderKind::ContentLength) {
            Some(list) if raw_content_length(list, &self.arena) == Some(body.len()) => {
                push_list(&mut units, HeaderKind::ContentLength.as_str(), list, &self.arena)?;
            }
            existing => units.push(HeaderUnit {
                // at the header's own position, or last if it was absent
                order: existing.map_or(u64::MAX, HeaderFieldValueList::order),
                name: HeaderKind::ContentLength.as_str(),
                value: Cow::Owned(body.len().to_string().into_bytes()),
                line: None,
            }),
        }
        units.sort_by_key(|unit| unit.order);

        for unit in &units {
            match unit.line {
                Some(line) => out.put_slice(line),
                None => {
                    out.put_slice(unit.name.as_bytes());
                    out.put_slice(b": ");
                    out.put_slice(&unit.value);
                }
            }
            out.put_slice(b"\r\n");
        }
        out.put_slice(b"\r\n");
        out.put_slice(&body);

        trace!(headers = units.len(), body = body.len(), "encoded SIP message");
        Ok(())
    }

    /// Writes the message as the header part of a URI:
    /// `?Name=value&Name=value&body=...`, escaped for URI headers.
    ///
    /// The start line and Content-Length are left out. Nothing is written
    /// for a message without headers or body.
    pub fn encode_embedded(&self, out: &mut BytesMut) -> Result<()> {
        let mut escaped = Vec::new();
        let mut first = true;
        let mut separator = |out: &mut BytesMut| {
            out.put_u8(if first { b'?' } else { b'&' });
            first = false;
        };

        for unit in self.header_units()? {
            separator(out);
            escaped.clear();
            escape_uri_header(unit.name.as_bytes(), &mut escaped);
            escaped.push(b'=');
            escape_uri_header(&unit.value, &mut escaped);
            out.put_slice(&escaped);
        }

        let body = self.contents.encoded_body(&self.arena)?;
        if !body.is_empty() {
            separator(out);
            escaped.clear();
            escape_uri_header(&body, &mut escaped);
            out.put_slice(b"body=");
            out.put_slice(&escaped);
        }
        Ok(())
    }

    /// The full encoding as a new buffer
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut out = BytesMut::new();
        self.encode(&mut out)?;
        Ok(out.freeze())
    }
}
