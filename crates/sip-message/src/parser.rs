//! # Wire factory
//!
//! Frames one SIP message out of a received buffer. The buffer is handed to
//! the message's arena and everything else is recorded as spans into it:
//! the start line, each header (value and whole line, folding included) and
//! the body. Header values are not parsed here; that happens per kind on
//! first typed access.
//!
//! [`ParseOptions`] bound the input and pick between strict RFC 3261 framing
//! and a lenient mode that recovers from common framing errors.

use std::ops::Range;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::buffer::BufferId;
use crate::error::{Error, Result};
use crate::header::h;
use crate::message::SipMessage;

/// Maximum length of a single line in a SIP message
pub const MAX_LINE_LENGTH: usize = 8192;
/// Maximum number of header lines in a SIP message
pub const MAX_HEADER_COUNT: usize = 100;
/// Maximum size of a SIP message body
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// How framing errors are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Reject anything RFC 3261 does not allow
    #[default]
    Strict,
    /// Accept bare LF line endings, skip malformed header lines and
    /// truncate Content-Length to the bytes received
    Lenient,
}

/// Limits and mode for [`SipMessage::make_with_options`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub max_line_length: usize,
    pub max_header_count: usize,
    pub max_body_size: usize,
    pub mode: ParseMode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_line_length: MAX_LINE_LENGTH,
            max_header_count: MAX_HEADER_COUNT,
            max_body_size: MAX_BODY_SIZE,
            mode: ParseMode::Strict,
        }
    }
}

impl ParseOptions {
    /// Default limits in [`ParseMode::Lenient`]
    pub fn lenient() -> Self {
        ParseOptions {
            mode: ParseMode::Lenient,
            ..Default::default()
        }
    }

    // Fails in strict mode, logs and carries on in lenient mode.
    fn recover(&self, error: Error) -> Result<()> {
        match self.mode {
            ParseMode::Strict => Err(error),
            ParseMode::Lenient => {
                warn!(%error, "recovered from framing error");
                Ok(())
            }
        }
    }
}

/// One line of the buffer
struct Line {
    start: usize,
    /// End of the content, before CRLF or LF
    end: usize,
    /// Start of the next line
    next: usize,
    bare_lf: bool,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A header line whose continuation lines have not all been seen yet
struct PendingHeader {
    name: Range<usize>,
    value_start: usize,
    line_start: usize,
    end: usize,
}

fn next_line(data: &[u8], start: usize) -> Line {
    match data[start..].iter().position(|&b| b == b'\n') {
        Some(i) => {
            let lf = start + i;
            let crlf = lf > start && data[lf - 1] == b'\r';
            Line {
                start,
                end: if crlf { lf - 1 } else { lf },
                next: lf + 1,
                bare_lf: !crlf,
            }
        }
        None => Line {
            start,
            end: data.len(),
            next: data.len(),
            bare_lf: false,
        },
    }
}

fn is_wsp(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn skip_leading_line_ends(data: &[u8]) -> usize {
    // RFC 3261 7.5: CRLFs before the start line are ignored
    let mut pos = 0;
    loop {
        match (data.get(pos), data.get(pos + 1)) {
            (Some(b'\r'), Some(b'\n')) => pos += 2,
            (Some(b'\n'), _) => pos += 1,
            _ => return pos,
        }
    }
}

fn header_start(data: &[u8], line: &Line) -> Option<PendingHeader> {
    let text = &data[line.start..line.end];
    let colon = text.iter().position(|&b| b == b':')?;
    let mut name_end = colon;
    while name_end > 0 && is_wsp(text[name_end - 1]) {
        name_end -= 1;
    }
    if name_end == 0 {
        return None;
    }
    let mut value_start = colon + 1;
    while value_start < text.len() && is_wsp(text[value_start]) {
        value_start += 1;
    }
    Some(PendingHeader {
        name: line.start..line.start + name_end,
        value_start: line.start + value_start,
        line_start: line.start,
        end: line.end,
    })
}

struct Framer<'a> {
    data: &'a [u8],
    id: BufferId,
    options: &'a ParseOptions,
    header_count: usize,
}

impl Framer<'_> {
    fn check_line(&self, line: &Line) -> Result<()> {
        if line.end - line.start > self.options.max_line_length {
            return Err(Error::invalid_format(format!(
                "line of {} bytes exceeds the {} byte limit",
                line.end - line.start,
                self.options.max_line_length
            )));
        }
        if line.bare_lf {
            self.options.recover(Error::invalid_format("line terminated by a bare LF"))?;
        }
        Ok(())
    }

    fn commit(&mut self, msg: &mut SipMessage, header: PendingHeader) -> Result<()> {
        self.header_count += 1;
        if self.header_count > self.options.max_header_count {
            return Err(Error::invalid_format(format!(
                "more than {} headers",
                self.options.max_header_count
            )));
        }
        let name = std::str::from_utf8(&self.data[header.name.clone()])
            .map_err(|_| Error::invalid_format("header name is not valid UTF-8"))?;

        let mut value_end = header.end;
        while value_end > header.value_start && is_wsp(self.data[value_end - 1]) {
            value_end -= 1;
        }
        let value_start = header.value_start.min(value_end);
        let value = msg.arena.span(self.id, value_start..value_end)?;
        let line = msg.arena.span(self.id, header.line_start..header.end)?;
        match msg.add_header(name, value, Some(line)) {
            Ok(()) => Ok(()),
            Err(error) => self.options.recover(error),
        }
    }

    /// Frames start line and headers, returning where the body starts.
    fn headers(&mut self, msg: &mut SipMessage) -> Result<usize> {
        let data = self.data;
        let mut pos = skip_leading_line_ends(data);
        if pos >= data.len() {
            return Err(Error::malformed_start_line("message is empty"));
        }

        let start_line = next_line(data, pos);
        self.check_line(&start_line)?;
        msg.set_start_line(msg.arena.span(self.id, start_line.start..start_line.end)?)?;
        pos = start_line.next;

        let mut pending: Option<PendingHeader> = None;
        let body_start = loop {
            if pos >= data.len() {
                self.options
                    .recover(Error::invalid_format("missing blank line after headers"))?;
                break data.len();
            }
            let line = next_line(data, pos);
            self.check_line(&line)?;
            pos = line.next;

            if line.is_empty() {
                break pos;
            }
            if is_wsp(data[line.start]) {
                match pending.as_mut() {
                    Some(header) => header.end = line.end,
                    None => self
                        .options
                        .recover(Error::invalid_format("continuation line before the first header"))?,
                }
                continue;
            }
            if let Some(header) = pending.take() {
                self.commit(msg, header)?;
            }
            match header_start(data, &line) {
                Some(header) => pending = Some(header),
                None => self.options.recover(Error::invalid_format(format!(
                    "header line without a name and colon: '{}'",
                    String::from_utf8_lossy(&data[line.start..line.end])
                )))?,
            }
        };
        if let Some(header) = pending.take() {
            self.commit(msg, header)?;
        }
        Ok(body_start)
    }

    fn body(&self, msg: &mut SipMessage, body_start: usize) -> Result<usize> {
        let available = self.data.len() - body_start;
        let declared = match msg.header(h::ContentLength) {
            Ok(length) => Some(length.value as usize),
            Err(Error::HeaderNotPresent { .. }) => None,
            Err(error) => {
                self.options.recover(error)?;
                None
            }
        };

        let len = match declared {
            Some(len) if len <= available => {
                if len < available {
                    trace!(ignored = available - len, "bytes after the declared body");
                }
                len
            }
            Some(len) => {
                self.options.recover(Error::invalid_format(format!(
                    "Content-Length {len} exceeds the {available} body bytes received"
                )))?;
                available
            }
            None => available,
        };
        if len > self.options.max_body_size {
            return Err(Error::invalid_format(format!(
                "body of {len} bytes exceeds the {} byte limit",
                self.options.max_body_size
            )));
        }
        if len > 0 {
            let span = msg.arena.span(self.id, body_start..body_start + len)?;
            msg.contents.set_body(span);
        }
        Ok(len)
    }
}

impl SipMessage {
    /// Parses a message from a received buffer, taking ownership of it.
    ///
    /// Uses the default [`ParseOptions`].
    pub fn make(buffer: impl Into<Bytes>, is_external: bool) -> Result<SipMessage> {
        SipMessage::make_with_options(buffer, is_external, &ParseOptions::default())
    }

    /// Parses a message from a received buffer with explicit limits and mode.
    ///
    /// A malformed start line always fails with
    /// [`Error::MalformedStartLine`]; other framing errors fail with
    /// [`Error::InvalidFormat`] unless the mode recovers from them.
    pub fn make_with_options(
        buffer: impl Into<Bytes>,
        is_external: bool,
        options: &ParseOptions,
    ) -> Result<SipMessage> {
        let data: Bytes = buffer.into();
        let mut msg = SipMessage::new();
        if is_external {
            msg.set_from_external();
        }
        let id = msg.add_buffer(data.clone());

        let mut framer = Framer {
            data: &data,
            id,
            options,
            header_count: 0,
        };
        let body_start = framer.headers(&mut msg)?;
        let body_len = framer.body(&mut msg, body_start)?;

        debug!(
            request = msg.is_request().unwrap_or_default(),
            headers = framer.header_count,
            body = body_len,
            "parsed SIP message"
        );
        Ok(msg)
    }
}
