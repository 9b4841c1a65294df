//! # SIP message
//!
//! [`SipMessage`] ties together the start line, the header table, the
//! unknown-header registry, the body and the buffer arena every raw span
//! points into, plus the routing metadata the transport and transaction
//! layers attach to a message in flight.
//!
//! Messages come from two places:
//!
//! - the wire, through [`SipMessage::make`] (or the lower-level
//!   [`add_buffer`](SipMessage::add_buffer) /
//!   [`set_start_line`](SipMessage::set_start_line) /
//!   [`add_header`](SipMessage::add_header) sequence a transport scanner uses)
//! - the transaction user, through [`SipMessage::request`] or
//!   [`SipMessage::response`] followed by typed header access
//!
//! ```rust
//! use rvoip_sip_message::prelude::*;
//!
//! let uri: Uri = "sip:bob@biloxi.com".parse().unwrap();
//! let mut msg = SipMessage::request(Method::Invite, uri);
//! msg.header_mut(h::CallId).unwrap().value = "a84b4c76e66710@pc33".to_string();
//! msg.header_mut(h::CSeq).unwrap().sequence = 1;
//!
//! assert!(msg.is_request().unwrap());
//! assert!(msg.exists(h::CallId));
//! assert!(!msg.exists(h::Contacts));
//! ```

use std::cell::OnceCell;
use std::fmt;

use bytes::{Bytes, BytesMut};
use chrono::Utc;
use tracing::{debug, trace};

use crate::buffer::{BufferArena, BufferId, Span};
use crate::contents::{ContentContainer, Contents};
use crate::error::{Error, Result};
use crate::grammar::is_token_char;
use crate::header::{
    h, HeaderFieldValue, HeaderKind, HeaderTable, HeaderType, ParserCategory, ParserContainer, RawHeader,
    UnknownHeaderEntry, UnknownHeaders,
};
use crate::types::{Method, Mime, RequestLine, StartLine, StatusLine, StringCategory, Tuple, Uri};

/// The start line as received (or built) and its parsed form
#[derive(Debug, Clone)]
pub(crate) struct StartLineSlot {
    /// Received bytes, re-emitted until the line is modified
    pub(crate) raw: Option<Span>,
    pub(crate) parsed: StartLine,
    pub(crate) touched: bool,
}

impl StartLineSlot {
    fn built(parsed: StartLine) -> Self {
        StartLineSlot {
            raw: None,
            parsed,
            touched: true,
        }
    }
}

/// A SIP request or response.
///
/// The message exclusively owns every buffer its header values and body
/// point into. Typed views are parsed lazily and cached inside the message,
/// including from `&self` methods, so a message is `Send` but not `Sync`:
/// it moves between pipeline stages but is never shared between threads.
#[derive(Debug)]
pub struct SipMessage {
    pub(crate) start_line: Option<StartLineSlot>,
    pub(crate) external: bool,
    pub(crate) headers: HeaderTable,
    pub(crate) unknown: UnknownHeaders,
    pub(crate) contents: ContentContainer,
    pub(crate) arena: BufferArena,
    pub(crate) next_order: u64,
    source: Option<Tuple>,
    destination: Option<Tuple>,
    received_transport: Option<Tuple>,
    force_target: Option<Box<Uri>>,
    tls_domain: Option<String>,
    created_micros: i64,
    pub(crate) rfc2543_tid: OnceCell<String>,
    pub(crate) encoded: Option<Bytes>,
}

pub(crate) fn next_order(counter: &mut u64) -> u64 {
    let order = *counter;
    *counter += 1;
    order
}

// The first Content-Type value, parsed
fn content_type<'a>(headers: &'a HeaderTable, arena: &'a BufferArena) -> Result<Option<&'a Mime>> {
    match headers.get(HeaderKind::ContentType) {
        Some(list) => Ok(list
            .parsed::<Mime>(arena, HeaderKind::ContentType.as_str())?
            .front()),
        None => Ok(None),
    }
}

fn check_header_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(is_token_char) {
        return Err(Error::invalid_header(name, "invalid header name"));
    }
    Ok(())
}

fn check_unknown_name(name: &str) -> Result<()> {
    check_header_name(name)?;
    match HeaderKind::from_name(name) {
        Some(kind) => Err(Error::invalid_header(
            name,
            format!("{kind} is a known header, use the typed accessor"),
        )),
        None => Ok(()),
    }
}

impl SipMessage {
    /// An empty, locally built message with no start line.
    pub fn new() -> Self {
        SipMessage {
            start_line: None,
            external: false,
            headers: HeaderTable::new(),
            unknown: UnknownHeaders::new(),
            contents: ContentContainer::new(),
            arena: BufferArena::new(),
            next_order: 0,
            source: None,
            destination: None,
            received_transport: None,
            force_target: None,
            tls_domain: None,
            created_micros: Utc::now().timestamp_micros(),
            rfc2543_tid: OnceCell::new(),
            encoded: None,
        }
    }

    /// An empty message that arrived on `transport`.
    ///
    /// The transport then hands over its buffer with
    /// [`add_buffer`](Self::add_buffer) and feeds the scanned start line and
    /// headers in.
    pub fn from_wire(transport: Tuple) -> Self {
        let mut msg = SipMessage::new();
        msg.external = true;
        msg.received_transport = Some(transport);
        msg.source = Some(transport);
        msg
    }

    /// A locally built request
    pub fn request(method: Method, uri: Uri) -> Self {
        let mut msg = SipMessage::new();
        msg.start_line = Some(StartLineSlot::built(StartLine::Request(RequestLine::new(method, uri))));
        msg
    }

    /// A locally built response
    pub fn response(code: u16, reason: impl Into<String>) -> Self {
        let mut msg = SipMessage::new();
        msg.start_line = Some(StartLineSlot::built(StartLine::Response(StatusLine::new(code, reason))));
        msg
    }

    /// Takes ownership of a raw buffer; spans into it may then be handed to
    /// [`set_start_line`](Self::set_start_line), [`add_header`](Self::add_header)
    /// and [`set_body_span`](Self::set_body_span).
    pub fn add_buffer(&mut self, buffer: impl Into<Bytes>) -> BufferId {
        self.arena.add_buffer(buffer)
    }

    /// The buffers this message owns
    pub fn arena(&self) -> &BufferArena {
        &self.arena
    }

    /// Sets and classifies the start line.
    ///
    /// The kind of a message is fixed by its start line, so this may only be
    /// called once.
    pub fn set_start_line(&mut self, span: Span) -> Result<()> {
        if self.start_line.is_some() {
            return Err(Error::malformed_start_line("start line is already set"));
        }
        let text = std::str::from_utf8(self.arena.resolve(&span)?)
            .map_err(|_| Error::malformed_start_line("start line is not valid UTF-8"))?;
        let parsed = StartLine::parse(text)?;
        trace!(request = parsed.is_request(), "classified start line");
        self.start_line = Some(StartLineSlot {
            raw: Some(span),
            parsed,
            touched: false,
        });
        Ok(())
    }

    pub fn is_request(&self) -> Result<bool> {
        self.start_line
            .as_ref()
            .map(|slot| slot.parsed.is_request())
            .ok_or_else(Error::no_start_line)
    }

    pub fn is_response(&self) -> Result<bool> {
        self.is_request().map(|request| !request)
    }

    pub fn request_line(&self) -> Result<&RequestLine> {
        match &self.start_line {
            Some(StartLineSlot { parsed: StartLine::Request(line), .. }) => Ok(line),
            Some(_) => Err(Error::malformed_start_line("message is a response")),
            None => Err(Error::no_start_line()),
        }
    }

    /// The request line for modification; it is re-rendered on encode.
    pub fn request_line_mut(&mut self) -> Result<&mut RequestLine> {
        let slot = self.start_line.as_mut().ok_or_else(Error::no_start_line)?;
        match &mut slot.parsed {
            StartLine::Request(line) => {
                slot.touched = true;
                Ok(line)
            }
            StartLine::Response(_) => Err(Error::malformed_start_line("message is a response")),
        }
    }

    pub fn status_line(&self) -> Result<&StatusLine> {
        match &self.start_line {
            Some(StartLineSlot { parsed: StartLine::Response(line), .. }) => Ok(line),
            Some(_) => Err(Error::malformed_start_line("message is a request")),
            None => Err(Error::no_start_line()),
        }
    }

    /// The status line for modification; it is re-rendered on encode.
    pub fn status_line_mut(&mut self) -> Result<&mut StatusLine> {
        let slot = self.start_line.as_mut().ok_or_else(Error::no_start_line)?;
        match &mut slot.parsed {
            StartLine::Response(line) => {
                slot.touched = true;
                Ok(line)
            }
            StartLine::Request(_) => Err(Error::malformed_start_line("message is a request")),
        }
    }

    /// Adds one raw header occurrence.
    ///
    /// `value` covers the text after the colon; `line`, if given, the whole
    /// header line, which is what the encoder re-emits while the header is
    /// untouched. Both must point into buffers this message owns. Known
    /// names (including compact forms) go to the header table, anything else
    /// to the unknown-header registry. Nothing is parsed here.
    pub fn add_header(&mut self, name: &str, value: Span, line: Option<Span>) -> Result<()> {
        check_header_name(name)?;
        self.arena.resolve(&value)?;
        if let Some(line) = &line {
            self.arena.resolve(line)?;
        }

        let order = next_order(&mut self.next_order);
        let field = HeaderFieldValue::new(value, line, order);
        match HeaderKind::from_name(name) {
            Some(kind) => self
                .headers
                .get_or_insert(kind, || order)
                .push(field, &self.arena, kind.as_str()),
            None => self
                .unknown
                .get_or_insert(name, || order)
                .values_mut()
                .push(field, &self.arena, name),
        }
    }

    /// Copies `Name: value` into a new buffer and adds it as if it had been
    /// received.
    pub fn add_raw_header(&mut self, name: &str, value: &str) -> Result<()> {
        let line = format!("{name}: {value}");
        let span = self.arena.add_copy(line.as_bytes());
        let value = span
            .slice(name.len() + 2..line.len())
            .ok_or_else(Error::invalid_span)?;
        self.add_header(name, value, Some(span))
    }

    /// Read-only typed access.
    ///
    /// Parses the header on first use and caches the result. Fails with
    /// [`Error::HeaderNotPresent`] if the message does not carry it, and
    /// with [`Error::InvalidHeader`] if its value does not parse.
    pub fn header<H: HeaderType>(&self, _header: H) -> Result<&H::Access> {
        let kind = H::KIND;
        let list = self
            .headers
            .get(kind)
            .ok_or_else(|| Error::header_not_present(kind.as_str()))?;
        let container = list.parsed::<H::Value>(&self.arena, kind.as_str())?;
        H::access(container).ok_or_else(|| Error::header_not_present(kind.as_str()))
    }

    /// Mutable typed access, creating the header if absent.
    ///
    /// A single-valued header gets a default value; a multi-valued one an
    /// empty list. From now on the encoder renders this header from its
    /// parsed form.
    pub fn header_mut<H: HeaderType>(&mut self, _header: H) -> Result<&mut H::Access> {
        let kind = H::KIND;
        let counter = &mut self.next_order;
        let list = self.headers.get_or_insert(kind, || next_order(counter));
        let container = list.parsed_mut::<H::Value>(&self.arena, kind.as_str())?;
        Ok(H::access_mut(container))
    }

    pub fn exists(&self, kind: impl Into<HeaderKind>) -> bool {
        self.headers.contains(kind.into())
    }

    /// Removes every occurrence of a header. No-op if absent.
    pub fn remove(&mut self, kind: impl Into<HeaderKind>) {
        self.headers.remove(kind.into());
    }

    /// Read-only access to an unknown header's values.
    ///
    /// Fails with [`Error::HeaderNotPresent`] if the message does not carry
    /// `name`, and with [`Error::InvalidHeader`] if `name` is a known header.
    pub fn unknown_header(&self, name: &str) -> Result<&ParserContainer<StringCategory>> {
        check_unknown_name(name)?;
        let entry = self
            .unknown
            .get(name)
            .ok_or_else(|| Error::header_not_present(name))?;
        entry
            .values()
            .parsed::<StringCategory>(&self.arena, entry.name())
    }

    /// Mutable access to an unknown header's values, creating it if absent.
    pub fn unknown_header_mut(&mut self, name: &str) -> Result<&mut ParserContainer<StringCategory>> {
        check_unknown_name(name)?;
        let counter = &mut self.next_order;
        self.unknown
            .get_or_insert(name, || next_order(counter))
            .values_mut()
            .parsed_mut::<StringCategory>(&self.arena, name)
    }

    pub fn exists_unknown(&self, name: &str) -> bool {
        self.unknown.contains(name)
    }

    /// Removes every occurrence of an unknown header. No-op if absent.
    pub fn remove_unknown(&mut self, name: &str) {
        self.unknown.remove(name);
    }

    /// The raw occurrences of a known header, without parsing them
    pub fn raw_header(&self, kind: impl Into<HeaderKind>) -> Option<RawHeader<'_>> {
        self.headers
            .get(kind.into())
            .map(|list| RawHeader::new(list, &self.arena))
    }

    /// The raw occurrences of an unknown header, without parsing them
    pub fn raw_unknown_header(&self, name: &str) -> Option<RawHeader<'_>> {
        self.unknown
            .get(name)
            .map(|entry| RawHeader::new(entry.values(), &self.arena))
    }

    /// Replaces a known header with a copy of `raw`, which usually comes
    /// from another message.
    ///
    /// The bytes are copied into this message's arena; the copy is parsed
    /// afresh on its next typed access.
    pub fn set_raw_header(&mut self, kind: impl Into<HeaderKind>, raw: &RawHeader<'_>) -> Result<()> {
        let kind = kind.into();
        let list = raw
            .list()
            .copy_into(raw.arena(), &mut self.arena, &mut self.next_order, kind.is_single())?;
        self.headers.insert(kind, list);
        Ok(())
    }

    /// Every unknown header, in order of first appearance
    pub fn raw_unknown_headers(&self) -> &[UnknownHeaderEntry] {
        self.unknown.entries()
    }

    /// The typed body, built from the raw body and Content-Type on first
    /// call and cached. `None` if there is no body or it was released.
    pub fn contents(&self) -> Result<Option<&Contents>> {
        let mime = content_type(&self.headers, &self.arena)?;
        self.contents.contents(&self.arena, mime)
    }

    /// The typed body for modification; it is re-rendered on encode.
    pub fn contents_mut(&mut self) -> Result<Option<&mut Contents>> {
        let mime = content_type(&self.headers, &self.arena)?;
        self.contents.contents_mut(&self.arena, mime)
    }

    /// Moves the typed body out of the message.
    ///
    /// The message is left without a body or Content-Type; a second call
    /// fails with [`Error::ContentsUnavailable`].
    pub fn release_contents(&mut self) -> Result<Contents> {
        let mime = content_type(&self.headers, &self.arena)?;
        let contents = self.contents.release(&self.arena, mime)?;
        self.headers.remove(HeaderKind::ContentType);
        debug!(content_type = %contents.mime(), "released message contents");
        Ok(contents)
    }

    /// Replaces the body, taking ownership of `contents`, and sets
    /// Content-Type to match.
    pub fn set_contents(&mut self, contents: Contents) {
        let mime = contents.mime();
        self.replace_header(HeaderKind::ContentType, std::iter::once(mime).collect());
        self.contents.set_contents(contents);
    }

    /// Replaces the body with a copy of `contents`.
    pub fn set_contents_from(&mut self, contents: &Contents) {
        self.set_contents(contents.clone());
    }

    /// Takes ownership of `body` as the raw, unparsed body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) -> Result<()> {
        let body: Bytes = body.into();
        let len = body.len();
        let id = self.arena.add_buffer(body);
        let span = self.arena.span(id, 0..len)?;
        self.contents.set_body(span);
        Ok(())
    }

    /// Sets the raw body to a span of a buffer this message already owns.
    pub fn set_body_span(&mut self, span: Span) -> Result<()> {
        self.arena.resolve(&span)?;
        self.contents.set_body(span);
        Ok(())
    }

    /// The raw body span, unless the body was replaced or released
    pub fn body(&self) -> Option<Span> {
        self.contents.body()
    }

    // Installs `values` as the parsed form of `kind`, keeping its position.
    fn replace_header<T: ParserCategory>(&mut self, kind: HeaderKind, values: ParserContainer<T>) {
        let counter = &mut self.next_order;
        self.headers
            .get_or_insert(kind, || next_order(counter))
            .replace_parsed(values);
    }

    /// Marks the message as built by the transaction user.
    pub fn set_from_tu(&mut self) {
        self.external = false;
    }

    /// Marks the message as received from the wire.
    pub fn set_from_external(&mut self) {
        self.external = true;
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Whether this message belongs to a client transaction: a response
    /// from the wire or a request built locally.
    pub fn is_client_transaction(&self) -> Result<bool> {
        let request = self.is_request()?;
        Ok(self.external != request)
    }

    /// Forces the next hop regardless of Route headers and the request URI.
    pub fn set_force_target(&mut self, target: Uri) {
        match &mut self.force_target {
            Some(existing) => **existing = target,
            None => self.force_target = Some(Box::new(target)),
        }
    }

    pub fn clear_force_target(&mut self) {
        self.force_target = None;
    }

    pub fn has_force_target(&self) -> bool {
        self.force_target.is_some()
    }

    pub fn force_target(&self) -> Option<&Uri> {
        self.force_target.as_deref()
    }

    /// Where a received message came from
    pub fn set_source(&mut self, source: Tuple) {
        self.source = Some(source);
    }

    pub fn source(&self) -> Option<&Tuple> {
        self.source.as_ref()
    }

    /// Where a locally built message should be sent
    pub fn set_destination(&mut self, destination: Tuple) {
        self.destination = Some(destination);
    }

    pub fn destination(&self) -> Option<&Tuple> {
        self.destination.as_ref()
    }

    /// The transport the message arrived on; `None` for local messages
    pub fn received_transport(&self) -> Option<&Tuple> {
        self.received_transport.as_ref()
    }

    pub fn set_tls_domain(&mut self, domain: impl Into<String>) {
        self.tls_domain = Some(domain.into());
    }

    pub fn tls_domain(&self) -> Option<&str> {
        self.tls_domain.as_deref()
    }

    /// Creation time in microseconds since the Unix epoch
    pub fn created_time_micros(&self) -> i64 {
        self.created_micros
    }

    /// One-line summary for logs
    pub fn brief(&self) -> String {
        let origin = if self.external { "from(wire)" } else { "from(tu)" };
        let tid = self.transaction_id().unwrap_or("-");
        let cseq = match self.header(h::CSeq) {
            Ok(cseq) => cseq.to_string(),
            Err(_) => "-".to_string(),
        };
        match self.start_line.as_ref().map(|slot| &slot.parsed) {
            Some(StartLine::Request(line)) => {
                format!("SipReq: {} {} tid={tid} cseq={cseq} {origin}", line.method, line.uri)
            }
            Some(StartLine::Response(line)) => {
                format!("SipResp: {} tid={tid} cseq={cseq} {origin}", line.code)
            }
            None => format!("SipMessage: no start line {origin}"),
        }
    }
}

impl Default for SipMessage {
    fn default() -> Self {
        SipMessage::new()
    }
}

impl Clone for SipMessage {
    /// Deep copy: the clone owns copies of every buffer, parsed header and
    /// the body. The cached encoding is not carried over.
    fn clone(&self) -> Self {
        SipMessage {
            start_line: self.start_line.clone(),
            external: self.external,
            headers: self.headers.clone(),
            unknown: self.unknown.clone(),
            contents: self.contents.clone(),
            arena: self.arena.clone(),
            next_order: self.next_order,
            source: self.source,
            destination: self.destination,
            received_transport: self.received_transport,
            force_target: self.force_target.clone(),
            tls_domain: self.tls_domain.clone(),
            created_micros: self.created_micros,
            rfc2543_tid: self.rfc2543_tid.clone(),
            encoded: None,
        }
    }
}

impl fmt::Display for SipMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = BytesMut::new();
        self.encode(&mut out).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&out))
    }
}
