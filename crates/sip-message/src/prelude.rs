//! # Prelude
//!
//! The most common types and traits, imported with
//! `use rvoip_sip_message::prelude::*;`

pub use crate::buffer::{BufferArena, BufferId, Span};
pub use crate::contents::{Contents, MultipartContents, MimePart, OctetContents, PlainContents, SdpContents};
pub use crate::error::{Error, Result};
pub use crate::header::{h, HeaderKind, HeaderType, ParserContainer, RawHeader};
pub use crate::message::SipMessage;
pub use crate::parser::{ParseMode, ParseOptions, MAX_BODY_SIZE, MAX_HEADER_COUNT, MAX_LINE_LENGTH};
pub use crate::serialization::EncodedCache;
pub use crate::types::{
    CSeq, CallId, Method, Mime, NameAddr, RequestLine, StatusLine, StringCategory, TransportType, Tuple, Uri,
    Version, Via,
};
