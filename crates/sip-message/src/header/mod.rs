//! # Header storage and typed dispatch
//!
//! Headers are stored raw, as spans into the message's buffers, and parsed
//! per kind on first typed access:
//!
//! - [`HeaderTable`] holds one slot per [`HeaderKind`]
//! - [`UnknownHeaders`] holds everything else, in arrival order
//! - [`HeaderFieldValueList`] is the per-kind list of raw occurrences plus
//!   the cached [`ParserContainer`] built from them
//! - [`h`] provides one tag type per kind for the generic accessors
//!   [`SipMessage::header`](crate::SipMessage::header) and
//!   [`SipMessage::header_mut`](crate::SipMessage::header_mut)
//!
//! ```rust
//! use rvoip_sip_message::prelude::*;
//!
//! let msg = SipMessage::make(
//!     &b"OPTIONS sip:carol@chicago.com SIP/2.0\r\n\
//!        Via: SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bKhjhs8ass877\r\n\
//!        Call-ID: a84b4c76e66710\r\n\
//!        CSeq: 63104 OPTIONS\r\n\
//!        Content-Length: 0\r\n\r\n"[..],
//!     true,
//! ).unwrap();
//!
//! assert_eq!(msg.header(h::CSeq).unwrap().sequence, 63104);
//! assert_eq!(msg.header(h::Vias).unwrap().len(), 1);
//! assert!(msg.header(h::Contacts).is_err());
//! ```

mod category;
mod field;
mod kind;
mod raw;
mod table;
mod unknown;

pub use category::{ParserCategory, ParserContainer};
pub use field::{HeaderFieldValue, HeaderFieldValueList};
pub use kind::{h, HeaderKind, HeaderType};
pub use raw::RawHeader;
pub use table::HeaderTable;
pub use unknown::{UnknownHeaderEntry, UnknownHeaders};
