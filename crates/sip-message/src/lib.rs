//! In-memory SIP message for the rvoip stack
//!
//! A [`SipMessage`] owns the buffers it was received in and keeps its
//! headers as spans into them. Each header kind is parsed into its typed
//! form only when first accessed, and a message that was only read encodes
//! back to the exact bytes it came from.
//!
//! ```rust
//! use rvoip_sip_message::prelude::*;
//!
//! let wire = &b"SIP/2.0 180 Ringing\r\n\
//!     Via: SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bK776asdhds\r\n\
//!     To: Bob <sip:bob@biloxi.com>;tag=a6c85cf\r\n\
//!     From: Alice <sip:alice@atlanta.com>;tag=1928301774\r\n\
//!     Call-ID: a84b4c76e66710@pc33.atlanta.com\r\n\
//!     CSeq: 314159 INVITE\r\n\
//!     Content-Length: 0\r\n\r\n"[..];
//!
//! let msg = SipMessage::make(wire, true).unwrap();
//! assert!(msg.is_response().unwrap());
//! assert_eq!(msg.transaction_id().unwrap(), "z9hG4bK776asdhds");
//! assert_eq!(msg.header(h::To).unwrap().tag().as_deref(), Some("a6c85cf"));
//! assert_eq!(msg.to_bytes().unwrap(), wire);
//! ```

pub mod buffer;
pub mod contents;
pub mod encode;
pub mod error;
mod grammar;
pub mod header;
pub mod message;
pub mod parser;
pub mod prelude;
pub mod serialization;
pub mod transaction;
pub mod types;

pub use error::{Error, Result};
pub use message::SipMessage;
pub use parser::{ParseMode, ParseOptions};
pub use serialization::EncodedCache;
