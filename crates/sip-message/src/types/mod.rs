//! # Value types
//!
//! Typed representations of start lines, URIs, endpoints and header values.
//!
//! Each header kind in [`HeaderKind`](crate::header::HeaderKind) parses into
//! one of the categories below:
//!
//! | Category | Headers |
//! |---|---|
//! | [`CSeq`] | CSeq |
//! | [`CallId`] | Call-ID, In-Reply-To, Replaces |
//! | [`NameAddr`] | From, To, Contact, Route, Record-Route, Refer-To, ... |
//! | [`Via`] | Via |
//! | [`Mime`] | Content-Type, Accept |
//! | [`IntegerCategory`] | Content-Length, Max-Forwards, Expires, ... |
//! | [`Token`] | Event, Supported, Require, Allow, ... |
//! | [`Auth`] | Authorization, WWW-Authenticate, ... |
//! | [`Warning`] | Warning |
//! | [`StringCategory`] | Subject, User-Agent, Date, unknown headers |

pub mod auth;
pub mod call_id;
pub mod cseq;
pub mod integer;
pub mod method;
pub mod mime;
pub mod name_addr;
pub mod param;
pub mod start_line;
pub mod string;
pub mod token;
pub mod tuple;
pub mod uri;
pub mod version;
pub mod via;
pub mod warning;

pub use auth::Auth;
pub use call_id::CallId;
pub use cseq::CSeq;
pub use integer::IntegerCategory;
pub use method::Method;
pub use mime::Mime;
pub use name_addr::NameAddr;
pub use param::{Param, Params};
pub use start_line::{RequestLine, StartLine, StatusLine};
pub use string::StringCategory;
pub use token::Token;
pub use tuple::{TransportType, Tuple};
pub use uri::Uri;
pub use version::Version;
pub use via::{Via, BRANCH_MAGIC_COOKIE};
pub use warning::Warning;
