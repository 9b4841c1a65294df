//! Known header kinds and the typed accessor tags in [`h`].
//!
//! The kinds, their wire names, compact forms, arity and value category are
//! declared once in the `define_headers!` table below. From that table come
//! the [`HeaderKind`] enumeration (which indexes the message's header table),
//! the name lookup used by the wire parser, and one zero-sized tag type per
//! kind in [`h`] implementing [`HeaderType`].
//!
//! ```rust
//! use rvoip_sip_message::header::{h, HeaderKind, HeaderType};
//!
//! assert_eq!(HeaderKind::from_name("v"), Some(HeaderKind::Via));
//! assert_eq!(HeaderKind::from_name("call-id"), Some(HeaderKind::CallId));
//! assert_eq!(HeaderKind::from_name("X-Custom"), None);
//! assert_eq!(h::CSeq::KIND, HeaderKind::CSeq);
//! assert!(HeaderKind::CSeq.is_single());
//! assert!(!HeaderKind::Via.is_single());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::header::category::{ParserCategory, ParserContainer};

/// Static description of one known header kind
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderDef {
    name: &'static str,
    compact: Option<char>,
    single: bool,
}

/// Binds a tag type in [`h`] to its header kind and value category.
///
/// Single-valued kinds give direct access to their one value; multi-valued
/// kinds give access to the ordered container of all values.
pub trait HeaderType: Copy + Into<HeaderKind> {
    const KIND: HeaderKind;

    /// The category each value of this header parses into
    type Value: ParserCategory;

    /// What the typed accessors hand out
    type Access: ?Sized;

    /// Read-only view; `None` if the parsed container holds no value.
    fn access(container: &ParserContainer<Self::Value>) -> Option<&Self::Access>;

    /// Mutable view. Single-valued kinds insert a default value if empty.
    fn access_mut(container: &mut ParserContainer<Self::Value>) -> &mut Self::Access;
}

macro_rules! define_headers {
    (@single single) => { true };
    (@single multi) => { false };

    (@impl single $marker:ident $variant:ident $category:ty) => {
        impl HeaderType for $marker {
            const KIND: HeaderKind = HeaderKind::$variant;
            type Value = $category;
            type Access = $category;

            fn access(container: &ParserContainer<$category>) -> Option<&$category> {
                container.front()
            }

            fn access_mut(container: &mut ParserContainer<$category>) -> &mut $category {
                container.front_or_insert_default()
            }
        }
    };

    (@impl multi $marker:ident $variant:ident $category:ty) => {
        impl HeaderType for $marker {
            const KIND: HeaderKind = HeaderKind::$variant;
            type Value = $category;
            type Access = ParserContainer<$category>;

            fn access(container: &ParserContainer<$category>) -> Option<&ParserContainer<$category>> {
                Some(container)
            }

            fn access_mut(container: &mut ParserContainer<$category>) -> &mut ParserContainer<$category> {
                container
            }
        }
    };

    ($( $arity:ident $marker:ident => $variant:ident, $name:literal, $compact:expr, $category:ty; )*) => {
        /// A header the message knows how to parse
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum HeaderKind {
            $(
                #[doc = $name]
                $variant,
            )*
        }

        const HEADER_DEFS: &[HeaderDef] = &[
            $( HeaderDef { name: $name, compact: $compact, single: define_headers!(@single $arity) }, )*
        ];

        impl HeaderKind {
            /// Every known kind, in table order
            pub const ALL: &'static [HeaderKind] = &[ $( HeaderKind::$variant, )* ];
        }

        /// Typed accessor tags, one per known header kind.
        ///
        /// Multi-valued kinds use plural names (`h::Vias`, `h::Contacts`).
        pub mod h {
            use super::{HeaderKind, HeaderType};
            use crate::header::category::ParserContainer;

            $(
                #[doc = concat!("The `", $name, "` header")]
                #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
                pub struct $marker;

                // `h::From` shadows the prelude trait in this module
                impl ::core::convert::From<$marker> for HeaderKind {
                    fn from(_: $marker) -> HeaderKind {
                        HeaderKind::$variant
                    }
                }

                define_headers!(@impl $arity $marker $variant $category);
            )*
        }
    };
}

define_headers! {
    single CSeq => CSeq, "CSeq", None, crate::types::CSeq;
    single CallId => CallId, "Call-ID", Some('i'), crate::types::CallId;
    single AuthenticationInfo => AuthenticationInfo, "Authentication-Info", None, crate::types::Auth;
    single ContentDisposition => ContentDisposition, "Content-Disposition", None, crate::types::Token;
    single ContentTransferEncoding => ContentTransferEncoding, "Content-Transfer-Encoding", None, crate::types::StringCategory;
    single ContentEncoding => ContentEncoding, "Content-Encoding", Some('e'), crate::types::Token;
    single ContentLength => ContentLength, "Content-Length", Some('l'), crate::types::IntegerCategory;
    single ContentType => ContentType, "Content-Type", Some('c'), crate::types::Mime;
    single Date => Date, "Date", None, crate::types::StringCategory;
    single Event => Event, "Event", Some('o'), crate::types::Token;
    single Expires => Expires, "Expires", None, crate::types::IntegerCategory;
    single From => From, "From", Some('f'), crate::types::NameAddr;
    single MimeVersion => MimeVersion, "MIME-Version", None, crate::types::Token;
    single MaxForwards => MaxForwards, "Max-Forwards", None, crate::types::IntegerCategory;
    single MinExpires => MinExpires, "Min-Expires", None, crate::types::IntegerCategory;
    single Organization => Organization, "Organization", None, crate::types::StringCategory;
    single Priority => Priority, "Priority", None, crate::types::Token;
    single ReferTo => ReferTo, "Refer-To", Some('r'), crate::types::NameAddr;
    single ReferredBy => ReferredBy, "Referred-By", Some('b'), crate::types::NameAddr;
    single Replaces => Replaces, "Replaces", None, crate::types::CallId;
    single ReplyTo => ReplyTo, "Reply-To", None, crate::types::NameAddr;
    single RetryAfter => RetryAfter, "Retry-After", None, crate::types::IntegerCategory;
    single Server => Server, "Server", None, crate::types::StringCategory;
    single Subject => Subject, "Subject", Some('s'), crate::types::StringCategory;
    single SubscriptionState => SubscriptionState, "Subscription-State", None, crate::types::Token;
    single Timestamp => Timestamp, "Timestamp", None, crate::types::StringCategory;
    single To => To, "To", Some('t'), crate::types::NameAddr;
    single UserAgent => UserAgent, "User-Agent", None, crate::types::StringCategory;

    multi Accepts => Accept, "Accept", None, crate::types::Mime;
    multi AcceptEncodings => AcceptEncoding, "Accept-Encoding", None, crate::types::Token;
    multi AcceptLanguages => AcceptLanguage, "Accept-Language", None, crate::types::Token;
    multi AlertInfos => AlertInfo, "Alert-Info", None, crate::types::NameAddr;
    multi Allows => Allow, "Allow", None, crate::types::Token;
    multi AllowEvents => AllowEvents, "Allow-Events", Some('u'), crate::types::Token;
    multi Authorizations => Authorization, "Authorization", None, crate::types::Auth;
    multi CallInfos => CallInfo, "Call-Info", None, crate::types::NameAddr;
    multi Contacts => Contact, "Contact", Some('m'), crate::types::NameAddr;
    multi ContentLanguages => ContentLanguage, "Content-Language", None, crate::types::Token;
    multi ErrorInfos => ErrorInfo, "Error-Info", None, crate::types::NameAddr;
    multi InReplyTo => InReplyTo, "In-Reply-To", None, crate::types::CallId;
    multi ProxyAuthenticates => ProxyAuthenticate, "Proxy-Authenticate", None, crate::types::Auth;
    multi ProxyAuthorizations => ProxyAuthorization, "Proxy-Authorization", None, crate::types::Auth;
    multi ProxyRequires => ProxyRequire, "Proxy-Require", None, crate::types::Token;
    multi RecordRoutes => RecordRoute, "Record-Route", None, crate::types::NameAddr;
    multi Requires => Require, "Require", None, crate::types::Token;
    multi Routes => Route, "Route", None, crate::types::NameAddr;
    multi SecurityClients => SecurityClient, "Security-Client", None, crate::types::Token;
    multi SecurityServers => SecurityServer, "Security-Server", None, crate::types::Token;
    multi SecurityVerifies => SecurityVerify, "Security-Verify", None, crate::types::Token;
    multi Supporteds => Supported, "Supported", Some('k'), crate::types::Token;
    multi Unsupporteds => Unsupported, "Unsupported", None, crate::types::Token;
    multi Vias => Via, "Via", Some('v'), crate::types::Via;
    multi Warnings => Warning, "Warning", None, crate::types::Warning;
    multi WwwAuthenticates => WwwAuthenticate, "WWW-Authenticate", None, crate::types::Auth;
}

impl HeaderKind {
    /// Number of known kinds; the size of the header table
    pub const COUNT: usize = HEADER_DEFS.len();

    /// Slot of this kind in the header table
    pub fn index(self) -> usize {
        self as usize
    }

    fn def(self) -> &'static HeaderDef {
        &HEADER_DEFS[self.index()]
    }

    /// Canonical wire name
    pub fn as_str(self) -> &'static str {
        self.def().name
    }

    /// RFC 3261 compact form, if the header has one
    pub fn compact_form(self) -> Option<char> {
        self.def().compact
    }

    /// Whether the kind carries exactly one value
    pub fn is_single(self) -> bool {
        self.def().single
    }

    /// Looks up a header name case-insensitively, accepting compact forms.
    pub fn from_name(name: &str) -> Option<HeaderKind> {
        let name = name.trim();
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return HeaderKind::ALL
                .iter()
                .copied()
                .find(|kind| kind.compact_form().is_some_and(|compact| compact.eq_ignore_ascii_case(&c)));
        }
        HeaderKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_consistent() {
        assert_eq!(HeaderKind::ALL.len(), HeaderKind::COUNT);
        for (i, kind) in HeaderKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(HeaderKind::from_name(kind.as_str()), Some(*kind));
            if let Some(compact) = kind.compact_form() {
                assert_eq!(HeaderKind::from_name(&compact.to_string()), Some(*kind));
            }
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(HeaderKind::from_name("VIA"), Some(HeaderKind::Via));
        assert_eq!(HeaderKind::from_name("m"), Some(HeaderKind::Contact));
        assert_eq!(HeaderKind::from_name("L"), Some(HeaderKind::ContentLength));
        assert_eq!(HeaderKind::from_name("www-authenticate"), Some(HeaderKind::WwwAuthenticate));
        assert_eq!(HeaderKind::from_name("X-Trace"), None);
        assert_eq!(HeaderKind::from_name("q"), None);
        assert_eq!(HeaderKind::from_name(""), None);
    }

    #[test]
    fn test_arity() {
        assert!(HeaderKind::CallId.is_single());
        assert!(HeaderKind::To.is_single());
        assert!(!HeaderKind::Contact.is_single());
        assert!(!HeaderKind::Route.is_single());
        assert_eq!(HeaderKind::Via.to_string(), "Via");
    }

    #[test]
    fn test_markers_map_to_kinds() {
        assert_eq!(HeaderKind::from(h::Vias), HeaderKind::Via);
        assert_eq!(h::Contacts::KIND, HeaderKind::Contact);
        assert_eq!(h::To::KIND, HeaderKind::To);
    }
}
