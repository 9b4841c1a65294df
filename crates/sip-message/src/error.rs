//! Error types for SIP message handling
//!
//! Every error carries the [`Location`] where it was raised. Constructors are
//! `#[track_caller]`, so `Error::header_not_present("CSeq")` records the
//! caller's file and line rather than this module's.

use std::fmt;
use thiserror::Error;

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Source position at which an [`Error`] was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Source file
    pub file: &'static str,
    /// Line within `file`
    pub line: u32,
}

impl Location {
    /// Captures the location of the calling function's caller.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Location {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Errors that can occur while parsing, accessing or encoding a SIP message
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A read-only accessor was called for a header the message does not carry
    #[error("{header} header not present (at {location})")]
    HeaderNotPresent {
        header: String,
        location: Location,
    },

    /// The RFC 2543 transaction hash needs CSeq and Call-ID
    #[error("cannot compute RFC 2543 transaction id, missing {missing} (at {location})")]
    MissingIdentityFields {
        missing: String,
        location: Location,
    },

    /// The first line is neither a request-line nor a status-line
    #[error("malformed start line: {message} (at {location})")]
    MalformedStartLine {
        message: String,
        location: Location,
    },

    /// Request/response kind was queried before a start line was set
    #[error("start line has not been set (at {location})")]
    NoStartLine { location: Location },

    /// A header value failed its grammar on first typed access
    #[error("invalid {header} header: {message} (at {location})")]
    InvalidHeader {
        header: String,
        message: String,
        location: Location,
    },

    /// Invalid SIP URI
    #[error("invalid URI: {message} (at {location})")]
    InvalidUri {
        message: String,
        location: Location,
    },

    /// Message framing error
    #[error("invalid message format: {message} (at {location})")]
    InvalidFormat {
        message: String,
        location: Location,
    },

    /// Contents were already released or never present
    #[error("contents unavailable: {message} (at {location})")]
    ContentsUnavailable {
        message: String,
        location: Location,
    },

    /// The body does not match its Content-Type
    #[error("invalid contents: {message} (at {location})")]
    InvalidContents {
        message: String,
        location: Location,
    },

    /// A span does not resolve against the message's buffers
    #[error("span does not refer to a buffer owned by this message (at {location})")]
    InvalidSpan { location: Location },
}

impl Error {
    /// Create a header-not-present error
    #[track_caller]
    pub fn header_not_present(header: impl Into<String>) -> Self {
        Error::HeaderNotPresent {
            header: header.into(),
            location: Location::caller(),
        }
    }

    /// Create a missing-identity-fields error
    #[track_caller]
    pub fn missing_identity_fields(missing: impl Into<String>) -> Self {
        Error::MissingIdentityFields {
            missing: missing.into(),
            location: Location::caller(),
        }
    }

    /// Create a malformed-start-line error
    #[track_caller]
    pub fn malformed_start_line(message: impl Into<String>) -> Self {
        Error::MalformedStartLine {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Create a no-start-line error
    #[track_caller]
    pub fn no_start_line() -> Self {
        Error::NoStartLine {
            location: Location::caller(),
        }
    }

    /// Create an invalid-header error
    #[track_caller]
    pub fn invalid_header(header: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidHeader {
            header: header.into(),
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Create an invalid-URI error
    #[track_caller]
    pub fn invalid_uri(message: impl Into<String>) -> Self {
        Error::InvalidUri {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Create an invalid-format error
    #[track_caller]
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Error::InvalidFormat {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Create a contents-unavailable error
    #[track_caller]
    pub fn contents_unavailable(message: impl Into<String>) -> Self {
        Error::ContentsUnavailable {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Create an invalid-contents error
    #[track_caller]
    pub fn invalid_contents(message: impl Into<String>) -> Self {
        Error::InvalidContents {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Create an invalid-span error
    #[track_caller]
    pub fn invalid_span() -> Self {
        Error::InvalidSpan {
            location: Location::caller(),
        }
    }

    /// Where this error was raised
    pub fn location(&self) -> Location {
        match self {
            Error::HeaderNotPresent { location, .. }
            | Error::MissingIdentityFields { location, .. }
            | Error::MalformedStartLine { location, .. }
            | Error::NoStartLine { location }
            | Error::InvalidHeader { location, .. }
            | Error::InvalidUri { location, .. }
            | Error::InvalidFormat { location, .. }
            | Error::ContentsUnavailable { location, .. }
            | Error::InvalidContents { location, .. }
            | Error::InvalidSpan { location } => *location,
        }
    }

    /// Prefixes the message of a grammar error with the header it came from.
    ///
    /// Value parsers do not know which header they are parsing; the header
    /// table calls this when a typed parse fails.
    pub(crate) fn in_header(self, header: &str) -> Self {
        match self {
            Error::InvalidHeader { message, location, .. } => Error::InvalidHeader {
                header: header.to_string(),
                message,
                location,
            },
            Error::InvalidUri { message, location } => Error::InvalidHeader {
                header: header.to_string(),
                message: format!("invalid URI: {message}"),
                location,
            },
            other => other,
        }
    }
}
