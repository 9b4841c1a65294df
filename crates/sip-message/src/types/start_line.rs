use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_till, take_till1, take_while_m_n},
    character::complete::space1,
    combinator::{eof, map_res, rest},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::types::method::Method;
use crate::types::uri::Uri;
use crate::types::version::Version;

/// `Method SP Request-URI SP SIP-Version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
}

impl RequestLine {
    pub fn new(method: Method, uri: Uri) -> Self {
        RequestLine {
            method,
            uri,
            version: Version::sip_2_0(),
        }
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.uri, self.version)
    }
}

/// `SIP-Version SP Status-Code SP Reason-Phrase`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: Version,
    pub code: u16,
    pub reason: String,
}

impl StatusLine {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        StatusLine {
            version: Version::sip_2_0(),
            code,
            reason: reason.into(),
        }
    }

    /// 1xx
    pub fn is_provisional(&self) -> bool {
        (100..200).contains(&self.code)
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.version, self.code, self.reason)
    }
}

/// The first line of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request(RequestLine),
    Response(StatusLine),
}

fn token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c == ' ' || c == '\t')(input)
}

fn status_line(input: &str) -> IResult<&str, StatusLine> {
    // The reason phrase may be empty: "SIP/2.0 200"
    let (input, (version, _, code, reason)) = tuple((
        map_res(token, Version::from_str),
        space1,
        map_res(take_while_m_n(3, 3, |c: char| c.is_ascii_digit()), str::parse::<u16>),
        alt((preceded(space1, rest), eof)),
    ))(input)?;
    Ok((
        input,
        StatusLine {
            version,
            code,
            reason: reason.trim_end().to_string(),
        },
    ))
}

fn request_line(input: &str) -> IResult<&str, RequestLine> {
    let (input, (method, _, uri, _, version)) = tuple((
        map_res(token, Method::from_str),
        space1,
        map_res(token, Uri::from_str),
        space1,
        map_res(take_till(|c: char| c.is_whitespace()), Version::from_str),
    ))(input)?;
    Ok((input, RequestLine { method, uri, version }))
}

impl StartLine {
    /// Classifies and parses a start line.
    ///
    /// A line beginning with `SIP/` is a status-line; anything else must be
    /// a request-line.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let is_status = tag_no_case::<_, _, nom::error::Error<&str>>("SIP/")(line).is_ok();
        if is_status {
            status_line(line)
                .map(|(_, status)| StartLine::Response(status))
                .map_err(|_| Error::malformed_start_line(format!("invalid status line '{line}'")))
        } else {
            match request_line(line) {
                Ok(("", request)) => Ok(StartLine::Request(request)),
                Ok((trailing, _)) => Err(Error::malformed_start_line(format!(
                    "unexpected trailing text '{trailing}' in request line"
                ))),
                Err(_) => Err(Error::malformed_start_line(format!("invalid request line '{line}'"))),
            }
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, StartLine::Request(_))
    }
}

impl fmt::Display for StartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartLine::Request(line) => fmt::Display::fmt(line, f),
            StartLine::Response(line) => fmt::Display::fmt(line, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_line() {
        let line = StartLine::parse("REGISTER sip:registrar.biloxi.com SIP/2.0\r\n").unwrap();
        match line {
            StartLine::Request(request) => {
                assert_eq!(request.method, Method::Register);
                assert_eq!(request.uri.host, "registrar.biloxi.com");
                assert_eq!(request.version, Version::sip_2_0());
            }
            other => panic!("expected request line, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_status_line() {
        let line = StartLine::parse("SIP/2.0 180 Ringing").unwrap();
        match line {
            StartLine::Response(status) => {
                assert_eq!(status.code, 180);
                assert_eq!(status.reason, "Ringing");
                assert!(status.is_provisional());
            }
            other => panic!("expected status line, got {other:?}"),
        }

        let line = StartLine::parse("SIP/2.0 486 Busy Here").unwrap();
        assert_eq!(line.to_string(), "SIP/2.0 486 Busy Here");

        let line = StartLine::parse("SIP/2.0 200").unwrap();
        assert!(!line.is_request());
    }

    #[test]
    fn test_malformed_start_lines() {
        for bad in ["", "HELLO", "INVITE sip:bob@biloxi.com", "SIP/2.0 OK", "SIP/2.0 2000 Bad", "INVITE bob SIP/2.0"] {
            assert!(
                matches!(StartLine::parse(bad), Err(Error::MalformedStartLine { .. })),
                "accepted '{bad}'"
            );
        }
    }
}
