//! SIP/SIPS/TEL URIs
//!
//! Only the parts a message needs to route and identify itself are broken
//! out: scheme, userinfo, host, port, URI parameters and URI headers.
//!
//! ```rust
//! use rvoip_sip_message::types::Uri;
//!
//! let uri: Uri = "sip:alice:secret@atlanta.com:5061;transport=tcp?subject=project".parse().unwrap();
//! assert_eq!(uri.user.as_deref(), Some("alice"));
//! assert_eq!(uri.port, Some(5061));
//! assert_eq!(uri.params.value("transport").as_deref(), Some("tcp"));
//! assert_eq!(uri.to_string(), "sip:alice:secret@atlanta.com:5061;transport=tcp?subject=project");
//! ```

use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::digit1,
    combinator::{all_consuming, map_res, opt},
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::{Error, Result};
use crate::types::param::Params;

/// A parsed URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Uri {
    /// Lowercased scheme, e.g. `sip`
    pub scheme: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: Option<u16>,
    pub params: Params,
    /// `?name=value&...` headers, in order
    pub headers: Vec<(String, String)>,
}

fn scheme(input: &str) -> IResult<&str, &str> {
    terminated(
        take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        tag(":"),
    )(input)
}

fn port(input: &str) -> IResult<&str, u16> {
    preceded(tag(":"), map_res(digit1, str::parse::<u16>))(input)
}

fn host_port(input: &str) -> Result<(String, Option<u16>)> {
    let invalid = || Error::invalid_uri(format!("invalid host '{input}'"));
    if input.starts_with('[') {
        let close = input.find(']').ok_or_else(invalid)?;
        let (_, port) = all_consuming(opt(port))(&input[close + 1..]).map_err(|_| invalid())?;
        return Ok((input[..=close].to_string(), port));
    }
    match input.rsplit_once(':') {
        Some((host, rest)) if !host.is_empty() => {
            let (_, port) = all_consuming(map_res(digit1, str::parse::<u16>))(rest)
                .map_err(|_: nom::Err<nom::error::Error<&str>>| invalid())?;
            Ok((host.to_string(), Some(port)))
        }
        Some(_) => Err(invalid()),
        None if input.is_empty() => Err(invalid()),
        None => Ok((input.to_string(), None)),
    }
}

impl Uri {
    /// A `sip:` URI for the given host
    pub fn sip(host: impl Into<String>) -> Self {
        Uri {
            scheme: "sip".to_string(),
            host: host.into(),
            ..Default::default()
        }
    }

    /// Builder-style user part
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Whether the scheme is `sips`
    pub fn is_secure(&self) -> bool {
        self.scheme == "sips"
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (rest, scheme) =
            scheme(s).map_err(|_| Error::invalid_uri(format!("missing scheme in '{s}'")))?;

        let (rest, headers) = match rest.split_once('?') {
            Some((rest, headers)) => (rest, headers),
            None => (rest, ""),
        };
        let headers = headers
            .split('&')
            .filter(|h| !h.is_empty())
            .map(|h| match h.split_once('=') {
                Some((name, value)) => (name.to_string(), value.to_string()),
                None => (h.to_string(), String::new()),
            })
            .collect();

        let (userinfo, rest) = match rest.rsplit_once('@') {
            Some((userinfo, rest)) => (Some(userinfo), rest),
            None => (None, rest),
        };
        let (user, password) = match userinfo {
            Some(userinfo) => match userinfo.split_once(':') {
                Some((user, password)) => (Some(user.to_string()), Some(password.to_string())),
                None => (Some(userinfo.to_string()), None),
            },
            None => (None, None),
        };

        let (hostport, params) = match rest.split_once(';') {
            Some((hostport, params)) => (hostport, Params::parse(params)?),
            None => (rest, Params::new()),
        };
        let (host, port) = host_port(hostport)?;

        Ok(Uri {
            scheme: scheme.to_ascii_lowercase(),
            user,
            password,
            host,
            port,
            params,
            headers,
        })
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if let Some(user) = &self.user {
            f.write_str(user)?;
            if let Some(password) = &self.password {
                write!(f, ":{password}")?;
            }
            f.write_str("@")?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.params)?;
        for (i, (name, value)) in self.headers.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let uri: Uri = "sip:bob@biloxi.com".parse().unwrap();
        assert_eq!(uri.scheme, "sip");
        assert_eq!(uri.user.as_deref(), Some("bob"));
        assert_eq!(uri.host, "biloxi.com");
        assert_eq!(uri.port, None);
        assert_eq!(uri.to_string(), "sip:bob@biloxi.com");
    }

    #[test]
    fn test_parse_without_user() {
        let uri: Uri = "SIP:registrar.biloxi.com;lr".parse().unwrap();
        assert_eq!(uri.scheme, "sip");
        assert!(uri.user.is_none());
        assert!(uri.params.contains("lr"));
        assert_eq!(uri.to_string(), "sip:registrar.biloxi.com;lr");
    }

    #[test]
    fn test_parse_ipv6() {
        let uri: Uri = "sips:[2001:db8::10]:5061".parse().unwrap();
        assert!(uri.is_secure());
        assert_eq!(uri.host, "[2001:db8::10]");
        assert_eq!(uri.port, Some(5061));
    }

    #[test]
    fn test_invalid_uris() {
        assert!("biloxi.com".parse::<Uri>().is_err());
        assert!("sip:bob@host:port".parse::<Uri>().is_err());
        assert!("sip:".parse::<Uri>().is_err());
        assert!("sip:[::1".parse::<Uri>().is_err());
    }

    #[test]
    fn test_builder() {
        let uri = Uri::sip("example.com").with_user("carol");
        assert_eq!(uri.to_string(), "sip:carol@example.com");
    }
}
