use std::fmt;

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{multispace0, multispace1},
    combinator::rest,
    sequence::{delimited, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::grammar::is_token_char;
use crate::header::ParserCategory;
use crate::types::param::Params;

/// The RFC 3261 magic cookie that prefixes compliant branch parameters
pub const BRANCH_MAGIC_COOKIE: &str = "z9hG4bK";

/// A single Via header value
/// `SIP/2.0/UDP host[:port];params`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Via {
    pub protocol_name: String,
    pub version: String,
    pub transport: String,
    pub host: String,
    pub port: Option<u16>,
    pub params: Params,
}

impl Default for Via {
    fn default() -> Self {
        Via {
            protocol_name: "SIP".to_string(),
            version: "2.0".to_string(),
            transport: "UDP".to_string(),
            host: String::new(),
            port: None,
            params: Params::new(),
        }
    }
}

impl Via {
    pub fn new(transport: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Via {
            transport: transport.into(),
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// The `branch` parameter, if present
    pub fn branch(&self) -> Option<String> {
        self.params.value("branch")
    }

    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.params.set("branch", Some(branch.into()));
    }

    /// Whether the branch starts with the RFC 3261 magic cookie
    pub fn has_rfc3261_branch(&self) -> bool {
        self.branch()
            .is_some_and(|branch| branch.starts_with(BRANCH_MAGIC_COOKIE))
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} {}",
            self.protocol_name, self.version, self.transport, self.host
        )?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.params)
    }
}

fn slash(input: &str) -> IResult<&str, &str> {
    delimited(multispace0, tag("/"), multispace0)(input)
}

fn sent_protocol(input: &str) -> IResult<&str, (&str, &str, &str, &str)> {
    let (input, (name, _, version, _, transport, _, sent_by)) = tuple((
        take_while1(is_token_char),
        slash,
        take_while1(is_token_char),
        slash,
        take_while1(is_token_char),
        multispace1,
        rest,
    ))(input)?;
    Ok((input, (name, version, transport, sent_by)))
}

impl ParserCategory for Via {
    fn parse(text: &str) -> Result<Self> {
        let (head, params) = Params::split_trailing(text)?;
        let (_, (protocol_name, version, transport, sent_by)) = sent_protocol(head)
            .map_err(|_| Error::invalid_header("", format!("invalid sent-protocol in '{head}'")))?;

        let sent_by = sent_by.trim();
        let (host, port) = match sent_by.rsplit_once(':') {
            // IPv6 reference without a port
            Some((host, _)) if sent_by.ends_with(']') || host.ends_with(':') => (sent_by, None),
            Some((host, port)) => {
                let port = port
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| Error::invalid_header("", format!("invalid port in '{sent_by}'")))?;
                (host.trim(), Some(port))
            }
            None => (sent_by, None),
        };
        if host.is_empty() {
            return Err(Error::invalid_header("", "missing sent-by host"));
        }

        Ok(Via {
            protocol_name: protocol_name.to_string(),
            version: version.to_string(),
            transport: transport.to_ascii_uppercase(),
            host: host.to_string(),
            port,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_via() {
        let via = Via::parse("SIP/2.0/UDP pc33.atlanta.com:5060;branch=z9hG4bK776asdhds;received=192.0.2.1").unwrap();
        assert_eq!(via.protocol_name, "SIP");
        assert_eq!(via.version, "2.0");
        assert_eq!(via.transport, "UDP");
        assert_eq!(via.host, "pc33.atlanta.com");
        assert_eq!(via.port, Some(5060));
        assert_eq!(via.branch().as_deref(), Some("z9hG4bK776asdhds"));
        assert!(via.has_rfc3261_branch());
        assert_eq!(
            via.to_string(),
            "SIP/2.0/UDP pc33.atlanta.com:5060;branch=z9hG4bK776asdhds;received=192.0.2.1"
        );
    }

    #[test]
    fn test_parse_via_variants() {
        let via = Via::parse("SIP / 2.0 / tcp [2001:db8::9]").unwrap();
        assert_eq!(via.transport, "TCP");
        assert_eq!(via.host, "[2001:db8::9]");
        assert_eq!(via.port, None);

        let via = Via::parse("SIP/2.0/UDP bigbox3.site3.atlanta.com;branch=1234").unwrap();
        assert!(!via.has_rfc3261_branch());

        assert!(Via::parse("SIP/2.0/UDP").is_err());
        assert!(Via::parse("pc33.atlanta.com").is_err());
        assert!(Via::parse("SIP/2.0/UDP host:abc").is_err());
    }

    #[test]
    fn test_set_branch() {
        let mut via = Via::new("TLS", "proxy.example.com", Some(5061));
        via.set_branch("z9hG4bKnashds8");
        assert_eq!(via.to_string(), "SIP/2.0/TLS proxy.example.com:5061;branch=z9hG4bKnashds8");
    }
}
