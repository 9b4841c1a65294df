use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};

/// One `<type>=<value>` line of a session description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdpLine {
    pub kind: char,
    pub value: String,
}

/// An `application/sdp` body, kept line by line.
///
/// The description is not interpreted beyond its line structure; the
/// accessors below pick out the fields routing code commonly needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdpContents {
    pub lines: Vec<SdpLine>,
}

impl SdpContents {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|_| Error::invalid_contents("SDP body is not valid UTF-8"))?;

        let mut lines = Vec::new();
        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let (kind, value) = line
                .split_once('=')
                .filter(|(kind, _)| kind.len() == 1 && kind.chars().all(|c| c.is_ascii_alphabetic()))
                .ok_or_else(|| Error::invalid_contents(format!("invalid SDP line '{line}'")))?;
            lines.push(SdpLine {
                kind: kind.chars().next().unwrap_or('?'),
                value: value.to_string(),
            });
        }

        match lines.first() {
            Some(SdpLine { kind: 'v', .. }) => Ok(SdpContents { lines }),
            _ => Err(Error::invalid_contents("SDP must start with a v= line")),
        }
    }

    fn first(&self, kind: char) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.kind == kind)
            .map(|line| line.value.as_str())
    }

    /// `v=`
    pub fn version(&self) -> Option<&str> {
        self.first('v')
    }

    /// `o=`
    pub fn origin(&self) -> Option<&str> {
        self.first('o')
    }

    /// `s=`
    pub fn session_name(&self) -> Option<&str> {
        self.first('s')
    }

    /// Every `m=` line, in order
    pub fn media(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.kind == 'm')
            .map(|line| line.value.as_str())
    }

    /// Values of `a=<name>` / `a=<name>:<value>` lines
    pub fn attributes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        self.lines
            .iter()
            .filter(|line| line.kind == 'a')
            .filter_map(move |line| match line.value.split_once(':') {
                Some((attr, value)) if attr == name => Some(Some(value)),
                None if line.value == name => Some(None),
                _ => None,
            })
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl fmt::Display for SdpContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            write!(f, "{}={}\r\n", line.kind, line.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFER: &str = "v=0\r\n\
        o=alice 2890844526 2890844526 IN IP4 atlanta.example.com\r\n\
        s=-\r\n\
        c=IN IP4 192.0.2.101\r\n\
        t=0 0\r\n\
        m=audio 49172 RTP/AVP 0 8\r\n\
        a=rtpmap:0 PCMU/8000\r\n\
        a=rtpmap:8 PCMA/8000\r\n\
        a=sendrecv\r\n";

    #[test]
    fn test_parse_sdp() {
        let sdp = SdpContents::parse(OFFER.as_bytes()).unwrap();
        assert_eq!(sdp.version(), Some("0"));
        assert_eq!(sdp.session_name(), Some("-"));
        assert_eq!(sdp.media().collect::<Vec<_>>(), vec!["audio 49172 RTP/AVP 0 8"]);
        assert_eq!(sdp.attributes("rtpmap").count(), 2);
        assert_eq!(sdp.attributes("sendrecv").collect::<Vec<_>>(), vec![None]);
        assert_eq!(sdp.to_string(), OFFER);
    }

    #[test]
    fn test_invalid_sdp() {
        assert!(SdpContents::parse(b"o=missing version\r\n").is_err());
        assert!(SdpContents::parse(b"v=0\r\nnot a line\r\n").is_err());
        assert!(SdpContents::parse(&[0xff, 0xfe]).is_err());
    }
}
