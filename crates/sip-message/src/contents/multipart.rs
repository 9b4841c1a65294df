use bytes::{BufMut, Bytes, BytesMut};

use crate::contents::Contents;
use crate::error::{Error, Result};
use crate::header::ParserCategory;
use crate::types::Mime;

/// A single part in a multipart MIME body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    /// Headers for this MIME part, as (name, value)
    pub headers: Vec<(String, String)>,
    /// Body content of this MIME part
    pub body: Bytes,
}

impl MimePart {
    /// Create a new MIME part
    pub fn new(headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        MimePart {
            headers,
            body: body.into(),
        }
    }

    /// Get a header value from this MIME part
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The part's Content-Type; `text/plain` when absent (RFC 2046)
    pub fn content_type(&self) -> Result<Mime> {
        match self.header("Content-Type") {
            Some(value) => Mime::parse(value).map_err(|e| e.in_header("Content-Type")),
            None => Ok(Mime::new("text", "plain")),
        }
    }

    /// The part's body typed by its own Content-Type
    pub fn contents(&self) -> Result<Contents> {
        Contents::parse(&self.content_type()?, self.body.clone())
    }
}

/// A multipart MIME message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartContents {
    pub mime: Mime,
    /// The boundary string that separates MIME parts
    pub boundary: String,
    /// The individual MIME parts
    pub parts: Vec<MimePart>,
}

impl MultipartContents {
    /// Create an empty `multipart/mixed` body with the given boundary
    pub fn new(boundary: impl Into<String>) -> Self {
        let boundary = boundary.into();
        let mut mime = Mime::new("multipart", "mixed");
        mime.params.set("boundary", Some(boundary.clone()));
        MultipartContents {
            mime,
            boundary,
            parts: Vec::new(),
        }
    }

    /// Add a new part to this multipart body
    pub fn add_part(&mut self, part: MimePart) {
        self.parts.push(part);
    }

    /// Parse a multipart body from raw bytes
    pub fn parse(mime: &Mime, body: &[u8]) -> Result<Self> {
        let boundary = mime
            .boundary()
            .ok_or_else(|| Error::invalid_contents(format!("no boundary parameter in '{mime}'")))?;
        let delimiter = format!("--{boundary}");
        let delimiter = delimiter.as_bytes();

        let mut parts = Vec::new();
        let mut pos = find(body, delimiter, 0)
            .ok_or_else(|| Error::invalid_contents("multipart body has no opening boundary"))?;
        loop {
            pos += delimiter.len();
            if body[pos..].starts_with(b"--") {
                break;
            }
            pos = skip_line_end(body, pos);
            let next = find(body, delimiter, pos)
                .ok_or_else(|| Error::invalid_contents("multipart body has no closing boundary"))?;
            let part = strip_trailing_crlf(&body[pos..next]);
            parts.push(parse_part(part)?);
            pos = next;
        }

        Ok(MultipartContents {
            mime: mime.clone(),
            boundary,
            parts,
        })
    }

    /// Serialize this multipart body to bytes
    pub fn to_bytes(&self) -> Bytes {
        let mut output = BytesMut::new();

        for part in &self.parts {
            output.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
            for (name, value) in &part.headers {
                output.put_slice(format!("{name}: {value}\r\n").as_bytes());
            }
            output.put_slice(b"\r\n");
            output.put_slice(&part.body);
            output.put_slice(b"\r\n");
        }
        output.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        output.freeze()
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

fn skip_line_end(body: &[u8], mut pos: usize) -> usize {
    // transport padding after the delimiter
    while matches!(body.get(pos), Some(b' ') | Some(b'\t')) {
        pos += 1;
    }
    if body[pos..].starts_with(b"\r\n") {
        pos + 2
    } else if body[pos..].starts_with(b"\n") {
        pos + 1
    } else {
        pos
    }
}

fn strip_trailing_crlf(part: &[u8]) -> &[u8] {
    part.strip_suffix(b"\r\n")
        .or_else(|| part.strip_suffix(b"\n"))
        .unwrap_or(part)
}

/// Helper function to find where headers end and body begins
fn find_headers_end(part: &[u8]) -> Option<(usize, usize)> {
    if part.starts_with(b"\r\n") {
        return Some((0, 2));
    }
    if part.starts_with(b"\n") {
        return Some((0, 1));
    }
    if let Some(pos) = find(part, b"\r\n\r\n", 0) {
        Some((pos, pos + 4))
    } else {
        find(part, b"\n\n", 0).map(|pos| (pos, pos + 2))
    }
}

fn parse_part(part: &[u8]) -> Result<MimePart> {
    let (headers_end, body_start) = find_headers_end(part)
        .ok_or_else(|| Error::invalid_contents("MIME part has no blank line after its headers"))?;
    let headers_text = std::str::from_utf8(&part[..headers_end])
        .map_err(|_| Error::invalid_contents("MIME part headers are not valid UTF-8"))?;

    let mut headers: Vec<(String, String)> = Vec::new();
    for line in headers_text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            // Continuation of the previous header
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
        } else if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        } else if !line.trim().is_empty() {
            return Err(Error::invalid_contents(format!("malformed MIME part header '{line}'")));
        }
    }

    Ok(MimePart::new(headers, Bytes::copy_from_slice(&part[body_start..])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mime(boundary: &str) -> Mime {
        Mime::parse(&format!("multipart/mixed; boundary={boundary}")).unwrap()
    }

    #[test]
    fn test_parse_multipart() {
        let body = "--boundary1\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            Hello, world!\r\n\
            --boundary1\r\n\
            Content-Type: application/sdp\r\n\
            \r\n\
            v=0\r\n\
            o=- 123 456 IN IP4 192.0.2.1\r\n\
            \r\n\
            --boundary1--\r\n";

        let multipart = MultipartContents::parse(&mime("boundary1"), body.as_bytes()).unwrap();
        assert_eq!(multipart.boundary, "boundary1");
        assert_eq!(multipart.parts.len(), 2);

        let part1 = &multipart.parts[0];
        assert!(part1.content_type().unwrap().is("text", "plain"));
        assert_eq!(&part1.body[..], b"Hello, world!");

        let part2 = &multipart.parts[1];
        assert!(part2.content_type().unwrap().is("application", "sdp"));
        assert_eq!(&part2.body[..], b"v=0\r\no=- 123 456 IN IP4 192.0.2.1\r\n");
        assert!(matches!(part2.contents().unwrap(), Contents::Sdp(_)));
    }

    #[test]
    fn test_missing_boundaries() {
        let no_param = Mime::parse("multipart/mixed").unwrap();
        assert!(MultipartContents::parse(&no_param, b"--x\r\n\r\nbody\r\n--x--").is_err());
        assert!(MultipartContents::parse(&mime("x"), b"no delimiter here").is_err());
        assert!(MultipartContents::parse(&mime("x"), b"--x\r\n\r\nunterminated").is_err());
    }

    #[test]
    fn test_serialize_multipart() {
        let mut multipart = MultipartContents::new("boundary1");
        multipart.add_part(MimePart::new(
            vec![("Content-Type".to_string(), "text/plain".to_string())],
            "Hello, world!",
        ));
        multipart.add_part(MimePart::new(Vec::new(), "untyped"));

        let bytes = multipart.to_bytes();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with("--boundary1\r\nContent-Type: text/plain\r\n\r\nHello, world!\r\n"));
        assert!(text.ends_with("--boundary1--\r\n"));

        let parsed = MultipartContents::parse(&multipart.mime, &bytes).unwrap();
        assert_eq!(parsed.parts, multipart.parts);
        assert!(parsed.parts[1].content_type().unwrap().is("text", "plain"));
    }
}
