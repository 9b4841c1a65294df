// Lexical helpers shared by the header value parsers

/// Unfolds Linear White Space (LWS) according to RFC 3261.
///
/// CRLF (or bare LF) followed by SP/HTAB is replaced by a single SP, and runs
/// of SP/HTAB collapse to one SP. Returns the input unchanged (borrowed) when
/// it holds no folding and no whitespace runs.
pub(crate) fn unfold_lws(input: &str) -> std::borrow::Cow<'_, str> {
    let bytes = input.as_bytes();
    let needs_work = bytes.windows(2).any(|w| {
        matches!(w, [b'\r', b'\n'] | [b'\n', b' '] | [b'\n', b'\t'] | [b' ' | b'\t', b' ' | b'\t'])
    }) || bytes.contains(&b'\t');
    if !needs_work {
        return std::borrow::Cow::Borrowed(input);
    }

    let mut unfolded = String::with_capacity(input.len());
    let mut last_was_wsp = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                if matches!(chars.peek(), Some(' ') | Some('\t')) {
                    if !last_was_wsp {
                        unfolded.push(' ');
                        last_was_wsp = true;
                    }
                } else {
                    unfolded.push_str("\r\n");
                    last_was_wsp = false;
                }
            }
            '\n' if matches!(chars.peek(), Some(' ') | Some('\t')) => {
                if !last_was_wsp {
                    unfolded.push(' ');
                    last_was_wsp = true;
                }
            }
            ' ' | '\t' => {
                if !last_was_wsp {
                    unfolded.push(' ');
                    last_was_wsp = true;
                }
            }
            other => {
                unfolded.push(other);
                last_was_wsp = false;
            }
        }
    }
    std::borrow::Cow::Owned(unfolded)
}

/// Splits `input` on `separator` where it appears outside quoted strings,
/// angle-bracketed URIs and parenthesised comments. Pieces are trimmed;
/// empty pieces are dropped.
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut angle_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '<' => angle_depth += 1,
            '>' => angle_depth = angle_depth.saturating_sub(1),
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            _ if c == separator && angle_depth == 0 && paren_depth == 0 => {
                let piece = input[start..i].trim();
                if !piece.is_empty() {
                    pieces.push(piece);
                }
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    let piece = input[start..].trim();
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Byte offset of the first `target` outside quotes and angle brackets.
pub(crate) fn find_top_level(input: &str, target: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut angle_depth = 0usize;
    for (i, c) in input.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '<' => angle_depth += 1,
            '>' => angle_depth = angle_depth.saturating_sub(1),
            _ if c == target && angle_depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Removes surrounding double quotes and backslash escapes, if present.
pub(crate) fn unquote(input: &str) -> Option<String> {
    let inner = input.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Wraps `value` in double quotes, escaping `"` and `\`.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// RFC 3261 token characters
pub(crate) fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '!' | '%' | '*' | '_' | '+' | '`' | '\'' | '~')
}

// unreserved = alphanum / mark
// hnv-unreserved = "[" / "]" / "/" / "?" / ":" / "+" / "$"
fn is_header_value_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')'
                | b'[' | b']' | b'/' | b'?' | b':' | b'+' | b'$'
        )
}

/// Percent-escapes `input` for use as a URI header name or value.
pub(crate) fn escape_uri_header(input: &[u8], out: &mut Vec<u8>) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in input {
        if is_header_value_char(b) {
            out.push(b);
        } else {
            out.push(b'%');
            out.push(HEX[(b >> 4) as usize]);
            out.push(HEX[(b & 0x0f) as usize]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfold_lws() {
        assert_eq!(unfold_lws("plain value"), "plain value");
        assert!(matches!(unfold_lws("plain value"), std::borrow::Cow::Borrowed(_)));
        assert_eq!(unfold_lws("Alice\r\n  <sip:alice@atlanta.com>"), "Alice <sip:alice@atlanta.com>");
        assert_eq!(unfold_lws("a \t b"), "a b");
        assert_eq!(unfold_lws("a\n\tb"), "a b");
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("<sip:a@x;lr>, \"Bob, Jr\" <sip:b@y>, sip:c@z", ','),
            vec!["<sip:a@x;lr>", "\"Bob, Jr\" <sip:b@y>", "sip:c@z"]
        );
        assert_eq!(split_top_level("120 (in a meeting; back soon);duration=60", ';'),
            vec!["120 (in a meeting; back soon)", "duration=60"]);
        assert!(split_top_level("  ,  ", ',').is_empty());
    }

    #[test]
    fn test_quote_roundtrip() {
        let quoted = quote("say \"hi\"");
        assert_eq!(quoted, "\"say \\\"hi\\\"\"");
        assert_eq!(unquote(&quoted).unwrap(), "say \"hi\"");
        assert!(unquote("bare").is_none());
    }

    #[test]
    fn test_escape_uri_header() {
        let mut out = Vec::new();
        escape_uri_header(b"SIP/2.0/UDP host;branch=z9", &mut out);
        assert_eq!(out, b"SIP/2.0/UDP%20host%3Bbranch%3Dz9");
    }
}
