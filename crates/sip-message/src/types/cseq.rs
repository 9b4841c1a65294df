use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::take_while1,
    character::complete::{digit1, space1},
    combinator::{all_consuming, map_res},
    sequence::separated_pair,
    IResult,
};

use crate::error::{Error, Result};
use crate::grammar::is_token_char;
use crate::header::ParserCategory;
use crate::types::method::Method;

/// Typed CSeq header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CSeq {
    pub sequence: u32,
    pub method: Method,
}

impl CSeq {
    /// Creates a new CSeq header.
    pub fn new(sequence: u32, method: Method) -> Self {
        CSeq { sequence, method }
    }
}

impl Default for CSeq {
    fn default() -> Self {
        CSeq {
            sequence: 0,
            method: Method::Extension("UNKNOWN".to_string()),
        }
    }
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sequence, self.method)
    }
}

fn cseq(input: &str) -> IResult<&str, (u32, Method)> {
    all_consuming(separated_pair(
        map_res(digit1, str::parse::<u32>),
        space1,
        map_res(take_while1(is_token_char), Method::from_str),
    ))(input)
}

impl ParserCategory for CSeq {
    const COMMA_SEPARATED: bool = false;

    fn parse(text: &str) -> Result<Self> {
        let (_, (sequence, method)) = cseq(text.trim())
            .map_err(|_| Error::invalid_header("", format!("expected '<number> <method>', found '{text}'")))?;
        Ok(CSeq { sequence, method })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cseq() {
        let cseq = CSeq::parse("314159 INVITE").unwrap();
        assert_eq!(cseq.sequence, 314159);
        assert_eq!(cseq.method, Method::Invite);
        assert_eq!(cseq.to_string(), "314159 INVITE");

        assert!(CSeq::parse("INVITE").is_err());
        assert!(CSeq::parse("1").is_err());
        assert!(CSeq::parse("99999999999 INVITE").is_err());
    }
}
