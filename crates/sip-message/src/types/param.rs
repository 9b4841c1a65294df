use std::fmt;

use crate::error::{Error, Result};
use crate::grammar::{find_top_level, split_top_level, unquote};

/// A generic `;name[=value]` parameter.
///
/// Values are kept as they appeared on the wire, quotes included, so that a
/// re-rendered header matches its input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub value: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Param { name: name.into(), value }
    }

    /// A valueless parameter such as `lr`
    pub fn flag(name: impl Into<String>) -> Self {
        Param { name: name.into(), value: None }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, ";{}={}", self.name, value),
            None => write!(f, ";{}", self.name),
        }
    }
}

/// An ordered list of parameters. Names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Params(Vec::new())
    }

    /// Parses `a=b;c;d="x y"` (the text after the first `;`).
    pub fn parse(input: &str) -> Result<Self> {
        let mut params = Vec::new();
        for piece in split_top_level(input, ';') {
            let param = match piece.split_once('=') {
                Some((name, value)) => Param::new(name.trim(), Some(value.trim().to_string())),
                None => Param::flag(piece),
            };
            if param.name.is_empty() {
                return Err(Error::invalid_header("", format!("empty parameter name in '{input}'")));
            }
            params.push(param);
        }
        Ok(Params(params))
    }

    /// Splits `value;params` at the first top-level `;`.
    pub(crate) fn split_trailing(input: &str) -> Result<(&str, Params)> {
        match find_top_level(input, ';') {
            Some(pos) => Ok((input[..pos].trim(), Params::parse(&input[pos + 1..])?)),
            None => Ok((input.trim(), Params::new())),
        }
    }

    /// The parameter with the given name
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.0.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// The value of a parameter with surrounding quotes removed.
    ///
    /// Returns `None` both for an absent parameter and for a flag parameter.
    pub fn value(&self, name: &str) -> Option<String> {
        let value = self.get(name)?.value.as_deref()?;
        Some(unquote(value).unwrap_or_else(|| value.to_string()))
    }

    /// The raw value of a parameter, quotes included
    pub fn raw_value(&self, name: &str) -> Option<&str> {
        self.get(name)?.value.as_deref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets a parameter, replacing an existing one with the same name in place.
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.0.iter_mut().find(|p| p.name.eq_ignore_ascii_case(&name)) {
            Some(existing) => existing.value = value,
            None => self.0.push(Param::new(name, value)),
        }
    }

    /// Removes every parameter with the given name.
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|p| !p.name.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for param in &self.0 {
            write!(f, "{param}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
