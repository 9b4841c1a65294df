use std::cell::OnceCell;

use tracing::trace;

use crate::buffer::{BufferArena, Span};
use crate::error::{Error, Result};
use crate::grammar::unfold_lws;
use crate::header::category::{ErasedContainer, ParserCategory, ParserContainer};

/// One occurrence of a header: a span into an arena buffer.
///
/// `value` covers the text after the colon. `line` covers the whole
/// `Name: value` line as received (folding included, CRLF excluded) and is
/// what the encoder writes when the header was never modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFieldValue {
    value: Span,
    line: Option<Span>,
    order: u64,
}

impl HeaderFieldValue {
    pub(crate) fn new(value: Span, line: Option<Span>, order: u64) -> Self {
        HeaderFieldValue { value, line, order }
    }

    /// The value text (after the colon)
    pub fn span(&self) -> Span {
        self.value
    }

    /// The full header line, when the value came off the wire
    pub fn line(&self) -> Option<Span> {
        self.line
    }

    /// Position among all header lines of the message
    pub fn order(&self) -> u64 {
        self.order
    }
}

/// All occurrences of one header, with a parse cache shared by all of them.
///
/// The cache is filled the first time the header is read through its typed
/// view and reused after that. Reading does not invalidate the raw spans;
/// only mutable access marks the list as touched, after which the encoder
/// re-renders the parsed values instead of copying raw bytes.
#[derive(Debug, Clone)]
pub struct HeaderFieldValueList {
    values: Vec<HeaderFieldValue>,
    single: bool,
    order: u64,
    parsed: OnceCell<Box<dyn ErasedContainer>>,
    touched: bool,
}

impl HeaderFieldValueList {
    pub(crate) fn new(single: bool, order: u64) -> Self {
        HeaderFieldValueList {
            values: Vec::new(),
            single,
            order,
            parsed: OnceCell::new(),
            touched: false,
        }
    }

    /// Appends a raw occurrence.
    ///
    /// An untouched list drops its parse cache so the next typed read sees
    /// the new value; a touched list parses the value into its cache, which
    /// is what the encoder renders.
    pub(crate) fn push(&mut self, value: HeaderFieldValue, arena: &BufferArena, name: &str) -> Result<()> {
        if self.touched {
            if let Some(parsed) = self.parsed.get_mut() {
                let text = value_text(arena, &value, name)?;
                parsed
                    .append_text(&text, self.single)
                    .map_err(|e| e.in_header(name))?;
            }
        } else {
            self.parsed.take();
        }
        if self.values.is_empty() || value.order < self.order {
            self.order = value.order;
        }
        self.values.push(value);
        Ok(())
    }

    /// Raw occurrences in arrival order
    pub fn values(&self) -> &[HeaderFieldValue] {
        &self.values
    }

    /// Number of raw occurrences
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.single
    }

    /// Position of the first occurrence (or of creation, if built locally)
    pub fn order(&self) -> u64 {
        self.order
    }

    /// Whether the typed view has been built
    pub fn is_parsed(&self) -> bool {
        self.parsed.get().is_some()
    }

    /// Whether the header was handed out mutably since it was parsed
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// The typed view, parsing the raw values on first use.
    ///
    /// Fills the cache through a shared reference.
    pub(crate) fn parsed<T: ParserCategory>(&self, arena: &BufferArena, name: &str) -> Result<&ParserContainer<T>> {
        if self.parsed.get().is_none() {
            let container = self.parse_values::<T>(arena, name)?;
            let _ = self.parsed.set(Box::new(container));
        }
        self.parsed
            .get()
            .and_then(|parsed| parsed.as_any().downcast_ref::<ParserContainer<T>>())
            .ok_or_else(|| Error::invalid_header(name, "parsed with a different value category"))
    }

    /// The typed view for modification; marks the list as touched.
    pub(crate) fn parsed_mut<T: ParserCategory>(&mut self, arena: &BufferArena, name: &str) -> Result<&mut ParserContainer<T>> {
        self.parsed::<T>(arena, name)?;
        self.touched = true;
        self.parsed
            .get_mut()
            .and_then(|parsed| parsed.as_any_mut().downcast_mut::<ParserContainer<T>>())
            .ok_or_else(|| Error::invalid_header(name, "parsed with a different value category"))
    }

    /// Replaces the typed view outright; marks the list as touched.
    pub(crate) fn replace_parsed<T: ParserCategory>(&mut self, container: ParserContainer<T>) {
        self.parsed = OnceCell::from(Box::new(container) as Box<dyn ErasedContainer>);
        self.touched = true;
    }

    /// Rendered values of a touched list, `None` when raw bytes are current
    pub(crate) fn rendered(&self) -> Option<Vec<String>> {
        if !self.touched {
            return None;
        }
        self.parsed.get().map(|parsed| parsed.render())
    }

    /// Copies this list into `target` as a list of arity `single`, giving
    /// each value fresh buffers and order stamps from `next_order`.
    ///
    /// A touched list is copied as its rendered values, so the copy is
    /// always raw and can be parsed under any category.
    pub(crate) fn copy_into(
        &self,
        source: &BufferArena,
        target: &mut BufferArena,
        next_order: &mut u64,
        single: bool,
    ) -> Result<Self> {
        let mut copy = HeaderFieldValueList::new(single, *next_order);
        match self.rendered() {
            Some(rendered) => {
                for text in rendered {
                    let span = target.add_copy(text.as_bytes());
                    copy.values.push(HeaderFieldValue::new(span, None, *next_order));
                    *next_order += 1;
                }
            }
            None => {
                for value in &self.values {
                    let span = target.add_copy(source.resolve(&value.value)?);
                    let line = match value.line {
                        Some(line) => Some(target.add_copy(source.resolve(&line)?)),
                        None => None,
                    };
                    copy.values.push(HeaderFieldValue::new(span, line, *next_order));
                    *next_order += 1;
                }
            }
        }
        if copy.values.is_empty() {
            *next_order += 1;
        }
        Ok(copy)
    }

    fn parse_values<T: ParserCategory>(&self, arena: &BufferArena, name: &str) -> Result<ParserContainer<T>> {
        trace!(header = name, values = self.values.len(), "parsing header on first access");
        let mut container = ParserContainer::new();
        for value in &self.values {
            let text = value_text(arena, value, name)?;
            container
                .append_text(&text, self.single)
                .map_err(|e| e.in_header(name))?;
        }
        Ok(container)
    }
}

// The value's text with folding removed
fn value_text(arena: &BufferArena, value: &HeaderFieldValue, name: &str) -> Result<String> {
    let bytes = arena.resolve(&value.value)?;
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::invalid_header(name, "value is not valid UTF-8"))?;
    Ok(unfold_lws(text).into_owned())
}
