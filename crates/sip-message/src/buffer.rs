//! # Buffer arena
//!
//! A [`SipMessage`](crate::SipMessage) owns the raw buffers it was parsed
//! from. Header values and the body never copy text out of those buffers;
//! they hold a [`Span`] (buffer id, offset, length) that is resolved against
//! the arena when the bytes are needed.
//!
//! Spans carry no pointer, so a message can be moved or cloned freely: a
//! clone deep-copies every buffer and keeps the same ids, which makes the
//! clone's spans resolve to the clone's own storage.
//!
//! ```rust
//! use rvoip_sip_message::buffer::BufferArena;
//!
//! let mut arena = BufferArena::new();
//! let id = arena.add_buffer(&b"Call-ID: abc@host"[..]);
//! let span = arena.span(id, 9..17).unwrap();
//! assert_eq!(arena.resolve(&span).unwrap(), b"abc@host");
//! ```

use std::ops::Range;

use bytes::Bytes;
use tracing::trace;

use crate::error::{Error, Result};

/// Identifies one buffer within a [`BufferArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u32);

impl BufferId {
    /// Position of the buffer in the arena, in the order buffers were added
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A byte range inside one arena buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    buffer: BufferId,
    offset: usize,
    len: usize,
}

impl Span {
    /// The buffer this span points into
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Offset of the first byte within the buffer
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes covered
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset one past the last byte within the buffer
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// A sub-range of this span, relative to its start.
    ///
    /// Returns `None` if `range` reaches past the end of the span.
    pub fn slice(&self, range: Range<usize>) -> Option<Span> {
        if range.start > range.end || range.end > self.len {
            return None;
        }
        Some(Span {
            buffer: self.buffer,
            offset: self.offset + range.start,
            len: range.end - range.start,
        })
    }
}

/// Exclusive owner of the raw buffers a message references
#[derive(Debug, Default)]
pub struct BufferArena {
    buffers: Vec<Bytes>,
}

impl BufferArena {
    /// Create an empty arena
    pub fn new() -> Self {
        BufferArena { buffers: Vec::new() }
    }

    /// Take ownership of a buffer and return its id.
    pub fn add_buffer(&mut self, buffer: impl Into<Bytes>) -> BufferId {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(buffer.into());
        id
    }

    /// Copy `bytes` into a new buffer and return a span covering all of it.
    ///
    /// Used for headers and bodies built programmatically, so that every raw
    /// value the message holds lives in its own arena.
    pub fn add_copy(&mut self, bytes: &[u8]) -> Span {
        let len = bytes.len();
        let buffer = self.add_buffer(Bytes::copy_from_slice(bytes));
        Span { buffer, offset: 0, len }
    }

    /// The buffer with the given id
    pub fn buffer(&self, id: BufferId) -> Option<&Bytes> {
        self.buffers.get(id.index())
    }

    /// A span covering `range` of buffer `id`.
    pub fn span(&self, id: BufferId, range: Range<usize>) -> Result<Span> {
        let buffer = self.buffer(id).ok_or_else(Error::invalid_span)?;
        if range.start > range.end || range.end > buffer.len() {
            return Err(Error::invalid_span());
        }
        Ok(Span {
            buffer: id,
            offset: range.start,
            len: range.end - range.start,
        })
    }

    /// A span covering the whole of buffer `id`.
    pub fn whole(&self, id: BufferId) -> Result<Span> {
        let len = self.buffer(id).ok_or_else(Error::invalid_span)?.len();
        Ok(Span { buffer: id, offset: 0, len })
    }

    /// The bytes a span covers.
    pub fn resolve(&self, span: &Span) -> Result<&[u8]> {
        self.buffer(span.buffer)
            .and_then(|buffer| buffer.get(span.offset..span.end()))
            .ok_or_else(Error::invalid_span)
    }

    /// Number of buffers owned
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the arena owns no buffers
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Total number of bytes held across all buffers
    pub fn total_bytes(&self) -> usize {
        self.buffers.iter().map(Bytes::len).sum()
    }
}

impl Clone for BufferArena {
    // Buffers are never shared between two live messages, so a clone gets its
    // own copy of every buffer under the same ids.
    fn clone(&self) -> Self {
        BufferArena {
            buffers: self
                .buffers
                .iter()
                .map(|buffer| Bytes::copy_from_slice(buffer))
                .collect(),
        }
    }
}

impl Drop for BufferArena {
    fn drop(&mut self) {
        if !self.buffers.is_empty() {
            trace!(buffers = self.buffers.len(), bytes = self.total_bytes(), "releasing message buffers");
        }
        // Vec drops its elements front to back, i.e. in the order they were added.
    }
}
