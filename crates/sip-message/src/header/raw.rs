use crate::buffer::BufferArena;
use crate::header::field::HeaderFieldValueList;

/// Uninterpreted view of one header's occurrences.
///
/// Hands out the raw value bytes without parsing them. Passing a
/// `RawHeader` to [`SipMessage::set_raw_header`](crate::SipMessage::set_raw_header)
/// copies the header into another message.
#[derive(Debug, Clone, Copy)]
pub struct RawHeader<'a> {
    list: &'a HeaderFieldValueList,
    arena: &'a BufferArena,
}

impl<'a> RawHeader<'a> {
    pub(crate) fn new(list: &'a HeaderFieldValueList, arena: &'a BufferArena) -> Self {
        RawHeader { list, arena }
    }

    /// The underlying value list
    pub fn list(&self) -> &'a HeaderFieldValueList {
        self.list
    }

    pub(crate) fn arena(&self) -> &'a BufferArena {
        self.arena
    }

    /// Value bytes of each occurrence, in arrival order
    pub fn values(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let arena = self.arena;
        self.list
            .values()
            .iter()
            .filter_map(move |value| arena.resolve(&value.span()).ok())
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
