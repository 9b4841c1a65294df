use crate::header::field::HeaderFieldValueList;
use crate::header::kind::HeaderKind;

/// One slot per known header kind, indexed by [`HeaderKind::index`].
///
/// A slot stays `None` until the header is parsed off the wire or created
/// through a mutable accessor.
#[derive(Debug, Clone)]
pub struct HeaderTable {
    slots: [Option<HeaderFieldValueList>; HeaderKind::COUNT],
}

impl Default for HeaderTable {
    fn default() -> Self {
        HeaderTable {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl HeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: HeaderKind) -> Option<&HeaderFieldValueList> {
        self.slots[kind.index()].as_ref()
    }

    pub fn get_mut(&mut self, kind: HeaderKind) -> Option<&mut HeaderFieldValueList> {
        self.slots[kind.index()].as_mut()
    }

    /// The slot's list, creating an empty one stamped with `order` if absent
    pub(crate) fn get_or_insert(&mut self, kind: HeaderKind, order: impl FnOnce() -> u64) -> &mut HeaderFieldValueList {
        self.slots[kind.index()].get_or_insert_with(|| HeaderFieldValueList::new(kind.is_single(), order()))
    }

    pub(crate) fn insert(&mut self, kind: HeaderKind, list: HeaderFieldValueList) {
        self.slots[kind.index()] = Some(list);
    }

    pub fn contains(&self, kind: HeaderKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    pub fn remove(&mut self, kind: HeaderKind) -> Option<HeaderFieldValueList> {
        self.slots[kind.index()].take()
    }

    /// Occupied slots in table order
    pub fn iter(&self) -> impl Iterator<Item = (HeaderKind, &HeaderFieldValueList)> {
        HeaderKind::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(kind, slot)| slot.as_ref().map(|list| (*kind, list)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_start_absent() {
        let table = HeaderTable::new();
        assert!(HeaderKind::ALL.iter().all(|kind| !table.contains(*kind)));
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn test_get_or_insert_and_remove() {
        let mut table = HeaderTable::new();
        let list = table.get_or_insert(HeaderKind::Via, || 3);
        assert!(!list.is_single());
        assert_eq!(list.order(), 3);

        // Existing slot keeps its order stamp
        assert_eq!(table.get_or_insert(HeaderKind::Via, || 9).order(), 3);
        assert!(table.contains(HeaderKind::Via));
        assert!(table.get(HeaderKind::CallId).is_none());

        assert!(table.remove(HeaderKind::Via).is_some());
        assert!(!table.contains(HeaderKind::Via));
        assert!(table.remove(HeaderKind::Via).is_none());
    }
}
