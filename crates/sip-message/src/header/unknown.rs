use crate::header::field::HeaderFieldValueList;

/// A header whose name is not a [`HeaderKind`](crate::header::HeaderKind)
#[derive(Debug, Clone)]
pub struct UnknownHeaderEntry {
    name: String,
    values: HeaderFieldValueList,
}

impl UnknownHeaderEntry {
    /// The name as first received
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every occurrence of this name, in arrival order
    pub fn values(&self) -> &HeaderFieldValueList {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut HeaderFieldValueList {
        &mut self.values
    }
}

/// Unknown headers in order of first appearance.
///
/// Names match case-insensitively; repeated occurrences of one name are
/// collected, in order, under that name's entry.
#[derive(Debug, Clone, Default)]
pub struct UnknownHeaders {
    entries: Vec<UnknownHeaderEntry>,
}

impl UnknownHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&UnknownHeaderEntry> {
        self.position(name).map(|i| &self.entries[i])
    }

    /// The entry for `name`, appending an empty one stamped with `order` if absent
    pub(crate) fn get_or_insert(&mut self, name: &str, order: impl FnOnce() -> u64) -> &mut UnknownHeaderEntry {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.entries.push(UnknownHeaderEntry {
                    name: name.to_string(),
                    values: HeaderFieldValueList::new(false, order()),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes the entry for `name`, returning whether one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.name.eq_ignore_ascii_case(name));
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[UnknownHeaderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
