use std::any::Any;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::Result;
use crate::grammar::split_top_level;

/// A typed representation of one header value.
///
/// Every known header kind is bound to exactly one category; the category's
/// `parse` is the narrow grammar interface the header table calls the first
/// time a kind is accessed through its typed view.
pub trait ParserCategory: Clone + fmt::Debug + fmt::Display + Default + Send + 'static {
    /// Whether a multi-valued header of this category may carry several
    /// comma-separated values on one line
    const COMMA_SEPARATED: bool = true;

    /// Parses one value (already unfolded and trimmed).
    fn parse(text: &str) -> Result<Self>;
}

/// Ordered parsed values of one header kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserContainer<T> {
    values: Vec<T>,
}

impl<T> Default for ParserContainer<T> {
    fn default() -> Self {
        ParserContainer { values: Vec::new() }
    }
}

impl<T> ParserContainer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The first (top-most) value
    pub fn front(&self) -> Option<&T> {
        self.values.first()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.values.first_mut()
    }

    pub fn back(&self) -> Option<&T> {
        self.values.last()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.values.get_mut(index)
    }

    pub fn push_back(&mut self, value: T) {
        self.values.push(value);
    }

    /// Inserts on top, e.g. a proxy adding its own Via.
    pub fn push_front(&mut self, value: T) {
        self.values.insert(0, value);
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.remove(0))
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.values.len()).then(|| self.values.remove(index))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.values.iter_mut()
    }
}

impl<T: Default> ParserContainer<T> {
    /// The first value, inserting a default one if the container is empty
    pub fn front_or_insert_default(&mut self) -> &mut T {
        if self.values.is_empty() {
            self.values.push(T::default());
        }
        &mut self.values[0]
    }
}

impl<T: ParserCategory> ParserContainer<T> {
    /// Parses one raw header value and appends the result.
    ///
    /// Multi-valued headers of a comma-separated category may carry several
    /// values in one line; those are split first.
    pub(crate) fn append_text(&mut self, text: &str, single: bool) -> Result<()> {
        if T::COMMA_SEPARATED && !single {
            for piece in split_top_level(text, ',') {
                self.values.push(T::parse(piece)?);
            }
        } else {
            self.values.push(T::parse(text.trim())?);
        }
        Ok(())
    }
}

impl<T> Index<usize> for ParserContainer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.values[index]
    }
}

impl<T> IndexMut<usize> for ParserContainer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.values[index]
    }
}

impl<T> FromIterator<T> for ParserContainer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ParserContainer {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ParserContainer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut ParserContainer<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter_mut()
    }
}

/// Type-erased parsed container stored in a header's cache cell
pub(crate) trait ErasedContainer: Any + Send + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_box(&self) -> Box<dyn ErasedContainer>;
    fn append_text(&mut self, text: &str, single: bool) -> Result<()>;
    /// Each value rendered with its category's `Display`
    fn render(&self) -> Vec<String>;
}

impl<T: ParserCategory> ErasedContainer for ParserContainer<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn ErasedContainer> {
        Box::new(self.clone())
    }

    fn append_text(&mut self, text: &str, single: bool) -> Result<()> {
        ParserContainer::append_text(self, text, single)
    }

    fn render(&self) -> Vec<String> {
        self.values.iter().map(ToString::to_string).collect()
    }
}

impl Clone for Box<dyn ErasedContainer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
