//! The pull-based cursor protocol.
//!
//! A cursor is a single-use traversal: `advance` moves to the next element
//! and reports whether there was one, `current` reads the element produced
//! by the last successful `advance`. Once `advance` returns `false` the
//! cursor is dead and keeps returning `false`; ask the owning
//! [`Iterable`](crate::Iterable) for a fresh cursor to traverse again.
//!
//! Cursors over a [`HashTable`](crate::HashTable) borrow it, so the borrow
//! checker already rules out mutating a table while one of its cursors is
//! alive. Cursors are not meant to be shared between callers.

use core::iter::FusedIterator;

pub trait Cursor {
    type Item;

    /// Moves to the next element. Returns `false` once the traversal is
    /// exhausted, and on every call after that.
    fn advance(&mut self) -> bool;

    /// The element made available by the last successful [`advance`].
    ///
    /// # Panics
    ///
    /// When there is no such element: before the first `advance`, or after
    /// `advance` returned `false`.
    ///
    /// [`advance`]: Cursor::advance
    fn current(&self) -> &Self::Item;

    /// Adapts this cursor to a std [`Iterator`] yielding owned elements.
    fn into_std(self) -> Iter<Self>
    where
        Self: Sized,
    {
        Iter { cursor: self }
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;

    #[inline]
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    #[inline]
    fn current(&self) -> &C::Item {
        (**self).current()
    }
}

/// Reports a read of `current` with nothing to read.
#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn no_current() -> ! {
    panic!("Cursor::current called without a current element (advance first, and stop once it returns false)")
}

/// Drains a cursor into a buffer, in traversal order.
pub(crate) fn materialize<C>(mut cursor: C) -> Vec<C::Item>
where
    C: Cursor,
    C::Item: Clone,
{
    let mut buffer = Vec::new();
    while cursor.advance() {
        buffer.push(cursor.current().clone());
    }
    buffer
}

/// Std iterator over a cursor. Clones each element out of the cursor.
pub struct Iter<C> {
    cursor: C,
}

impl<C> Iterator for Iter<C>
where
    C: Cursor,
    C::Item: Clone,
{
    type Item = C::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.advance() {
            Some(self.cursor.current().clone())
        } else {
            None
        }
    }
}

impl<C> FusedIterator for Iter<C>
where
    C: Cursor,
    C::Item: Clone,
{
}

/// Cursor over a borrowed slice.
pub struct SliceCursor<'a, T> {
    rest: core::slice::Iter<'a, T>,
    current: Option<&'a T>,
}

impl<'a, T> SliceCursor<'a, T> {
    pub(crate) fn new(slice: &'a [T]) -> Self {
        Self {
            rest: slice.iter(),
            current: None,
        }
    }
}

impl<T> Cursor for SliceCursor<'_, T> {
    type Item = T;

    #[inline]
    fn advance(&mut self) -> bool {
        self.current = self.rest.next();
        self.current.is_some()
    }

    #[inline]
    fn current(&self) -> &T {
        self.current.unwrap_or_else(|| no_current())
    }
}

/// Cursor driving a std iterator. Fused: once the iterator returns `None`
/// it is dropped and never polled again.
pub struct SourceCursor<I: Iterator> {
    iter: Option<I>,
    current: Option<I::Item>,
}

impl<I: Iterator> SourceCursor<I> {
    pub(crate) fn new(iter: I) -> Self {
        Self {
            iter: Some(iter),
            current: None,
        }
    }
}

impl<I: Iterator> Cursor for SourceCursor<I> {
    type Item = I::Item;

    fn advance(&mut self) -> bool {
        self.current = self.iter.as_mut().and_then(Iterator::next);
        if self.current.is_none() {
            self.iter = None;
        }
        self.current.is_some()
    }

    #[inline]
    fn current(&self) -> &I::Item {
        self.current.as_ref().unwrap_or_else(|| no_current())
    }
}
